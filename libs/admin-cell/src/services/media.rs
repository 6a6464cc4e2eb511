use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::ImageUpload;

/// Image host used for doctor profile pictures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Uploads the image and returns its public URL.
    async fn upload(&self, image: &ImageUpload) -> Result<String>;
}

/// Unsigned uploads to the hosted media service using an upload preset.
pub struct CloudMediaUploader {
    client: Client,
    upload_url: String,
    upload_preset: String,
}

impl CloudMediaUploader {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            upload_url: config.media_upload_url.clone(),
            upload_preset: config.media_upload_preset.clone(),
        }
    }
}

#[async_trait]
impl MediaUploader for CloudMediaUploader {
    async fn upload(&self, image: &ImageUpload) -> Result<String> {
        debug!("Uploading {} ({} bytes)", image.file_name, image.bytes.len());

        let response = self.client
            .post(&self.upload_url)
            .json(&json!({
                "file": image.data_uri(),
                "upload_preset": self.upload_preset,
            }))
            .send()
            .await
            .context("Media upload request failed")?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        match body.get("secure_url").and_then(Value::as_str) {
            Some(url) if status.is_success() => {
                info!("Uploaded {} to {}", image.file_name, url);
                Ok(url.to_string())
            }
            _ => {
                error!("Media upload error ({}): {}", status, body);
                Err(anyhow!("Image upload failed"))
            }
        }
    }
}
