use anyhow::{Context, Result};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Non-success response from the backend, kept as a typed error so callers
/// can tell a rejected credential from a missing row.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("API error ({status}): {message}")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn is_auth(&self) -> bool {
        matches!(self.status, 400 | 401 | 403 | 422)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// REST client for the managed backend: record store collections under
/// `/rest/v1` and the auth service under `/auth/v1`.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl BackendClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            anon_key: config.backend_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.anon_key).context("Invalid backend API key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token)).context("Invalid access token")?,
            );
        }

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, auth_token, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers(auth_token)?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("API error ({}): {}", status, text);
            return Err(ApiError {
                status: status.as_u16(),
                message: extract_message(&text),
            }.into());
        }

        // DELETE and minimal-return writes answer with an empty body
        let data = if text.trim().is_empty() {
            serde_json::from_value(Value::Null)?
        } else {
            serde_json::from_str(&text)?
        };
        Ok(data)
    }

    /// Fetches every document in a collection, in store order.
    pub async fn list(&self, collection: &str, auth_token: Option<&str>) -> Result<Vec<Value>> {
        let path = format!("/rest/v1/{}?select=*", collection);
        self.request(Method::GET, &path, auth_token, None).await
    }

    /// Fetches one document by id; `None` when no row matches.
    pub async fn get(&self, collection: &str, id: &str, auth_token: Option<&str>) -> Result<Option<Value>> {
        let path = format!("/rest/v1/{}?id=eq.{}&select=*", collection, urlencoding::encode(id));
        let rows: Vec<Value> = self.request(Method::GET, &path, auth_token, None).await?;
        Ok(rows.into_iter().next())
    }

    /// Creates a document and returns the stored representation, including its id.
    pub async fn create(&self, collection: &str, document: Value, auth_token: Option<&str>) -> Result<Value> {
        let path = format!("/rest/v1/{}", collection);
        let rows: Vec<Value> = self.request_with_headers(
            Method::POST,
            &path,
            auth_token,
            Some(document),
            Some(return_representation()),
        ).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Store returned no row for new {} document", collection))
    }

    /// Updates the given fields of one document and returns the stored result.
    pub async fn update(&self, collection: &str, id: &str, fields: Value, auth_token: Option<&str>) -> Result<Value> {
        let path = format!("/rest/v1/{}?id=eq.{}", collection, urlencoding::encode(id));
        let rows: Vec<Value> = self.request_with_headers(
            Method::PATCH,
            &path,
            auth_token,
            Some(fields),
            Some(return_representation()),
        ).await?;

        rows.into_iter().next().ok_or_else(|| ApiError {
            status: 404,
            message: format!("No {} document with id {}", collection, id),
        }.into())
    }

    pub async fn delete(&self, collection: &str, id: &str, auth_token: Option<&str>) -> Result<()> {
        let path = format!("/rest/v1/{}?id=eq.{}", collection, urlencoding::encode(id));
        let _: Value = self.request(Method::DELETE, &path, auth_token, None).await?;
        Ok(())
    }
}

fn return_representation() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

fn extract_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| json.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}
