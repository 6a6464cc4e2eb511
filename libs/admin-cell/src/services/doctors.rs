use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use shared_config::AppConfig;
use shared_database::{ApiError, BackendClient, DOCTORS};
use shared_models::error::AppError;
use shared_utils::validation::{is_valid_clock_time, is_valid_email, PhoneValidator};
use directory_cell::{normalize_document, DoctorRecord};

use crate::models::{DoctorForm, ImageChange, ImageUpload};
use crate::services::media::{CloudMediaUploader, MediaUploader};

/// Doctor maintenance for the admin dashboard.
pub struct DoctorAdminService {
    backend: BackendClient,
    access_token: Option<String>,
    uploader: Arc<dyn MediaUploader>,
    phone_validator: PhoneValidator,
}

impl DoctorAdminService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_uploader(config, Arc::new(CloudMediaUploader::new(config)))
    }

    pub fn with_uploader(config: &AppConfig, uploader: Arc<dyn MediaUploader>) -> Self {
        Self {
            backend: BackendClient::new(config),
            access_token: None,
            uploader,
            phone_validator: PhoneValidator::new(&config.doctor_phone_policy),
        }
    }

    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token;
        self
    }

    pub fn validate(&self, form: &DoctorForm) -> Result<(), AppError> {
        if form.full_name.trim().is_empty() || form.email.trim().is_empty() || form.profession.trim().is_empty() {
            return Err(AppError::Validation(
                "Full name, email and profession are required".to_string(),
            ));
        }
        if !is_valid_email(&form.email) {
            return Err(AppError::Validation("Please enter a valid email address".to_string()));
        }
        if !form.rating.is_finite() || !(0.0..=5.0).contains(&form.rating) {
            return Err(AppError::Validation("Rating must be between 0 and 5".to_string()));
        }
        if let Some(hours) = &form.working_hours {
            let (start, end) = (hours.start.trim(), hours.end.trim());
            let any_given = !start.is_empty() || !end.is_empty();
            if any_given && !(is_valid_clock_time(start) && is_valid_clock_time(end)) {
                return Err(AppError::Validation(
                    "Working hours must be in HH:MM format".to_string(),
                ));
            }
        }
        if !form.phone.trim().is_empty() {
            self.phone_validator.validate(&form.phone)?;
        }
        Ok(())
    }

    /// Uploads the picture (if any) and creates an active doctor.
    pub async fn create_doctor(&self, form: &DoctorForm, image: Option<&ImageUpload>) -> Result<DoctorRecord, AppError> {
        self.validate(form)?;

        let image_url = match image {
            Some(image) => Some(self.upload(image).await?),
            None => None,
        };

        let mut document = form.to_fields();
        document["profileImageUrl"] = image_url.map(Value::String).unwrap_or(Value::Null);
        document["isSuspended"] = Value::Bool(false);
        document["createdAt"] = Value::String(Utc::now().to_rfc3339());

        let stored = self.backend
            .create(DOCTORS, document, self.access_token.as_deref())
            .await
            .map_err(|e| {
                error!("Error adding doctor: {}", e);
                AppError::Write(e.to_string())
            })?;

        let record = stored_record(&stored)?;
        info!("Added doctor {} ({})", record.id, record.name());
        Ok(record)
    }

    /// Saves the form; the stored picture is untouched unless `image` says
    /// otherwise.
    pub async fn update_doctor(&self, doctor_id: &str, form: &DoctorForm, image: ImageChange) -> Result<DoctorRecord, AppError> {
        self.validate(form)?;

        let mut fields = form.to_fields();
        match image {
            ImageChange::Keep => {}
            ImageChange::Replace(upload) => {
                fields["profileImageUrl"] = Value::String(self.upload(&upload).await?);
            }
            ImageChange::Remove => {
                fields["profileImageUrl"] = Value::Null;
            }
        }

        let record = self.patch(doctor_id, fields).await?;
        info!("Updated doctor {}", doctor_id);
        Ok(record)
    }

    pub async fn set_suspended(&self, doctor_id: &str, suspended: bool) -> Result<DoctorRecord, AppError> {
        let record = self.patch(doctor_id, json!({ "isSuspended": suspended })).await?;
        info!("Doctor {} has been {}", doctor_id, if suspended { "suspended" } else { "unsuspended" });
        Ok(record)
    }

    /// Flips the stored suspension flag.
    pub async fn toggle_suspension(&self, doctor_id: &str) -> Result<DoctorRecord, AppError> {
        let current = self.fetch(doctor_id).await?;
        self.set_suspended(doctor_id, !current.is_suspended).await
    }

    pub async fn delete_doctor(&self, doctor_id: &str) -> Result<(), AppError> {
        self.backend
            .delete(DOCTORS, doctor_id, self.access_token.as_deref())
            .await
            .map_err(|e| {
                error!("Error deleting doctor {}: {}", doctor_id, e);
                AppError::Write(e.to_string())
            })?;

        info!("Doctor {} deleted", doctor_id);
        Ok(())
    }

    async fn upload(&self, image: &ImageUpload) -> Result<String, AppError> {
        self.uploader.upload(image).await.map_err(|e| {
            error!("Profile picture upload failed: {}", e);
            AppError::Upstream("Image upload failed".to_string())
        })
    }

    async fn fetch(&self, doctor_id: &str) -> Result<DoctorRecord, AppError> {
        debug!("Fetching doctor {} for edit", doctor_id);
        let document = self.backend
            .get(DOCTORS, doctor_id, self.access_token.as_deref())
            .await
            .map_err(|e| AppError::Load(e.to_string()))?
            .ok_or_else(|| AppError::NotFound("Doctor not found.".to_string()))?;
        stored_record(&document)
    }

    async fn patch(&self, doctor_id: &str, fields: Value) -> Result<DoctorRecord, AppError> {
        let stored = self.backend
            .update(DOCTORS, doctor_id, fields, self.access_token.as_deref())
            .await
            .map_err(|e| match e.downcast_ref::<ApiError>() {
                Some(api) if api.is_not_found() => AppError::NotFound("Doctor not found.".to_string()),
                _ => {
                    error!("Error updating doctor {}: {}", doctor_id, e);
                    AppError::Write(e.to_string())
                }
            })?;
        stored_record(&stored)
    }
}

fn stored_record(document: &Value) -> Result<DoctorRecord, AppError> {
    normalize_document(document)
        .ok_or_else(|| AppError::Write("Store returned an invalid doctor document".to_string()))
}
