use serde_json::Value;
use tracing::{debug, error, info, warn};

use shared_config::AppConfig;
use shared_database::{ApiError, BackendClient, DOCTORS};
use shared_models::error::AppError;

use crate::models::{DirectoryAudience, DoctorRecord, WorkingHours};
use crate::services::geo::normalize_location;

pub struct DirectoryLoader {
    backend: BackendClient,
    access_token: Option<String>,
}

impl DirectoryLoader {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
            access_token: None,
        }
    }

    /// Reads with the signed-in user's token; guests load anonymously.
    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token;
        self
    }

    /// Fetch the whole doctor collection in one call and keep what the
    /// audience may see, in store order.
    pub async fn load(&self, audience: DirectoryAudience) -> Result<Vec<DoctorRecord>, AppError> {
        debug!("Loading doctor directory for {:?}", audience);

        let documents = self.backend
            .list(DOCTORS, self.access_token.as_deref())
            .await
            .map_err(|e| {
                error!("Error fetching doctors: {}", e);
                AppError::Load(e.to_string())
            })?;

        let total = documents.len();
        let doctors: Vec<DoctorRecord> = documents
            .iter()
            .filter_map(normalize_document)
            .filter(|record| audience.admits(record))
            .collect();

        info!("Loaded {} of {} doctor documents for {:?}", doctors.len(), total, audience);
        Ok(doctors)
    }

    /// Fetch a single doctor for the detail, booking and report screens.
    ///
    /// A suspended doctor is reported as missing to the Patient audience.
    pub async fn get_doctor(
        &self,
        doctor_id: &str,
        audience: DirectoryAudience,
    ) -> Result<DoctorRecord, AppError> {
        debug!("Fetching doctor profile {} for {:?}", doctor_id, audience);

        let document = self.backend
            .get(DOCTORS, doctor_id, self.access_token.as_deref())
            .await
            .map_err(|e| match e.downcast_ref::<ApiError>() {
                Some(api) if api.is_not_found() => AppError::NotFound("Doctor not found".to_string()),
                _ => {
                    error!("Failed to fetch doctor {}: {}", doctor_id, e);
                    AppError::Load(e.to_string())
                }
            })?
            .ok_or_else(|| AppError::NotFound("Doctor not found".to_string()))?;

        let mut record = normalize_fields(&document)
            .ok_or_else(|| AppError::Load(format!("Doctor {} has an invalid document", doctor_id)))?;
        if record.id.is_empty() {
            record.id = doctor_id.to_string();
        }
        if audience == DirectoryAudience::Patient && record.is_suspended {
            warn!("Doctor {} is suspended; hidden from patients", doctor_id);
            return Err(AppError::NotFound("Doctor not found".to_string()));
        }
        Ok(record)
    }
}

/// Maps one raw store document to a `DoctorRecord`; documents without an id
/// are dropped.
pub fn normalize_document(document: &Value) -> Option<DoctorRecord> {
    let record = normalize_fields(document)?;
    if record.id.is_empty() {
        warn!("Skipping doctor document without id");
        return None;
    }
    Some(record)
}

fn normalize_fields(document: &Value) -> Option<DoctorRecord> {
    let map = document.as_object()?;

    let id = match map.get("id") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    let record = DoctorRecord {
        full_name: text(document, "fullName"),
        profession: text(document, "profession"),
        is_suspended: document.get("isSuspended").and_then(Value::as_bool).unwrap_or(false),
        profile_image_url: text(document, "profileImageUrl"),
        phone: text(document, "phone"),
        fax: text(document, "fax"),
        email: text(document, "email"),
        city: text(document, "city"),
        gender: text(document, "gender"),
        rating: rating(document.get("rating")),
        location: document.get("location").and_then(normalize_location),
        working_hours: working_hours(document.get("workingHours")),
        bio: text(document, "bio"),
        id,
    };

    if record.full_name.is_none() {
        debug!("Doctor document {} is missing fullName", record.id);
    }
    Some(record)
}

fn text(document: &Value, key: &str) -> Option<String> {
    document
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn rating(raw: Option<&Value>) -> Option<f64> {
    let value = match raw? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    value.filter(|r: &f64| r.is_finite())
}

fn working_hours(raw: Option<&Value>) -> Option<WorkingHours> {
    let raw = raw?;
    let start = text(raw, "start")?;
    let end = text(raw, "end")?;
    Some(WorkingHours { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_a_complete_document() {
        let doc = json!({
            "id": "doc-1",
            "fullName": "  Naledi Mokoena ",
            "profession": "Cardiologist",
            "isSuspended": false,
            "city": "Gaborone",
            "rating": "4.5",
            "location": {"_lat": -24.6, "_long": 25.9},
            "workingHours": {"start": "08:00", "end": "16:30"},
            "fax": ""
        });

        let record = normalize_document(&doc).unwrap();
        assert_eq!(record.full_name.as_deref(), Some("Naledi Mokoena"));
        assert_eq!(record.rating, Some(4.5));
        assert!(record.location.is_some());
        assert_eq!(record.working_hours, Some(WorkingHours::new("08:00", "16:30")));
        assert_eq!(record.fax, None);
    }

    #[test]
    fn missing_fields_default_softly() {
        let record = normalize_document(&json!({"id": 7, "workingHours": {"start": "", "end": "17:00"}})).unwrap();
        assert_eq!(record.id, "7");
        assert!(!record.is_suspended);
        assert_eq!(record.full_name, None);
        assert_eq!(record.working_hours, None);
    }

    #[test]
    fn documents_without_id_are_dropped() {
        assert!(normalize_document(&json!({"fullName": "No Id"})).is_none());
        assert!(normalize_document(&json!("not an object")).is_none());
    }
}
