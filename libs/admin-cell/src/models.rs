use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};

use directory_cell::{DoctorRecord, GeoPoint, WorkingHours};

/// Add/edit doctor form as filled in on the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoctorForm {
    pub full_name: String,
    pub email: String,
    pub profession: String,
    pub gender: String,
    pub phone: String,
    pub fax: String,
    pub city: String,
    pub location: Option<GeoPoint>,
    pub bio: String,
    pub rating: f64,
    pub working_hours: Option<WorkingHours>,
}

impl DoctorForm {
    /// Prefills the edit form from a stored record.
    pub fn from_record(record: &DoctorRecord) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            full_name: text(&record.full_name),
            email: text(&record.email),
            profession: text(&record.profession),
            gender: text(&record.gender),
            phone: text(&record.phone),
            fax: text(&record.fax),
            city: text(&record.city),
            location: record.location,
            bio: text(&record.bio),
            rating: record.rating.unwrap_or(0.0),
            working_hours: record.working_hours.clone(),
        }
    }

    /// Store fields written by both create and update.
    pub fn to_fields(&self) -> Value {
        let hours = self.working_hours.as_ref().filter(|h| !h.start.trim().is_empty() || !h.end.trim().is_empty());
        json!({
            "fullName": self.full_name.trim(),
            "email": self.email.trim(),
            "profession": self.profession.trim(),
            "gender": self.gender.trim(),
            "phone": self.phone.trim(),
            "fax": self.fax.trim(),
            "city": self.city.trim(),
            "location": self.location.map(|p| json!({ "latitude": p.latitude, "longitude": p.longitude })),
            "bio": self.bio.trim(),
            "rating": self.rating,
            "workingHours": hours.map(|h| json!({ "start": h.start.trim(), "end": h.end.trim() })),
        })
    }
}

/// Image picked for a doctor's profile picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: &str, content_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        }
    }

    /// Guesses the content type from the file extension.
    pub fn from_file_name(file_name: &str, bytes: Vec<u8>) -> Self {
        let extension = file_name.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
        let content_type = match extension.as_str() {
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => "image/jpeg",
        };
        Self::new(file_name, content_type, bytes)
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

/// What an edit does to the stored profile picture.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageChange {
    #[default]
    Keep,
    Replace(ImageUpload),
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_doctors: usize,
    pub specialties: usize,
    pub suspended: usize,
}

/// Printable profile of one doctor.
#[derive(Debug, Clone, PartialEq)]
pub struct DoctorReport {
    pub generated_on: NaiveDate,
    pub full_name: String,
    pub email: String,
    pub profession: String,
    pub gender: String,
    pub phone: String,
    pub fax: String,
    pub location: String,
    pub map_link: Option<String>,
    pub rating: String,
    pub status: String,
    pub working_hours: String,
    pub bio: String,
}
