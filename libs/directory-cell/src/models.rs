use serde::{Deserialize, Serialize};

use shared_config::AppConfig;

/// Chip label meaning "no specialty filter".
pub const ALL_SPECIALTIES: &str = "All";

/// Map centre used when no doctor or device position is available.
pub const DEFAULT_MAP_CENTER: GeoPoint = GeoPoint {
    latitude: -24.6581,
    longitude: 25.9122,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Returns `None` for non-finite or out-of-range coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        valid.then_some(Self { latitude, longitude })
    }
}

/// Daily working window as entered by the admin, local 24-hour `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub start: String,
    pub end: String,
}

impl WorkingHours {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorRecord {
    pub id: String,
    pub full_name: Option<String>,
    pub profession: Option<String>,
    #[serde(default)]
    pub is_suspended: bool,
    pub profile_image_url: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub gender: Option<String>,
    pub rating: Option<f64>,
    pub location: Option<GeoPoint>,
    pub working_hours: Option<WorkingHours>,
    pub bio: Option<String>,
}

impl DoctorRecord {
    pub fn new(id: &str, full_name: &str, profession: &str) -> Self {
        Self {
            id: id.to_string(),
            full_name: Some(full_name.to_string()),
            profession: Some(profession.to_string()),
            is_suspended: false,
            profile_image_url: None,
            phone: None,
            fax: None,
            email: None,
            city: None,
            gender: None,
            rating: None,
            location: None,
            working_hours: None,
            bio: None,
        }
    }

    pub fn name(&self) -> &str {
        self.full_name.as_deref().unwrap_or("")
    }

    pub fn display_name(&self) -> String {
        format!("Dr. {}", self.name())
    }
}

/// Who the directory is loaded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryAudience {
    /// Patient and guest screens: suspended doctors are never shown.
    Patient,
    /// Admin dashboard: suspended doctors stay visible and flagged.
    Admin,
}

impl DirectoryAudience {
    pub fn admits(&self, record: &DoctorRecord) -> bool {
        if record.full_name.is_none() {
            return false;
        }
        match self {
            DirectoryAudience::Patient => !record.is_suspended,
            DirectoryAudience::Admin => true,
        }
    }
}

/// Fields searched by the free-text query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchSurface {
    pub include_city: bool,
}

impl SearchSurface {
    pub fn names_and_professions() -> Self {
        Self { include_city: false }
    }

    pub fn with_city() -> Self {
        Self { include_city: true }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self { include_city: config.search_includes_city }
    }
}

/// Result of evaluating a doctor's working window against the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// No working hours recorded; no badge is rendered.
    NoSchedule,
    Available,
    Unavailable,
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }

    pub fn shows_badge(&self) -> bool {
        !matches!(self, Availability::NoSchedule)
    }

    pub fn badge_label(&self) -> Option<&'static str> {
        match self {
            Availability::NoSchedule => None,
            Availability::Available => Some("Available"),
            Availability::Unavailable => Some("Unavailable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyDoctor {
    pub doctor: DoctorRecord,
    pub distance_km: f64,
}
