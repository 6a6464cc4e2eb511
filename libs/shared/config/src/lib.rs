use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_MEDIA_UPLOAD_URL: &str = "https://api.cloudinary.com/v1_1/Medi-Find/image/upload";
pub const DEFAULT_MEDIA_UPLOAD_PRESET: &str = "MediFind";

/// Phone number rule applied by one particular form.
///
/// The surfaces disagree on what a valid number looks like, so each one
/// carries its own policy instead of sharing a single rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhonePolicy {
    /// Digits only, at least `min` of them.
    MinDigits { min: usize },
    /// Digits only, exactly `digits` of them.
    ExactDigits { digits: usize },
    /// Country calling code followed by exactly `digits` digits.
    CountryCode { code: String, digits: usize },
}

impl fmt::Display for PhonePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhonePolicy::MinDigits { min } => write!(f, "min-digits:{}", min),
            PhonePolicy::ExactDigits { digits } => write!(f, "exact-digits:{}", digits),
            PhonePolicy::CountryCode { code, digits } => write!(f, "country-code:{}:{}", code, digits),
        }
    }
}

impl FromStr for PhonePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = value.trim().split(':').collect();
        let parse_count = |raw: &str| {
            raw.parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("Invalid digit count in phone policy: {}", value))
        };

        match parts.as_slice() {
            ["min-digits", n] => Ok(PhonePolicy::MinDigits { min: parse_count(n)? }),
            ["exact-digits", n] => Ok(PhonePolicy::ExactDigits { digits: parse_count(n)? }),
            ["country-code", code, n] => {
                let digits_only = code.strip_prefix('+').unwrap_or(code);
                if digits_only.is_empty() || !digits_only.chars().all(|c| c.is_ascii_digit()) {
                    return Err(format!("Invalid country code in phone policy: {}", value));
                }
                Ok(PhonePolicy::CountryCode {
                    code: format!("+{}", digits_only),
                    digits: parse_count(n)?,
                })
            }
            _ => Err(format!("Unknown phone policy: {}", value)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub backend_anon_key: String,
    pub media_upload_url: String,
    pub media_upload_preset: String,
    pub search_includes_city: bool,
    pub profile_phone_policy: PhonePolicy,
    pub registration_phone_policy: PhonePolicy,
    pub doctor_phone_policy: PhonePolicy,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            backend_url: env::var("BACKEND_URL")
                .unwrap_or_else(|_| {
                    warn!("BACKEND_URL not set, using empty value");
                    String::new()
                }),
            backend_anon_key: env::var("BACKEND_ANON_KEY")
                .unwrap_or_else(|_| {
                    warn!("BACKEND_ANON_KEY not set, using empty value");
                    String::new()
                }),
            media_upload_url: env::var("MEDIA_UPLOAD_URL")
                .unwrap_or_else(|_| DEFAULT_MEDIA_UPLOAD_URL.to_string()),
            media_upload_preset: env::var("MEDIA_UPLOAD_PRESET")
                .unwrap_or_else(|_| DEFAULT_MEDIA_UPLOAD_PRESET.to_string()),
            search_includes_city: env::var("DIRECTORY_SEARCH_CITY")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            profile_phone_policy: policy_from_env(
                "PROFILE_PHONE_POLICY",
                PhonePolicy::MinDigits { min: 7 },
            ),
            registration_phone_policy: policy_from_env(
                "REGISTRATION_PHONE_POLICY",
                PhonePolicy::ExactDigits { digits: 8 },
            ),
            doctor_phone_policy: policy_from_env(
                "DOCTOR_PHONE_POLICY",
                PhonePolicy::CountryCode { code: "+267".to_string(), digits: 8 },
            ),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.backend_url.is_empty() && !self.backend_anon_key.is_empty()
    }

    pub fn is_media_configured(&self) -> bool {
        !self.media_upload_url.is_empty() && !self.media_upload_preset.is_empty()
    }
}

fn policy_from_env(key: &str, default: PhonePolicy) -> PhonePolicy {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("{} ignored ({}), using {}", key, e, default);
            default
        }),
        Err(_) => default,
    }
}
