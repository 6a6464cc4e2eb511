use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_models::error::AppError;

pub const MAIL_SUBJECT: &str = "Appointment Request";

/// Snapshot of the requesting patient's profile, copied onto the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requester {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub requester: Requester,
    pub datetime: DateTime<Utc>,
    pub purpose: String,
}

/// Document written to the `appointments` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    pub doctor_id: String,
    pub user_id: String,
    pub doctor_name: String,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub purpose: String,
    pub datetime: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Pre-filled message handed to the platform mail composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailDraft {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl MailDraft {
    pub fn mailto(&self) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            self.recipient,
            urlencoding::encode(&self.subject),
            urlencoding::encode(&self.body),
        )
    }
}

/// Outcome of a submitted booking.
///
/// The record exists whenever a receipt is returned; `mail_error` only says
/// whether the composer could be opened afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingReceipt {
    pub appointment_id: String,
    pub mail_error: Option<AppError>,
}

impl BookingReceipt {
    pub fn mail_opened(&self) -> bool {
        self.mail_error.is_none()
    }
}
