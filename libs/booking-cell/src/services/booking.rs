use chrono::{Local, NaiveTime, Utc};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use shared_config::AppConfig;
use shared_database::{BackendClient, APPOINTMENTS};
use shared_models::error::AppError;
use directory_cell::{evaluate, Availability, DoctorRecord};

use crate::models::{AppointmentRequest, BookingReceipt, BookingRequest, MailDraft, MAIL_SUBJECT};
use crate::services::mail::MailComposer;

pub struct BookingService {
    backend: BackendClient,
    access_token: Option<String>,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token;
        self
    }

    /// Gate applied when the patient taps "book" on a doctor profile.
    ///
    /// Doctors without recorded hours are bookable; doctors outside their
    /// window are not. Suspended doctors do not exist for patients.
    pub fn check_bookable(doctor: &DoctorRecord, now: NaiveTime) -> Result<Availability, AppError> {
        if doctor.is_suspended {
            return Err(AppError::NotFound("Doctor not found".to_string()));
        }

        let availability = evaluate(doctor.working_hours.as_ref(), now);

        if availability == Availability::Unavailable {
            let (start, end) = doctor
                .working_hours
                .as_ref()
                .map(|h| (h.start.as_str(), h.end.as_str()))
                .unwrap_or_default();
            return Err(AppError::Validation(format!(
                "{} is currently unavailable. Working hours are {} - {}.",
                doctor.display_name(),
                start,
                end
            )));
        }

        Ok(availability)
    }

    /// The requested time is shown on the patient's local clock, the same
    /// clock the availability badge uses.
    pub fn draft_mail(doctor: &DoctorRecord, request: &BookingRequest) -> MailDraft {
        let requester = &request.requester;
        let body = format!(
            "Hi {},\n\nI'd like to book an appointment on {}.\n\nName: {}\nPhone: {}\nEmail: {}\nPurpose: {}",
            doctor.display_name(),
            request.datetime.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            requester.name,
            requester.phone,
            requester.email,
            request.purpose,
        );

        MailDraft {
            recipient: doctor.email.clone().unwrap_or_default(),
            subject: MAIL_SUBJECT.to_string(),
            body,
        }
    }

    /// Writes the appointment request, then opens the mail composer.
    ///
    /// The two steps are not atomic. A failed write aborts before the
    /// composer is touched; a composer failure is reported on the receipt
    /// and leaves the record in place.
    pub async fn submit(
        &self,
        doctor: &DoctorRecord,
        request: &BookingRequest,
        composer: &dyn MailComposer,
    ) -> Result<BookingReceipt, AppError> {
        let doctor_name = doctor.full_name.as_deref().map(str::trim).unwrap_or("");
        if doctor_name.is_empty() || request.requester.name.trim().is_empty() {
            return Err(AppError::Validation("Missing doctor or user information".to_string()));
        }

        let document = AppointmentRequest {
            doctor_id: doctor.id.clone(),
            user_id: request.requester.user_id.clone(),
            doctor_name: doctor_name.to_string(),
            user_name: request.requester.name.clone(),
            user_email: request.requester.email.clone(),
            user_phone: request.requester.phone.clone(),
            purpose: request.purpose.clone(),
            datetime: request.datetime,
            created_at: Utc::now(),
        };

        let appointment_id = self.create_appointment(&document).await?;
        info!("Appointment request {} created for doctor {}", appointment_id, doctor.id);

        let mail_error = match doctor.email.as_deref().filter(|e| !e.trim().is_empty()) {
            None => {
                warn!("Doctor {} has no email address; skipping mail composer", doctor.id);
                Some(AppError::Upstream(format!(
                    "No email address on file for {}",
                    doctor.display_name()
                )))
            }
            Some(_) => {
                let draft = Self::draft_mail(doctor, request);
                match composer.open(&draft).await {
                    Ok(()) => None,
                    Err(e) => {
                        error!("Failed to open mail composer: {}", e);
                        Some(AppError::Upstream("Failed to open email app".to_string()))
                    }
                }
            }
        };

        Ok(BookingReceipt { appointment_id, mail_error })
    }

    async fn create_appointment(&self, document: &AppointmentRequest) -> Result<String, AppError> {
        debug!("Creating appointment request for doctor {}", document.doctor_id);

        let body = serde_json::to_value(document)
            .map_err(|e| AppError::Write(format!("Failed to encode appointment: {}", e)))?;

        let stored = self.backend
            .create(APPOINTMENTS, body, self.access_token.as_deref())
            .await
            .map_err(|e| {
                error!("Failed to save appointment: {}", e);
                AppError::Write(e.to_string())
            })?;

        match stored.get("id") {
            Some(Value::String(id)) => Ok(id.clone()),
            Some(Value::Number(id)) => Ok(id.to_string()),
            _ => Err(AppError::Write("Store returned an appointment without an id".to_string())),
        }
    }
}
