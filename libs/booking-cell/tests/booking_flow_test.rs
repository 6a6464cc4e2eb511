use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use serde_json::json;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};

use booking_cell::{BookingRequest, BookingService, MailComposer, MailDraft, Requester};
use directory_cell::{DirectoryAudience, DirectoryLoader};
use shared_utils::test_utils::{JwtTestUtils, MockStoreResponses, TestConfig, TestUser};

#[derive(Default)]
struct RecordingComposer {
    opened: Mutex<Vec<String>>,
}

#[async_trait]
impl MailComposer for RecordingComposer {
    async fn open(&self, draft: &MailDraft) -> Result<()> {
        self.opened.lock().unwrap().push(draft.mailto());
        Ok(())
    }
}

#[tokio::test]
async fn test_profile_to_booking_flow() {
    let server = MockServer::start().await;
    let config = TestConfig::with_server(&server.uri());
    let patient = TestUser::patient("kabo@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.jwt_secret, Some(1));

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", "eq.doc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::doctor_document("doc-1", "Neo Dube", "Cardiologist", false),
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(header("Authorization", format!("Bearer {}", token).as_str()))
        .and(body_partial_json(json!({
            "doctorId": "doc-1",
            "userId": patient.id,
            "doctorName": "Neo Dube",
            "userName": "Kabo Molefe",
            "purpose": "Follow-up",
            "datetime": "2026-11-02T10:00:00Z"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::appointment_document("appt-9", "doc-1", &patient.id),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let app_config = config.to_app_config();
    let doctor = DirectoryLoader::new(&app_config)
        .with_access_token(Some(token.clone()))
        .get_doctor("doc-1", DirectoryAudience::Patient)
        .await
        .unwrap();

    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
    assert!(BookingService::check_bookable(&doctor, noon).unwrap().is_available());

    let request = BookingRequest {
        requester: Requester {
            user_id: patient.id.clone(),
            name: "Kabo Molefe".to_string(),
            email: patient.email.clone(),
            phone: "71234567".to_string(),
        },
        datetime: DateTime::parse_from_rfc3339("2026-11-02T10:00:00Z").unwrap().with_timezone(&Utc),
        purpose: "Follow-up".to_string(),
    };

    let composer = RecordingComposer::default();
    let receipt = BookingService::new(&app_config)
        .with_access_token(Some(token))
        .submit(&doctor, &request, &composer)
        .await
        .unwrap();

    assert_eq!(receipt.appointment_id, "appt-9");
    assert!(receipt.mail_opened());

    let opened = composer.opened.lock().unwrap();
    assert_eq!(opened.len(), 1);
    assert!(opened[0].starts_with("mailto:doc-1@clinic.example?subject=Appointment%20Request&body="));
}

#[tokio::test]
async fn test_doctor_without_email_still_gets_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": "appt-2" }])))
        .expect(1)
        .mount(&server)
        .await;

    let mut doctor = directory_cell::DoctorRecord::new("doc-2", "Mpho Ramotswe", "Dentist");
    doctor.email = None;
    let request = BookingRequest {
        requester: Requester {
            user_id: "user-2".to_string(),
            name: "Lesego".to_string(),
            email: "lesego@example.com".to_string(),
            phone: "72345678".to_string(),
        },
        datetime: Utc::now(),
        purpose: String::new(),
    };

    let composer = RecordingComposer::default();
    let receipt = BookingService::new(&TestConfig::with_server(&server.uri()).to_app_config())
        .submit(&doctor, &request, &composer)
        .await
        .unwrap();

    assert_eq!(receipt.appointment_id, "appt-2");
    assert!(!receipt.mail_opened());
    assert!(composer.opened.lock().unwrap().is_empty());
}
