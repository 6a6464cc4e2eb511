use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::{AppConfig, PhonePolicy};
use shared_models::auth::{Session, User};

pub struct TestConfig {
    pub jwt_secret: String,
    pub backend_url: String,
    pub backend_anon_key: String,
    pub media_upload_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-signing-must-be-long-enough".to_string(),
            backend_url: "http://localhost:54321".to_string(),
            backend_anon_key: "test-anon-key".to_string(),
            media_upload_url: "http://localhost:54322/image/upload".to_string(),
        }
    }
}

impl TestConfig {
    /// Points both the backend and the media host at a mock server.
    pub fn with_server(uri: &str) -> Self {
        Self {
            backend_url: uri.to_string(),
            media_upload_url: format!("{}/image/upload", uri),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            backend_url: self.backend_url.clone(),
            backend_anon_key: self.backend_anon_key.clone(),
            media_upload_url: self.media_upload_url.clone(),
            media_upload_preset: "test-preset".to_string(),
            search_includes_city: false,
            profile_phone_policy: PhonePolicy::MinDigits { min: 7 },
            registration_phone_policy: PhonePolicy::ExactDigits { digits: 8 },
            doctor_phone_policy: PhonePolicy::CountryCode { code: "+267".to_string(), digits: 8 },
        }
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "user".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "user")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some("authenticated".to_string()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }

    pub fn to_session(&self, secret: &str) -> Session {
        Session {
            user: self.to_user(),
            access_token: JwtTestUtils::create_test_token(self, secret, Some(1)),
            refresh_token: Some("test-refresh-token".to_string()),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": "authenticated",
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Canned documents and auth payloads in the shapes the backend returns.
pub struct MockStoreResponses;

impl MockStoreResponses {
    pub fn doctor_document(id: &str, full_name: &str, profession: &str, suspended: bool) -> Value {
        json!({
            "id": id,
            "fullName": full_name,
            "profession": profession,
            "isSuspended": suspended,
            "email": format!("{}@clinic.example", id),
            "phone": "71234567",
            "city": "Gaborone",
            "gender": "Female",
            "rating": 4.5,
            "location": { "latitude": -24.6581, "longitude": 25.9122 },
            "workingHours": { "start": "09:00", "end": "17:00" },
            "bio": "Experienced practitioner",
            "profileImageUrl": null
        })
    }

    pub fn user_profile_document(user: &TestUser) -> Value {
        json!({
            "id": user.id,
            "firstName": "Test",
            "lastName": "User",
            "email": user.email,
            "phone": "71234567",
            "role": user.role
        })
    }

    pub fn token_response(user: &TestUser, secret: &str) -> Value {
        json!({
            "access_token": JwtTestUtils::create_test_token(user, secret, Some(1)),
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "test-refresh-token",
            "user": { "id": user.id, "email": user.email }
        })
    }

    pub fn appointment_document(id: &str, doctor_id: &str, user_id: &str) -> Value {
        json!({
            "id": id,
            "doctorId": doctor_id,
            "userId": user_id,
            "purpose": "Check-up",
            "datetime": "2026-11-02T10:00:00+00:00",
            "createdAt": "2026-10-18T08:00:00+00:00"
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "error": code,
            "error_description": message
        })
    }
}
