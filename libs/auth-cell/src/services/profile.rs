use serde_json::{json, Value};
use tracing::{debug, error, info};

use shared_config::AppConfig;
use shared_database::{ApiError, BackendClient, USERS};
use shared_models::error::AppError;
use shared_utils::validation::{require_fields, PhoneValidator};

use crate::models::{ProfileUpdate, UserProfile};

/// Profile documents in the `users` collection.
#[derive(Clone)]
pub struct ProfileService {
    backend: BackendClient,
    phone_validator: PhoneValidator,
}

impl ProfileService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
            phone_validator: PhoneValidator::new(&config.profile_phone_policy),
        }
    }

    pub async fn get_profile(&self, user_id: &str, access_token: &str) -> Result<UserProfile, AppError> {
        debug!("Fetching profile for user {}", user_id);

        let document = self.backend
            .get(USERS, user_id, Some(access_token))
            .await
            .map_err(|e| match e.downcast_ref::<ApiError>() {
                Some(api) if api.is_not_found() => AppError::NotFound("User profile not found".to_string()),
                _ => {
                    error!("Failed to load profile {}: {}", user_id, e);
                    AppError::Load(e.to_string())
                }
            })?
            .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))?;

        serde_json::from_value(document)
            .map_err(|e| AppError::Load(format!("Invalid profile document for {}: {}", user_id, e)))
    }

    /// Creates the profile document under the auth user's id.
    pub async fn create_profile(
        &self,
        user_id: &str,
        profile: &UserProfile,
        access_token: &str,
    ) -> Result<UserProfile, AppError> {
        let mut document = serde_json::to_value(profile)
            .map_err(|e| AppError::Write(format!("Failed to encode profile: {}", e)))?;
        document["id"] = Value::String(user_id.to_string());

        let stored = self.backend
            .create(USERS, document, Some(access_token))
            .await
            .map_err(|e| {
                error!("Failed to create profile for {}: {}", user_id, e);
                AppError::Write(e.to_string())
            })?;

        info!("Created profile for user {}", user_id);
        Ok(serde_json::from_value(stored).unwrap_or_else(|_| profile.clone()))
    }

    /// Validates and saves the editable fields.
    pub async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
        access_token: &str,
    ) -> Result<UserProfile, AppError> {
        self.validate_update(update)?;

        let fields = json!({
            "firstName": update.first_name.trim(),
            "lastName": update.last_name.trim(),
            "phone": update.phone.trim(),
        });

        let stored = self.backend
            .update(USERS, user_id, fields, Some(access_token))
            .await
            .map_err(|e| {
                error!("Failed to update profile {}: {}", user_id, e);
                AppError::Write(e.to_string())
            })?;

        info!("Updated profile for user {}", user_id);
        serde_json::from_value(stored)
            .map_err(|e| AppError::Load(format!("Invalid profile document for {}: {}", user_id, e)))
    }

    pub async fn delete_profile(&self, user_id: &str, access_token: &str) -> Result<(), AppError> {
        self.backend
            .delete(USERS, user_id, Some(access_token))
            .await
            .map_err(|e| {
                error!("Failed to delete profile {}: {}", user_id, e);
                AppError::Write(e.to_string())
            })
    }

    pub fn validate_update(&self, update: &ProfileUpdate) -> Result<(), AppError> {
        require_fields(&[&update.first_name, &update.last_name, &update.phone])?;
        self.phone_validator.validate(&update.phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use wiremock::{MockServer, Mock, ResponseTemplate};
    use wiremock::matchers::{body_json, method, path, query_param};

    use shared_utils::test_utils::{MockStoreResponses, TestConfig, TestUser};

    fn update(phone: &str) -> ProfileUpdate {
        ProfileUpdate {
            first_name: "Kabo".to_string(),
            last_name: "Molefe".to_string(),
            phone: phone.to_string(),
        }
    }

    #[test]
    fn update_requires_every_field_and_a_valid_phone() {
        let service = ProfileService::new(&TestConfig::default().to_app_config());

        let mut blank = update("7123456");
        blank.last_name = " ".to_string();
        assert_eq!(service.validate_update(&blank).unwrap_err().user_message(), "All fields are required");

        assert_eq!(
            service.validate_update(&update("71-23")).unwrap_err().user_message(),
            "Please enter a valid phone number"
        );
        assert!(service.validate_update(&update("7123456")).is_ok());
    }

    #[test]
    fn update_rejects_non_ascii_digit_phone() {
        let service = ProfileService::new(&TestConfig::default().to_app_config());
        let arabic_indic = "\u{667}\u{661}\u{662}\u{663}\u{664}\u{665}\u{666}";
        assert_eq!(
            service.validate_update(&update(arabic_indic)).unwrap_err().user_message(),
            "Please enter a valid phone number"
        );
    }

    #[tokio::test]
    async fn get_profile_reads_users_document() {
        let server = MockServer::start().await;
        let user = TestUser::admin("admin@example.com");
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .and(query_param("id", format!("eq.{}", user.id).as_str()))
            .respond_with(ResponseTemplate::new(200)
                .set_body_json(json!([MockStoreResponses::user_profile_document(&user)])))
            .mount(&server)
            .await;

        let service = ProfileService::new(&TestConfig::with_server(&server.uri()).to_app_config());
        let profile = service.get_profile(&user.id, "token").await.unwrap();
        assert!(profile.is_admin());
        assert_eq!(profile.email, "admin@example.com");
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let service = ProfileService::new(&TestConfig::with_server(&server.uri()).to_app_config());
        assert_matches!(service.get_profile("nobody", "token").await, Err(AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_sends_trimmed_fields() {
        let server = MockServer::start().await;
        let user = TestUser::patient("kabo@example.com");
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/users"))
            .and(body_json(json!({ "firstName": "Kabo", "lastName": "Molefe", "phone": "7123456" })))
            .respond_with(ResponseTemplate::new(200)
                .set_body_json(json!([MockStoreResponses::user_profile_document(&user)])))
            .expect(1)
            .mount(&server)
            .await;

        let service = ProfileService::new(&TestConfig::with_server(&server.uri()).to_app_config());
        let mut padded = update(" 7123456 ");
        padded.first_name = " Kabo".to_string();
        assert!(service.update_profile(&user.id, &padded, "token").await.is_ok());
    }

    #[tokio::test]
    async fn invalid_update_never_reaches_store() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let service = ProfileService::new(&TestConfig::with_server(&server.uri()).to_app_config());
        let result = service.update_profile("u1", &update("12"), "token").await;
        assert_matches!(result, Err(AppError::Validation(_)));
    }
}
