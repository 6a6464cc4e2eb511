use chrono::{Duration, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use shared_config::AppConfig;
use shared_database::{ApiError, BackendClient};
use shared_models::auth::Session;
use shared_models::error::AppError;
use shared_utils::jwt::{token_expiry, user_from_token};

use crate::models::{FederatedProvider, TokenResponse};

/// Client for the hosted auth service's token endpoints.
#[derive(Clone)]
pub struct AuthService {
    backend: BackendClient,
}

impl AuthService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AppError> {
        debug!("Creating account for {}", email);

        let response: TokenResponse = self.backend
            .request(
                Method::POST,
                "/auth/v1/signup",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await
            .map_err(|e| map_auth_error(e, "Sign-up"))?;

        info!("Account created for {}", email);
        session_from_response(response)
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AppError> {
        debug!("Password sign-in for {}", email);

        let response: TokenResponse = self.backend
            .request(
                Method::POST,
                "/auth/v1/token?grant_type=password",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await
            .map_err(|e| map_auth_error(e, "Sign-in"))?;

        session_from_response(response)
    }

    pub async fn sign_in_with_provider(
        &self,
        provider: FederatedProvider,
        credential: &str,
    ) -> Result<Session, AppError> {
        debug!("Federated sign-in with {}", provider.as_str());

        let mut body = json!({ "provider": provider.as_str() });
        body[provider.credential_field()] = Value::String(credential.to_string());

        let response: TokenResponse = self.backend
            .request(Method::POST, "/auth/v1/token?grant_type=id_token", None, Some(body))
            .await
            .map_err(|e| map_auth_error(e, "Federated sign-in"))?;

        session_from_response(response)
    }

    /// Revokes the refresh token behind `access_token`.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        let _: Value = self.backend
            .request(Method::POST, "/auth/v1/logout", Some(access_token), None)
            .await
            .map_err(|e| map_auth_error(e, "Sign-out"))?;
        Ok(())
    }

    pub async fn update_password(&self, access_token: &str, new_password: &str) -> Result<(), AppError> {
        let _: Value = self.backend
            .request(
                Method::PUT,
                "/auth/v1/user",
                Some(access_token),
                Some(json!({ "password": new_password })),
            )
            .await
            .map_err(|e| map_auth_error(e, "Password update"))?;

        info!("Password updated");
        Ok(())
    }

    pub async fn delete_user(&self, access_token: &str) -> Result<(), AppError> {
        let _: Value = self.backend
            .request(Method::DELETE, "/auth/v1/user", Some(access_token), None)
            .await
            .map_err(|e| map_auth_error(e, "Account deletion"))?;
        Ok(())
    }
}

/// Rejected credentials keep the service's message; anything else is an
/// outage of the auth service.
fn map_auth_error(err: anyhow::Error, action: &str) -> AppError {
    if let Some(api) = err.downcast_ref::<ApiError>() {
        if api.is_auth() {
            warn!("{} rejected: {}", action, api.message);
            return AppError::Auth(api.message.clone());
        }
    }
    error!("{} failed: {}", action, err);
    AppError::Upstream("Authentication service is unavailable. Please try again.".to_string())
}

fn session_from_response(response: TokenResponse) -> Result<Session, AppError> {
    let mut user = user_from_token(&response.access_token)
        .map_err(|e| AppError::Auth(format!("Invalid session token: {}", e)))?;

    if user.email.is_none() {
        user.email = response
            .user
            .as_ref()
            .and_then(|u| u.get("email"))
            .and_then(Value::as_str)
            .map(str::to_string);
    }

    let expires_at = token_expiry(&response.access_token)
        .or_else(|| response.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)));

    Ok(Session {
        user,
        access_token: response.access_token,
        refresh_token: response.refresh_token,
        expires_at,
    })
}
