use tracing::{info, warn};

use shared_config::AppConfig;
use shared_models::auth::Session;
use shared_models::error::AppError;
use shared_utils::validation::{
    is_valid_email, require_fields, validate_new_password, validate_password_change, PhoneValidator,
};

use crate::models::{
    FederatedProvider, LoginForm, ProfileUpdate, Registration, UserProfile, ROLE_USER,
};
use crate::services::auth::AuthService;
use crate::services::profile::ProfileService;
use crate::services::session::SessionStore;

const INVALID_CREDENTIALS: &str = "Invalid email or password.";
const NOT_ADMIN: &str = "Access denied: Not an admin.";

/// User-facing account flows on top of the auth service, the profile
/// collection and the session store.
pub struct AccountService {
    auth: AuthService,
    profiles: ProfileService,
    sessions: SessionStore,
    registration_phone: PhoneValidator,
}

impl AccountService {
    pub fn new(config: &AppConfig, sessions: SessionStore) -> Self {
        Self {
            auth: AuthService::new(config),
            profiles: ProfileService::new(config),
            sessions,
            registration_phone: PhoneValidator::new(&config.registration_phone_policy),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    fn require_session(&self) -> Result<Session, AppError> {
        self.sessions
            .current()
            .ok_or_else(|| AppError::Auth("Not logged in".to_string()))
    }

    pub async fn register(&self, registration: &Registration) -> Result<Session, AppError> {
        require_fields(&[
            &registration.email,
            &registration.password,
            &registration.first_name,
            &registration.last_name,
            &registration.phone,
        ])?;
        if !is_valid_email(&registration.email) {
            return Err(AppError::Validation("Please enter a valid email address".to_string()));
        }
        validate_new_password(&registration.password)?;
        self.registration_phone.validate(&registration.phone)?;

        let email = registration.email.trim();
        let session = self.auth.sign_up(email, &registration.password).await?;

        let profile = UserProfile {
            first_name: registration.first_name.trim().to_string(),
            last_name: registration.last_name.trim().to_string(),
            email: email.to_string(),
            phone: registration.phone.trim().to_string(),
            role: ROLE_USER.to_string(),
        };
        self.profiles
            .create_profile(session.user_id(), &profile, &session.access_token)
            .await?;

        info!("Registered user {}", session.user_id());
        self.sessions.set(session.clone());
        Ok(session)
    }

    /// Password sign-in. A rejected attempt clears the form's credentials.
    pub async fn sign_in(&self, form: &mut LoginForm) -> Result<Session, AppError> {
        let session = self.password_session(form).await?;
        self.sessions.set(session.clone());
        Ok(session)
    }

    /// Sign-in for the admin dashboard: the profile must carry the admin role.
    pub async fn admin_sign_in(&self, form: &mut LoginForm) -> Result<(Session, UserProfile), AppError> {
        let session = self.password_session(form).await?;

        let profile = match self.profiles.get_profile(session.user_id(), &session.access_token).await {
            Ok(profile) if profile.is_admin() => profile,
            Ok(_) | Err(AppError::NotFound(_)) => {
                warn!("Non-admin sign-in attempt by {}", session.user_id());
                self.revoke(&session).await;
                return Err(AppError::Auth(NOT_ADMIN.to_string()));
            }
            Err(e) => {
                self.revoke(&session).await;
                return Err(e);
            }
        };

        self.sessions.set(session.clone());
        Ok((session, profile))
    }

    /// Federated sign-in; a first-time user gets a bare profile document.
    pub async fn sign_in_with_provider(
        &self,
        provider: FederatedProvider,
        credential: &str,
    ) -> Result<Session, AppError> {
        let session = self.auth.sign_in_with_provider(provider, credential).await?;

        match self.profiles.get_profile(session.user_id(), &session.access_token).await {
            Ok(_) => {}
            Err(AppError::NotFound(_)) => {
                let profile = UserProfile {
                    first_name: String::new(),
                    last_name: String::new(),
                    email: session.user.email.clone().unwrap_or_default(),
                    phone: String::new(),
                    role: ROLE_USER.to_string(),
                };
                self.profiles
                    .create_profile(session.user_id(), &profile, &session.access_token)
                    .await?;
            }
            Err(e) => return Err(e),
        }

        info!("Signed in {} with {}", session.user_id(), provider.as_str());
        self.sessions.set(session.clone());
        Ok(session)
    }

    pub async fn current_profile(&self) -> Result<UserProfile, AppError> {
        let session = self.require_session()?;
        self.profiles.get_profile(session.user_id(), &session.access_token).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, AppError> {
        let session = self.require_session()?;
        self.profiles
            .update_profile(session.user_id(), update, &session.access_token)
            .await
    }

    /// Validates locally, proves the current password, then sets the new one.
    pub async fn change_password(&self, current: &str, new: &str, confirm: &str) -> Result<(), AppError> {
        validate_password_change(current, new, confirm)?;

        let session = self.require_session()?;
        let email = session
            .user
            .email
            .clone()
            .ok_or_else(|| AppError::Auth("User not authenticated".to_string()))?;

        let fresh = self.reauthenticate(&email, current, "Current password is incorrect").await?;
        self.auth.update_password(&fresh.access_token, new).await?;

        self.sessions.set(fresh);
        info!("Password changed for {}", session.user_id());
        Ok(())
    }

    /// Re-authenticates, removes the profile document and the auth account,
    /// then ends the session.
    pub async fn delete_account(&self, password: &str) -> Result<(), AppError> {
        if password.is_empty() {
            return Err(AppError::Validation("Please enter your password".to_string()));
        }

        let session = self.require_session()?;
        let email = session
            .user
            .email
            .clone()
            .ok_or_else(|| AppError::Auth("User not authenticated".to_string()))?;

        let fresh = self.reauthenticate(&email, password, "Incorrect password").await?;
        self.profiles.delete_profile(fresh.user_id(), &fresh.access_token).await?;
        self.auth.delete_user(&fresh.access_token).await?;

        self.sessions.clear();
        info!("Deleted account {}", fresh.user_id());
        Ok(())
    }

    /// Ends the session locally even if revocation fails.
    pub async fn sign_out(&self) {
        if let Some(session) = self.sessions.current() {
            self.revoke(&session).await;
            info!("Signed out {}", session.user_id());
        }
        self.sessions.clear();
    }

    async fn password_session(&self, form: &mut LoginForm) -> Result<Session, AppError> {
        require_fields(&[&form.email, &form.password])?;

        match self.auth.sign_in_with_password(form.email.trim(), &form.password).await {
            Ok(session) => Ok(session),
            Err(AppError::Auth(reason)) => {
                warn!("Sign-in rejected: {}", reason);
                form.clear_credentials();
                Err(AppError::Auth(INVALID_CREDENTIALS.to_string()))
            }
            Err(e) => {
                form.clear_credentials();
                Err(e)
            }
        }
    }

    async fn reauthenticate(&self, email: &str, password: &str, rejected: &str) -> Result<Session, AppError> {
        match self.auth.sign_in_with_password(email, password).await {
            Err(AppError::Auth(_)) => Err(AppError::Auth(rejected.to_string())),
            other => other,
        }
    }

    async fn revoke(&self, session: &Session) {
        if let Err(e) = self.auth.sign_out(&session.access_token).await {
            warn!("Failed to revoke session for {}: {}", session.user_id(), e);
        }
    }
}
