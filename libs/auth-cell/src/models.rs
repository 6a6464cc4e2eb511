use serde::{Deserialize, Serialize};

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    /// Wipes both fields after a rejected sign-in.
    pub fn clear_credentials(&mut self) {
        self.email.clear();
        self.password.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// Third-party identity providers accepted for sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FederatedProvider {
    /// Credential is an OpenID id token.
    Google,
    /// Credential is an OAuth access token.
    Facebook,
}

impl FederatedProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            FederatedProvider::Google => "google",
            FederatedProvider::Facebook => "facebook",
        }
    }

    /// Body field the auth service expects the credential in.
    pub fn credential_field(&self) -> &'static str {
        match self {
            FederatedProvider::Google => "id_token",
            FederatedProvider::Facebook => "access_token",
        }
    }
}

/// Token grant returned by sign-up and every sign-in flavour.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub user: Option<serde_json::Value>,
}

/// Document in the `users` collection, keyed by the auth user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    ROLE_USER.to_string()
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Editable subset of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);
