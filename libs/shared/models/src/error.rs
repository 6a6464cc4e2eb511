use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Load failure: {0}")]
    Load(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Write failure: {0}")]
    Write(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("External service error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Text shown to the user at the screen boundary.
    ///
    /// Validation, auth and not-found messages are written for the user
    /// already; transport failures are replaced by a generic line so raw
    /// store responses never reach the screen.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Load(_) => "Failed to load data. Please try refreshing.".to_string(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Write(_) => "Failed to save changes. Please try again.".to_string(),
            AppError::Auth(msg) => msg.clone(),
            AppError::Upstream(msg) => msg.clone(),
            AppError::Config(_) => "The application is not configured correctly.".to_string(),
        }
    }

    /// Logs the error and converts it to its user-facing message.
    pub fn report(self) -> String {
        match &self {
            AppError::Validation(_) => tracing::debug!("{}", self),
            AppError::Auth(_) | AppError::NotFound(_) => tracing::warn!("{}", self),
            _ => tracing::error!("{}", self),
        }
        self.user_message()
    }
}
