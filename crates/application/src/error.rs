//! Application error types

use thiserror::Error;
use unilogin_domain::DomainError;

/// Message carried when the application or host context is missing.
pub const CONTEXT_MISSING: &str = "Context object is missing.";

/// Message carried when a provider has no registered config.
pub const CONFIG_MISSING: &str = "Config object is missing.";

/// Application-level errors.
///
/// These signal misuse of the coordinator. Failures of a login attempt
/// itself are reported through a failed
/// [`LoginResult`](unilogin_domain::LoginResult) instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplicationError {
    /// A required context is missing or a config is invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A login could not be started.
    #[error("login failed: {0}")]
    LoginFailed(String),
}

impl ApplicationError {
    /// The application or host context is missing.
    #[must_use]
    pub fn context_missing() -> Self {
        Self::Configuration(CONTEXT_MISSING.to_string())
    }

    /// No config was registered for the provider.
    #[must_use]
    pub fn config_missing() -> Self {
        Self::LoginFailed(CONFIG_MISSING.to_string())
    }
}

impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
