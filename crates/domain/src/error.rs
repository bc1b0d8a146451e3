//! Domain error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::ProviderType;

/// Domain-level errors that can occur during validation or parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provider identifier is not supported.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// A provider configuration failed validation.
    #[error("invalid config for {provider}: {reason}")]
    InvalidConfig {
        /// The provider the config was registered for.
        provider: ProviderType,
        /// What is wrong with it.
        reason: String,
    },

    /// A redirect URL could not be turned into a callback event.
    #[error("invalid callback: {0}")]
    InvalidCallback(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Why a single login attempt failed.
///
/// These never propagate as errors past the aggregation layer. They travel
/// inside a failed [`LoginResult`](crate::LoginResult).
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderError {
    /// The HTTP round trip failed.
    #[error("network error: {message}")]
    Network {
        /// Transport error message.
        message: String,
    },

    /// The provider answered with something we could not interpret.
    #[error("malformed provider response: {message}")]
    MalformedResponse {
        /// What was wrong with the response.
        message: String,
    },

    /// The user backed out of the flow.
    #[error("login canceled{}", .reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    Canceled {
        /// Provider-supplied reason, if any.
        reason: Option<String>,
    },

    /// The provider refused the authorization.
    #[error("authorization denied: {message}")]
    Denied {
        /// Provider error code or description.
        message: String,
    },

    /// No usable access token or authorization code was delivered.
    #[error("access token is missing or empty")]
    MissingToken,

    /// The profile response lacks a required identity field.
    #[error("profile response is missing '{field}'")]
    MissingIdentity {
        /// The missing field.
        field: String,
    },

    /// The host could not open the authorization page.
    #[error("could not launch authorization: {message}")]
    LaunchFailed {
        /// Launcher error message.
        message: String,
    },
}

impl ProviderError {
    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a malformed-response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Creates a denied error.
    pub fn denied(message: impl Into<String>) -> Self {
        Self::Denied {
            message: message.into(),
        }
    }

    /// Returns true if the user canceled the flow themselves.
    #[must_use]
    pub const fn is_user_canceled(&self) -> bool {
        matches!(self, Self::Canceled { .. })
    }
}
