//! Normalized login results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::id::generate_attempt_id;
use crate::provider::ProviderType;

/// Identity extracted from a provider's profile response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Provider-scoped user id.
    pub user_id: String,
    /// Full display name.
    pub display_name: Option<String>,
    /// Given name, when the provider reports it separately.
    pub first_name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Profile picture URL.
    pub avatar_url: Option<String>,
}

impl UserProfile {
    /// Creates a profile with only a user id.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }
}

/// The terminal outcome of one login attempt.
///
/// A result is successful exactly when it carries a user id and no error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResult {
    /// Unique id of the attempt.
    pub attempt_id: String,
    /// Provider that produced the result.
    pub provider: ProviderType,
    /// Whether the login succeeded.
    pub success: bool,
    /// Provider-scoped user id, present on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Profile picture URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Failure reason, present on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ProviderError>,
    /// When the attempt resolved.
    pub completed_at: DateTime<Utc>,
}

impl LoginResult {
    /// Builds a successful result from a profile.
    #[must_use]
    pub fn succeeded(provider: ProviderType, profile: UserProfile) -> Self {
        // Prefer the full name; fall back to the given name.
        let display_name = profile.display_name.or(profile.first_name);
        Self {
            attempt_id: generate_attempt_id(),
            provider,
            success: true,
            user_id: Some(profile.user_id),
            display_name,
            email: profile.email,
            avatar_url: profile.avatar_url,
            error: None,
            completed_at: Utc::now(),
        }
    }

    /// Builds a failed result.
    #[must_use]
    pub fn failed(provider: ProviderType, error: ProviderError) -> Self {
        Self {
            attempt_id: generate_attempt_id(),
            provider,
            success: false,
            user_id: None,
            display_name: None,
            email: None,
            avatar_url: None,
            error: Some(error),
            completed_at: Utc::now(),
        }
    }

    /// Replaces the generated attempt id.
    #[must_use]
    pub fn with_attempt_id(mut self, attempt_id: impl Into<String>) -> Self {
        self.attempt_id = attempt_id.into();
        self
    }

    /// Returns true if the login succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }
}
