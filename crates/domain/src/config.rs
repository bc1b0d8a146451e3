//! Per-provider credentials and options

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::provider::ProviderType;

/// Credentials and options for one identity provider.
///
/// One instance is registered per [`ProviderType`] before sessions are built.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// OAuth client id (application id, consumer key).
    pub client_id: String,
    /// OAuth client secret (consumer secret), when the provider needs one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Redirect URI registered with the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    /// Scopes requested on top of the provider defaults.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Do not request the provider's default scopes.
    #[serde(default)]
    pub disable_default_scopes: bool,
    /// Ask the provider for the user's email address.
    #[serde(default)]
    pub require_email: bool,
    /// Extra query parameters appended to the authorization URL.
    #[serde(default)]
    pub extra_params: BTreeMap<String, String>,
}

impl ProviderConfig {
    /// Creates a config with only a client id.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: None,
            scopes: Vec::new(),
            disable_default_scopes: false,
            require_email: false,
            extra_params: BTreeMap::new(),
        }
    }

    /// Sets the client secret.
    #[must_use]
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Sets the redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Adds scopes on top of the provider defaults.
    #[must_use]
    pub fn with_scopes(mut self, scopes: &[&str]) -> Self {
        self.scopes.extend(scopes.iter().map(|s| (*s).to_string()));
        self
    }

    /// Asks the provider for the user's email address.
    #[must_use]
    pub const fn require_email(mut self, require: bool) -> Self {
        self.require_email = require;
        self
    }

    /// Adds an extra authorization parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_params.insert(key.into(), value.into());
        self
    }

    /// Validates the config for the given provider.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidConfig`] if the client id is blank, or if
    /// the provider's SDK bootstrap needs a secret that is missing.
    pub fn validate(&self, provider: ProviderType) -> DomainResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(DomainError::InvalidConfig {
                provider,
                reason: "client_id is empty".to_string(),
            });
        }

        // Twitter's SDK is initialized with the consumer key *and* secret.
        if provider == ProviderType::Twitter
            && self.client_secret.as_deref().is_none_or(str::is_empty)
        {
            return Err(DomainError::InvalidConfig {
                provider,
                reason: "client_secret is required".to_string(),
            });
        }

        if let Some(redirect_uri) = &self.redirect_uri {
            url::Url::parse(redirect_uri).map_err(|e| DomainError::InvalidConfig {
                provider,
                reason: format!("redirect_uri is not a valid URL: {e}"),
            })?;
        }

        Ok(())
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("disable_default_scopes", &self.disable_default_scopes)
            .field("require_email", &self.require_email)
            .field("extra_params", &self.extra_params)
            .finish()
    }
}
