//! Layered settings: an optional file under `UNILOGIN__*` environment
//! variables.

use std::collections::BTreeMap;
use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use unilogin_domain::{ProviderConfig, ProviderType};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "UNILOGIN";

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The file or environment could not be read or deserialized.
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    /// A `providers` key names no supported provider.
    #[error("unknown provider in settings: {0}")]
    UnknownProvider(String),
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("unilogin/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Everything the login stack reads from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginSettings {
    /// Application id handed to provider SDKs.
    pub application_id: String,
    /// Redirect URI used by providers that do not set their own.
    pub redirect_uri: Option<String>,
    /// HTTP client settings.
    pub http: HttpSettings,
    /// Provider configs keyed by provider id (`google`, `kakao`, ...).
    pub providers: BTreeMap<String, ProviderConfig>,
}

impl Default for LoginSettings {
    fn default() -> Self {
        Self {
            application_id: "unilogin".to_string(),
            redirect_uri: None,
            http: HttpSettings::default(),
            providers: BTreeMap::new(),
        }
    }
}

impl LoginSettings {
    /// Loads settings from an optional file and the process environment.
    ///
    /// # Errors
    /// Returns [`SettingsError::Load`] if a source cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_from(path, None)
    }

    /// Loads settings with an explicit environment instead of the process
    /// one. A missing file is not an error.
    ///
    /// # Errors
    /// Returns [`SettingsError::Load`] if a source cannot be parsed.
    pub fn load_from(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Provider configs with the global redirect URI filled in.
    ///
    /// # Errors
    /// Returns [`SettingsError::UnknownProvider`] for unsupported keys.
    pub fn providers(&self) -> Result<Vec<(ProviderType, ProviderConfig)>, SettingsError> {
        self.providers
            .iter()
            .map(|(key, config)| {
                let provider: ProviderType = key
                    .parse()
                    .map_err(|_| SettingsError::UnknownProvider(key.clone()))?;
                let mut config = config.clone();
                if config.redirect_uri.is_none() {
                    config.redirect_uri.clone_from(&self.redirect_uri);
                }
                Ok((provider, config))
            })
            .collect()
    }
}
