//! Process-wide SDK bootstrap.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info};
use unilogin_application::{ApplicationContext, BootstrapError, PlatformBootstrap};
use unilogin_domain::{ProviderConfig, ProviderType};

/// One completed SDK initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapRecord {
    /// Provider whose SDK was initialized.
    pub provider: ProviderType,
    /// Application the SDK was initialized for.
    pub application_id: String,
    /// When it happened.
    pub at: DateTime<Utc>,
}

/// Initializes the SDKs of providers that need it and keeps a record.
///
/// Kakao, Twitter, Facebook and VK ship SDKs that must be set up once with
/// the application before their login screens work. Other providers are
/// accepted and ignored.
#[derive(Debug, Default)]
pub struct SdkBootstrapper {
    records: Mutex<Vec<BootstrapRecord>>,
}

impl SdkBootstrapper {
    /// Creates a bootstrapper with no history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every initialization so far, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<BootstrapRecord> {
        self.records.lock().clone()
    }

    /// How many times a provider's SDK was initialized.
    #[must_use]
    pub fn count(&self, provider: ProviderType) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|r| r.provider == provider)
            .count()
    }
}

impl PlatformBootstrap for SdkBootstrapper {
    fn bootstrap(
        &self,
        provider: ProviderType,
        config: &ProviderConfig,
        app: &ApplicationContext,
    ) -> Result<(), BootstrapError> {
        if !provider.requires_sdk_bootstrap() {
            debug!(%provider, "provider has no SDK to bootstrap");
            return Ok(());
        }
        if !app.is_alive() {
            return Err(BootstrapError {
                provider,
                message: "application context is gone".to_string(),
            });
        }
        // Twitter's SDK is keyed by consumer key and secret together.
        if provider == ProviderType::Twitter
            && config.client_secret.as_deref().is_none_or(str::is_empty)
        {
            return Err(BootstrapError {
                provider,
                message: "consumer secret is required".to_string(),
            });
        }

        info!(%provider, application_id = app.application_id(), "provider SDK initialized");
        self.records.lock().push(BootstrapRecord {
            provider,
            application_id: app.application_id().to_string(),
            at: Utc::now(),
        });
        Ok(())
    }
}
