//! Platform bootstrap port

use unilogin_domain::{ProviderConfig, ProviderType};

use crate::host::ApplicationContext;

/// A provider SDK could not be bootstrapped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("bootstrap of {provider} failed: {message}")]
pub struct BootstrapError {
    /// Provider whose bootstrap failed.
    pub provider: ProviderType,
    /// What went wrong.
    pub message: String,
}

/// Port for the one-time, process-wide SDK setup some providers need.
///
/// The registry calls this at most once per provider between two resets.
pub trait PlatformBootstrap: Send + Sync {
    /// Bootstraps the provider SDK.
    ///
    /// # Errors
    /// Returns a [`BootstrapError`] if the SDK rejected the configuration.
    fn bootstrap(
        &self,
        provider: ProviderType,
        config: &ProviderConfig,
        app: &ApplicationContext,
    ) -> Result<(), BootstrapError>;
}
