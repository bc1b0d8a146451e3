//! Launcher port
//!
//! Opens an external authorization page on behalf of a session.

use unilogin_domain::ProviderType;
use url::Url;

/// Errors a launcher can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LaunchError {
    /// Nothing on the host can open the page.
    #[error("no handler available: {0}")]
    Unavailable(String),

    /// The host refused to open the page.
    #[error("launch rejected: {0}")]
    Rejected(String),
}

/// A request to open an authorization page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    /// Provider the page belongs to.
    pub provider: ProviderType,
    /// Request code the resulting callback must carry.
    pub request_code: i32,
    /// Authorization URL.
    pub url: Url,
}

/// Port for opening authorization pages (browser, custom tab, system activity).
pub trait Launcher: Send + Sync {
    /// Opens the page.
    ///
    /// # Errors
    /// Returns a [`LaunchError`] if the page could not be opened.
    fn launch(&self, request: &LaunchRequest) -> Result<(), LaunchError>;
}
