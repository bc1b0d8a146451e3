//! Provider session port

use unilogin_domain::{CallbackEvent, ProviderConfig, ProviderType};

use crate::channel::ResultChannel;
use crate::host::HostContext;

/// Where a session is in its current login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No attempt in progress.
    #[default]
    Idle,
    /// The authorization page is open; waiting for the platform callback.
    AwaitingCallback,
    /// The callback arrived and background work is resolving it.
    Exchanging,
}

impl SessionPhase {
    /// Returns true while an attempt is in progress.
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// A stateful login driver bound to one provider and one host.
///
/// Every attempt ends with exactly one result emitted on the session's
/// [`ResultChannel`], unless the attempt is disposed first.
pub trait ProviderSession: Send {
    /// Provider this session drives.
    fn provider(&self) -> ProviderType;

    /// Channel the session emits its results on.
    fn channel(&self) -> &ResultChannel;

    /// Current attempt phase.
    fn phase(&self) -> SessionPhase;

    /// Starts a login attempt, replacing any attempt in progress.
    fn start(&mut self);

    /// Offers a platform callback to the session.
    ///
    /// Returns true if the event carried this session's request code and was
    /// consumed. Events for other providers are ignored.
    fn handle_callback(&mut self, event: &CallbackEvent) -> bool;

    /// Cancels in-flight work. No result is emitted for a disposed attempt.
    fn dispose(&mut self);

    /// Provider-level logout. Disposes in-flight work.
    fn logout(&mut self, clear_token: bool) {
        let _ = clear_token;
        self.dispose();
    }
}

/// Builds sessions for configured providers.
pub trait SessionFactory: Send + Sync {
    /// Creates a session bound to `host`.
    fn create(
        &self,
        provider: ProviderType,
        config: &ProviderConfig,
        host: &HostContext,
    ) -> Box<dyn ProviderSession>;
}
