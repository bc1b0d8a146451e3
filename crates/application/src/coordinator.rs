//! Login coordinator
//!
//! The public façade over the registry, the router and the aggregator.

use std::sync::Arc;

use tracing::{debug, info, warn};
use unilogin_domain::{CallbackEvent, ProviderConfig, ProviderType};

use crate::aggregator::{ResultAggregator, ResultStream};
use crate::channel::SharedListener;
use crate::error::{ApplicationError, ApplicationResult};
use crate::host::{ApplicationContext, HostContext};
use crate::ports::{PlatformBootstrap, SessionFactory};
use crate::registry::SessionRegistry;
use crate::router::{CallbackRouter, DispatchOutcome};

/// Lifecycle state of one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    /// No config registered.
    Unconfigured,
    /// Config registered, no session built yet.
    Configured,
    /// A session is live and idle.
    SessionActive,
    /// A login attempt is in progress.
    LoginInFlight,
}

/// Coordinates social logins across every configured provider.
///
/// All operations take `&mut self`; a coordinator is driven from one
/// place. Results arrive asynchronously through [`observe_results`] and
/// [`on_result`].
///
/// [`observe_results`]: Self::observe_results
/// [`on_result`]: Self::on_result
pub struct LoginCoordinator {
    registry: SessionRegistry,
    router: CallbackRouter,
    aggregator: ResultAggregator,
}

impl LoginCoordinator {
    /// Creates a coordinator with no application context.
    #[must_use]
    pub fn new(factory: Arc<dyn SessionFactory>, bootstrap: Arc<dyn PlatformBootstrap>) -> Self {
        Self {
            registry: SessionRegistry::new(factory, bootstrap),
            router: CallbackRouter::new(),
            aggregator: ResultAggregator::new(),
        }
    }

    /// Sets the application context and clears every registration.
    pub fn init(&mut self, app: ApplicationContext) {
        info!(application_id = app.application_id(), "login coordinator initialized");
        self.registry.attach_application(app);
        self.aggregator.rebind(Vec::new());
    }

    /// Registers the config for a provider.
    ///
    /// # Errors
    /// Returns [`ApplicationError::Configuration`] without a live application
    /// context or for an invalid config.
    pub fn set_config(
        &mut self,
        provider: ProviderType,
        config: ProviderConfig,
    ) -> ApplicationResult<()> {
        self.registry.set_config(provider, config)
    }

    /// Builds one session per configured provider, bound to `host`.
    ///
    /// Replaces every existing session. Logins in flight are cancelled.
    ///
    /// # Errors
    /// Returns [`ApplicationError::Configuration`] if the application
    /// context or the host is missing.
    pub fn initialize_sessions(&mut self, host: &HostContext) -> ApplicationResult<Vec<ProviderType>> {
        let built = self.registry.initialize_sessions(host)?;
        self.aggregator.rebind(self.registry.channels());
        Ok(built)
    }

    /// Starts a login with `provider`.
    ///
    /// A login already in flight for the provider is restarted.
    ///
    /// # Errors
    /// Returns [`ApplicationError::LoginFailed`] if no session exists for the
    /// provider, and [`ApplicationError::Configuration`] if the host the
    /// sessions were built for is gone.
    pub fn login(&mut self, provider: ProviderType) -> ApplicationResult<()> {
        if self.registry.session(provider).is_none() {
            return Err(ApplicationError::config_missing());
        }
        if !self.host_alive() {
            warn!(%provider, "login requested on a torn-down host; releasing sessions");
            self.release_host();
            return Err(ApplicationError::context_missing());
        }

        let session = self
            .registry
            .session_mut(provider)
            .ok_or_else(ApplicationError::config_missing)?;
        if session.phase().is_in_flight() {
            debug!(%provider, "restarting login in flight");
        }
        session.start();
        info!(%provider, "login started");
        Ok(())
    }

    /// Logs the provider session out.
    ///
    /// # Errors
    /// Returns [`ApplicationError::LoginFailed`] if no session exists.
    pub fn logout(&mut self, provider: ProviderType, clear_token: bool) -> ApplicationResult<()> {
        let session = self
            .registry
            .session_mut(provider)
            .ok_or_else(ApplicationError::config_missing)?;
        session.logout(clear_token);
        info!(%provider, clear_token, "logged out");
        Ok(())
    }

    /// Cancels the provider's in-flight work. The session stays registered.
    ///
    /// # Errors
    /// Returns [`ApplicationError::LoginFailed`] if no session exists.
    pub fn destroy_session(&mut self, provider: ProviderType) -> ApplicationResult<()> {
        let session = self
            .registry
            .session_mut(provider)
            .ok_or_else(ApplicationError::config_missing)?;
        session.dispose();
        debug!(%provider, "session destroyed");
        Ok(())
    }

    /// Routes a platform callback to the sessions.
    ///
    /// Callbacks arriving after the host was torn down release the stale
    /// sessions and are dropped.
    pub fn dispatch_callback(&mut self, event: &CallbackEvent) -> DispatchOutcome {
        if self.registry.session_count() > 0 && !self.host_alive() {
            warn!(
                request_code = event.request_code,
                "callback for a torn-down host; releasing sessions"
            );
            self.release_host();
            return DispatchOutcome::default();
        }
        self.router.dispatch(self.registry.sessions_mut(), event)
    }

    /// Opens a merged stream of every session's results.
    ///
    /// If no session exists and `host` is given, sessions are initialized
    /// for it first.
    ///
    /// # Errors
    /// Propagates the errors of [`initialize_sessions`](Self::initialize_sessions).
    pub fn observe_results(&mut self, host: Option<&HostContext>) -> ApplicationResult<ResultStream> {
        self.auto_initialize(host)?;
        Ok(self.aggregator.observe())
    }

    /// Attaches a listener to every session, replacing any previous one.
    ///
    /// The listener also receives results of sessions built later. If no
    /// session exists and `host` is given, sessions are initialized first.
    ///
    /// The listener is `Send + Sync` and runs on whichever thread emits the
    /// result, usually a runtime worker that finished the exchange rather
    /// than the thread driving the coordinator. Use
    /// [`observe_results`](Self::observe_results) to consume results on
    /// your own task.
    ///
    /// # Errors
    /// Propagates the errors of [`initialize_sessions`](Self::initialize_sessions).
    pub fn on_result(
        &mut self,
        listener: SharedListener,
        host: Option<&HostContext>,
    ) -> ApplicationResult<()> {
        self.auto_initialize(host)?;
        self.aggregator.attach_listener(listener);
        Ok(())
    }

    /// Forgets the host: every session is disposed and dropped.
    pub fn release_host(&mut self) {
        self.registry.release_host();
        self.aggregator.rebind(Vec::new());
    }

    /// Lifecycle state of a provider.
    #[must_use]
    pub fn state(&self, provider: ProviderType) -> ProviderState {
        match self.registry.session(provider) {
            Some(session) if session.phase().is_in_flight() => ProviderState::LoginInFlight,
            Some(_) => ProviderState::SessionActive,
            None if self.registry.is_configured(provider) => ProviderState::Configured,
            None => ProviderState::Unconfigured,
        }
    }

    /// Providers with a registered config.
    #[must_use]
    pub fn configured_providers(&self) -> Vec<ProviderType> {
        self.registry.configured_providers()
    }

    /// Providers with a live session.
    #[must_use]
    pub fn active_providers(&self) -> Vec<ProviderType> {
        self.registry.sessions().map(|s| s.provider()).collect()
    }

    /// The underlying registry.
    #[must_use]
    pub const fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// The callback router and its counters.
    #[must_use]
    pub const fn router(&self) -> &CallbackRouter {
        &self.router
    }

    fn host_alive(&self) -> bool {
        self.registry.host().is_some_and(HostContext::is_alive)
    }

    fn auto_initialize(&mut self, host: Option<&HostContext>) -> ApplicationResult<()> {
        match host {
            Some(host) if self.registry.session_count() == 0 => {
                self.initialize_sessions(host).map(|_| ())
            }
            _ => Ok(()),
        }
    }
}
