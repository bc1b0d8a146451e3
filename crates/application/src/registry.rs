//! Session registry
//!
//! Owns the configured provider set and the live session per provider.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, warn};
use unilogin_domain::{ProviderConfig, ProviderType};

use crate::channel::ResultChannel;
use crate::error::{ApplicationError, ApplicationResult};
use crate::host::{ApplicationContext, HostContext};
use crate::ports::{PlatformBootstrap, ProviderSession, SessionFactory};

/// Configured providers and their sessions.
///
/// Sessions are bound to the host passed to
/// [`initialize_sessions`](Self::initialize_sessions) and never outlive it:
/// a rebuild, a reset or [`release_host`](Self::release_host) disposes them.
pub struct SessionRegistry {
    factory: Arc<dyn SessionFactory>,
    bootstrap: Arc<dyn PlatformBootstrap>,
    app: Option<ApplicationContext>,
    host: Option<HostContext>,
    configs: HashMap<ProviderType, ProviderConfig>,
    bootstrapped: HashSet<ProviderType>,
    sessions: BTreeMap<ProviderType, Box<dyn ProviderSession>>,
}

impl SessionRegistry {
    /// Creates an empty registry with no application context.
    #[must_use]
    pub fn new(factory: Arc<dyn SessionFactory>, bootstrap: Arc<dyn PlatformBootstrap>) -> Self {
        Self {
            factory,
            bootstrap,
            app: None,
            host: None,
            configs: HashMap::new(),
            bootstrapped: HashSet::new(),
            sessions: BTreeMap::new(),
        }
    }

    /// Sets the application context and resets all registrations.
    pub fn attach_application(&mut self, app: ApplicationContext) {
        self.reset();
        debug!(application_id = app.application_id(), "application context attached");
        self.app = Some(app);
    }

    /// The application context, if one was attached.
    #[must_use]
    pub const fn application(&self) -> Option<&ApplicationContext> {
        self.app.as_ref()
    }

    /// The host the current sessions are bound to.
    #[must_use]
    pub const fn host(&self) -> Option<&HostContext> {
        self.host.as_ref()
    }

    fn live_application(&self) -> ApplicationResult<&ApplicationContext> {
        self.app
            .as_ref()
            .filter(|app| app.is_alive())
            .ok_or_else(ApplicationError::context_missing)
    }

    /// Registers (or replaces) the config for a provider.
    ///
    /// Runs the provider's SDK bootstrap the first time the provider is
    /// registered after a reset. Live sessions keep the config they were
    /// built with until the next rebuild.
    ///
    /// # Errors
    /// Returns [`ApplicationError::Configuration`] if there is no live
    /// application context, if the config is invalid, or if the bootstrap
    /// fails.
    pub fn set_config(
        &mut self,
        provider: ProviderType,
        config: ProviderConfig,
    ) -> ApplicationResult<()> {
        let app = self.live_application()?;
        config.validate(provider)?;

        if !self.bootstrapped.contains(&provider) {
            self.bootstrap
                .bootstrap(provider, &config, app)
                .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
            self.bootstrapped.insert(provider);
            debug!(%provider, "provider bootstrapped");
        }

        if self.configs.insert(provider, config).is_some() {
            debug!(%provider, "provider config replaced");
        } else {
            info!(%provider, "provider configured");
        }
        Ok(())
    }

    /// The registered config for a provider.
    #[must_use]
    pub fn config(&self, provider: ProviderType) -> Option<&ProviderConfig> {
        self.configs.get(&provider)
    }

    /// Returns true if a config is registered for the provider.
    #[must_use]
    pub fn is_configured(&self, provider: ProviderType) -> bool {
        self.configs.contains_key(&provider)
    }

    /// Returns true if the provider's bootstrap ran since the last reset.
    #[must_use]
    pub fn is_bootstrapped(&self, provider: ProviderType) -> bool {
        self.bootstrapped.contains(&provider)
    }

    /// Configured providers in declaration order.
    #[must_use]
    pub fn configured_providers(&self) -> Vec<ProviderType> {
        let mut providers: Vec<_> = self.configs.keys().copied().collect();
        providers.sort_unstable();
        providers
    }

    /// Rebuilds every session for `host`.
    ///
    /// Prior sessions are disposed first, cancelling any login they had in
    /// flight. Returns the providers a session was built for.
    ///
    /// # Errors
    /// Returns [`ApplicationError::Configuration`] if the application
    /// context or the host is missing or torn down.
    pub fn initialize_sessions(&mut self, host: &HostContext) -> ApplicationResult<Vec<ProviderType>> {
        self.live_application()?;
        if !host.is_alive() {
            return Err(ApplicationError::context_missing());
        }

        self.dispose_all();

        let factory = Arc::clone(&self.factory);
        for provider in self.configured_providers() {
            if let Some(config) = self.configs.get(&provider) {
                let session = factory.create(provider, config, host);
                self.sessions.insert(provider, session);
            }
        }
        self.host = Some(host.clone());

        let built: Vec<_> = self.sessions.keys().copied().collect();
        info!(host = host.label(), sessions = built.len(), "sessions initialized");
        Ok(built)
    }

    /// The session for a provider.
    #[must_use]
    pub fn session(&self, provider: ProviderType) -> Option<&dyn ProviderSession> {
        self.sessions.get(&provider).map(|session| &**session)
    }

    /// The session for a provider, mutably.
    pub fn session_mut(&mut self, provider: ProviderType) -> Option<&mut (dyn ProviderSession + 'static)> {
        self.sessions.get_mut(&provider).map(|session| &mut **session)
    }

    /// Every live session, in provider order.
    pub fn sessions(&self) -> impl Iterator<Item = &(dyn ProviderSession + 'static)> {
        self.sessions.values().map(|session| &**session)
    }

    /// Every live session, mutably.
    pub fn sessions_mut(&mut self) -> impl Iterator<Item = &mut (dyn ProviderSession + 'static)> {
        self.sessions.values_mut().map(|session| &mut **session)
    }

    /// Number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Result channels of every live session.
    #[must_use]
    pub fn channels(&self) -> Vec<ResultChannel> {
        self.sessions().map(|session| session.channel().clone()).collect()
    }

    /// Clears configs, bootstrap records and sessions.
    pub fn reset(&mut self) {
        self.dispose_all();
        self.configs.clear();
        self.bootstrapped.clear();
    }

    /// Disposes and drops every session and forgets the host.
    pub fn release_host(&mut self) {
        self.dispose_all();
        if let Some(host) = self.host.take() {
            debug!(host = host.label(), "host released");
        }
    }

    fn dispose_all(&mut self) {
        for (provider, mut session) in std::mem::take(&mut self.sessions) {
            if session.phase().is_in_flight() {
                warn!(%provider, "login in flight cancelled by session teardown");
            }
            session.dispose();
        }
    }
}

impl Drop for SessionRegistry {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::test_support::{CountingBootstrap, FakeFactory, host};
    use pretty_assertions::assert_eq;

    fn registry() -> (SessionRegistry, Arc<FakeFactory>, Arc<CountingBootstrap>) {
        let factory = Arc::new(FakeFactory::default());
        let bootstrap = Arc::new(CountingBootstrap::default());
        let registry = SessionRegistry::new(
            Arc::clone(&factory) as Arc<dyn SessionFactory>,
            Arc::clone(&bootstrap) as Arc<dyn PlatformBootstrap>,
        );
        (registry, factory, bootstrap)
    }

    #[test]
    fn test_set_config_requires_application() {
        let (mut registry, _, _) = registry();
        let err = registry
            .set_config(ProviderType::Google, ProviderConfig::new("id"))
            .unwrap_err();
        assert_eq!(err, ApplicationError::context_missing());
    }

    #[test]
    fn test_set_config_rejects_torn_down_application() {
        let (mut registry, _, _) = registry();
        let app = ApplicationContext::new("app");
        registry.attach_application(app.clone());
        app.tear_down();

        let err = registry
            .set_config(ProviderType::Google, ProviderConfig::new("id"))
            .unwrap_err();
        assert_eq!(err, ApplicationError::context_missing());
    }

    #[test]
    fn test_set_config_rejects_invalid_config() {
        let (mut registry, _, _) = registry();
        registry.attach_application(ApplicationContext::new("app"));
        let err = registry
            .set_config(ProviderType::Github, ProviderConfig::new(""))
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Configuration(_)));
        assert!(!registry.is_configured(ProviderType::Github));
    }

    #[test]
    fn test_bootstrap_runs_once_per_provider() {
        let (mut registry, _, bootstrap) = registry();
        registry.attach_application(ApplicationContext::new("app"));

        for _ in 0..3 {
            registry
                .set_config(ProviderType::Kakao, ProviderConfig::new("kakao-key"))
                .unwrap();
        }
        registry
            .set_config(ProviderType::Google, ProviderConfig::new("google-id"))
            .unwrap();

        assert_eq!(bootstrap.calls_for(ProviderType::Kakao), 1);
        assert_eq!(bootstrap.calls_for(ProviderType::Google), 1);
        assert!(registry.is_bootstrapped(ProviderType::Kakao));
    }

    #[test]
    fn test_reset_clears_bootstrap_records() {
        let (mut registry, _, bootstrap) = registry();
        registry.attach_application(ApplicationContext::new("app"));
        registry
            .set_config(ProviderType::Vk, ProviderConfig::new("vk"))
            .unwrap();

        registry.attach_application(ApplicationContext::new("app"));
        assert!(!registry.is_configured(ProviderType::Vk));
        registry
            .set_config(ProviderType::Vk, ProviderConfig::new("vk"))
            .unwrap();

        assert_eq!(bootstrap.calls_for(ProviderType::Vk), 2);
    }

    #[test]
    fn test_initialize_builds_one_session_per_config() {
        let (mut registry, factory, _) = registry();
        registry.attach_application(ApplicationContext::new("app"));
        registry
            .set_config(ProviderType::Kakao, ProviderConfig::new("k"))
            .unwrap();
        registry
            .set_config(ProviderType::Google, ProviderConfig::new("g"))
            .unwrap();

        let built = registry.initialize_sessions(&host()).unwrap();

        assert_eq!(built, vec![ProviderType::Google, ProviderType::Kakao]);
        assert_eq!(registry.session_count(), 2);
        assert_eq!(factory.created(), 2);
        assert!(registry.session(ProviderType::Google).is_some());
        assert!(registry.session(ProviderType::Twitter).is_none());
    }

    #[test]
    fn test_initialize_twice_disposes_previous_sessions() {
        let (mut registry, factory, _) = registry();
        registry.attach_application(ApplicationContext::new("app"));
        registry
            .set_config(ProviderType::Line, ProviderConfig::new("l"))
            .unwrap();

        let host = host();
        registry.initialize_sessions(&host).unwrap();
        registry.initialize_sessions(&host).unwrap();

        assert_eq!(factory.created(), 2);
        assert_eq!(factory.disposed(), 1);
        assert_eq!(registry.session_count(), 1);
    }

    #[test]
    fn test_initialize_requires_live_host() {
        let (mut registry, _, _) = registry();
        registry.attach_application(ApplicationContext::new("app"));
        let host = host();
        host.tear_down();

        assert_eq!(
            registry.initialize_sessions(&host).unwrap_err(),
            ApplicationError::context_missing()
        );
    }

    #[test]
    fn test_reset_drops_sessions() {
        let (mut registry, factory, _) = registry();
        registry.attach_application(ApplicationContext::new("app"));
        registry
            .set_config(ProviderType::Naver, ProviderConfig::new("n"))
            .unwrap();
        registry.initialize_sessions(&host()).unwrap();

        registry.reset();

        assert_eq!(registry.session_count(), 0);
        assert_eq!(factory.disposed(), 1);
        assert!(registry.configured_providers().is_empty());
    }

    #[test]
    fn test_release_host() {
        let (mut registry, _, _) = registry();
        registry.attach_application(ApplicationContext::new("app"));
        registry
            .set_config(ProviderType::Twitch, ProviderConfig::new("t"))
            .unwrap();
        registry.initialize_sessions(&host()).unwrap();

        registry.release_host();

        assert!(registry.host().is_none());
        assert_eq!(registry.session_count(), 0);
        assert!(registry.is_configured(ProviderType::Twitch));
    }
}
