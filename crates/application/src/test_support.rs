//! Hand-written fakes for the unit tests of this crate.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use unilogin_domain::{
    CallbackEvent, LoginResult, ProviderConfig, ProviderError, ProviderType, ResultCode,
    UserProfile,
};

use crate::channel::ResultChannel;
use crate::host::{ApplicationContext, HostContext};
use crate::ports::{
    BootstrapError, LaunchError, LaunchRequest, Launcher, PlatformBootstrap, ProviderSession,
    SessionFactory, SessionPhase,
};

pub struct NoopLauncher;

impl Launcher for NoopLauncher {
    fn launch(&self, _request: &LaunchRequest) -> Result<(), LaunchError> {
        Ok(())
    }
}

pub fn host() -> HostContext {
    HostContext::new("test-host", Arc::new(NoopLauncher))
}

/// Resolves synchronously: `token` in the payload means success.
pub struct FakeSession {
    provider: ProviderType,
    channel: ResultChannel,
    phase: SessionPhase,
    started: Arc<AtomicUsize>,
    disposed: Arc<AtomicUsize>,
}

impl ProviderSession for FakeSession {
    fn provider(&self) -> ProviderType {
        self.provider
    }

    fn channel(&self) -> &ResultChannel {
        &self.channel
    }

    fn phase(&self) -> SessionPhase {
        self.phase
    }

    fn start(&mut self) {
        self.started.fetch_add(1, Ordering::SeqCst);
        self.phase = SessionPhase::AwaitingCallback;
    }

    fn handle_callback(&mut self, event: &CallbackEvent) -> bool {
        if event.request_code != self.provider.request_code() {
            return false;
        }
        self.phase = SessionPhase::Idle;
        let result = match (event.result_code, event.payload.non_empty("token")) {
            (ResultCode::Canceled, _) => {
                LoginResult::failed(self.provider, ProviderError::Canceled { reason: None })
            }
            (_, Some(_)) => {
                let user = event.payload.get("user").unwrap_or("user");
                LoginResult::succeeded(self.provider, UserProfile::new(user))
            }
            (_, None) => LoginResult::failed(self.provider, ProviderError::MissingToken),
        };
        self.channel.emit(result);
        true
    }

    fn dispose(&mut self) {
        self.phase = SessionPhase::Idle;
        self.disposed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeFactory {
    created: AtomicUsize,
    started: Arc<AtomicUsize>,
    disposed: Arc<AtomicUsize>,
}

impl FakeFactory {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn disposed(&self) -> usize {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl SessionFactory for FakeFactory {
    fn create(
        &self,
        provider: ProviderType,
        _config: &ProviderConfig,
        _host: &HostContext,
    ) -> Box<dyn ProviderSession> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Box::new(FakeSession {
            provider,
            channel: ResultChannel::new(provider),
            phase: SessionPhase::Idle,
            started: Arc::clone(&self.started),
            disposed: Arc::clone(&self.disposed),
        })
    }
}

#[derive(Default)]
pub struct CountingBootstrap {
    calls: Mutex<Vec<ProviderType>>,
}

impl CountingBootstrap {
    pub fn calls_for(&self, provider: ProviderType) -> usize {
        self.calls.lock().iter().filter(|p| **p == provider).count()
    }
}

impl PlatformBootstrap for CountingBootstrap {
    fn bootstrap(
        &self,
        provider: ProviderType,
        _config: &ProviderConfig,
        _app: &ApplicationContext,
    ) -> Result<(), BootstrapError> {
        self.calls.lock().push(provider);
        Ok(())
    }
}

pub fn token_callback(provider: ProviderType, user: &str) -> CallbackEvent {
    CallbackEvent::ok(
        provider.request_code(),
        unilogin_domain::CallbackPayload::from_pairs([("token", "tok"), ("user", user)]),
    )
}
