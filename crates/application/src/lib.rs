//! Unilogin Application - Session coordination and ports
//!
//! This crate defines the coordination layer of a social login:
//! - Port traits implemented by provider adapters
//! - The session registry, callback router and result aggregator
//! - The [`LoginCoordinator`] façade tying them together

pub mod aggregator;
pub mod channel;
pub mod coordinator;
pub mod error;
pub mod host;
pub mod ports;
pub mod registry;
pub mod router;

#[cfg(test)]
mod test_support;

pub use aggregator::{ResultAggregator, ResultStream};
pub use channel::{InFlightTask, LoginListener, ResultChannel, SharedListener};
pub use coordinator::{LoginCoordinator, ProviderState};
pub use error::{ApplicationError, ApplicationResult, CONFIG_MISSING, CONTEXT_MISSING};
pub use host::{ApplicationContext, HostContext};
pub use ports::{
    AccessToken, BootstrapError, IdentityClient, LaunchError, LaunchRequest, Launcher,
    PlatformBootstrap, ProfileRequest, ProviderSession, SessionFactory, SessionPhase,
    TokenAuthMethod, TokenRequest,
};
pub use registry::SessionRegistry;
pub use router::{CallbackRouter, DispatchOutcome};
