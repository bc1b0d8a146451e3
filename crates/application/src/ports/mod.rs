//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the coordination core and the
//! provider adapters. Each port is a trait implemented in the
//! infrastructure layer (or by test fakes).

mod bootstrap;
mod identity;
mod launcher;
mod session;

pub use bootstrap::{BootstrapError, PlatformBootstrap};
pub use identity::{AccessToken, IdentityClient, ProfileRequest, TokenAuthMethod, TokenRequest};
pub use launcher::{LaunchError, LaunchRequest, Launcher};
pub use session::{ProviderSession, SessionFactory, SessionPhase};
