//! Unilogin Infrastructure - Provider adapters
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer:
//! - [`OAuthSession`], a catalog-driven [`ProviderSession`](unilogin_application::ProviderSession)
//! - [`SdkBootstrapper`] for providers with a process-wide SDK
//! - [`ReqwestIdentityClient`] for token exchange and profile fetches
//! - [`LoginSettings`], layered file and environment configuration

pub mod adapters;
pub mod bootstrap;
pub mod pkce;
pub mod providers;
pub mod session;
pub mod settings;

pub use adapters::{ClientBuildError, ReqwestIdentityClient};
pub use bootstrap::{BootstrapRecord, SdkBootstrapper};
pub use providers::{ProviderSpec, spec};
pub use session::{OAuthSession, OAuthSessionFactory, authorization_url};
pub use settings::{HttpSettings, LoginSettings, SettingsError};
