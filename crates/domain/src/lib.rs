//! Unilogin Domain - Core login types
//!
//! This crate defines the provider-independent model of a social login:
//! provider identifiers, per-provider configuration, platform callback
//! events and the normalized login result.
//! All types here are pure Rust with no I/O dependencies.

pub mod callback;
pub mod config;
pub mod error;
pub mod id;
pub mod provider;
pub mod result;

pub use callback::{CallbackEvent, CallbackPayload, ResultCode};
pub use config::ProviderConfig;
pub use error::{DomainError, DomainResult, ProviderError};
pub use id::generate_attempt_id;
pub use provider::ProviderType;
pub use result::{LoginResult, UserProfile};
