//! Static provider catalog and profile extraction.

mod catalog;
mod mapping;

pub use catalog::{ProfileMapping, ProviderSpec, TokenPlacement, spec};
pub use mapping::{extract_profile, lookup};
