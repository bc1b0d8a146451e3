//! Catalog-driven provider sessions.

mod authorize;
mod oauth_session;

pub use authorize::{authorization_url, requested_scopes};
pub use oauth_session::{OAuthSession, OAuthSessionFactory, profile_request};
