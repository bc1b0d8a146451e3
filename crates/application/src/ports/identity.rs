//! Identity client port
//!
//! The HTTP side of an OAuth login: exchanging an authorization code for an
//! access token and fetching the user's profile with it.

use async_trait::async_trait;
use unilogin_domain::ProviderError;
use url::Url;

/// How client credentials are presented to the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenAuthMethod {
    /// `client_id` and `client_secret` in the form body.
    #[default]
    ClientSecretPost,
    /// HTTP Basic authentication.
    ClientSecretBasic,
}

/// An authorization-code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    /// Token endpoint.
    pub token_url: Url,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: Option<String>,
    /// Authorization code from the callback.
    pub code: String,
    /// Redirect URI used for the authorization request.
    pub redirect_uri: Option<String>,
    /// PKCE code verifier.
    pub code_verifier: Option<String>,
    /// Client authentication method.
    pub auth_method: TokenAuthMethod,
}

/// A token endpoint response.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    /// The access token. Never empty.
    pub access_token: String,
    /// Token type, usually `Bearer`.
    pub token_type: Option<String>,
    /// Lifetime in seconds.
    pub expires_in: Option<u64>,
    /// Refresh token.
    pub refresh_token: Option<String>,
    /// The full response, for provider-specific extras.
    pub raw: serde_json::Value,
}

/// A profile fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRequest {
    /// Profile endpoint, including any query parameters.
    pub url: Url,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
    /// Bearer token for the `Authorization` header.
    pub bearer: Option<String>,
}

/// Port for the OAuth HTTP round trips.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Exchanges an authorization code for an access token.
    ///
    /// # Errors
    /// Returns [`ProviderError::MissingToken`] if the response holds no
    /// usable token, and other variants for transport or provider errors.
    async fn exchange_code(&self, request: TokenRequest) -> Result<AccessToken, ProviderError>;

    /// Fetches the raw profile document.
    ///
    /// # Errors
    /// Returns a [`ProviderError`] for transport failures, error statuses or
    /// undecodable bodies.
    async fn fetch_profile(
        &self,
        request: ProfileRequest,
    ) -> Result<serde_json::Value, ProviderError>;
}
