//! Identity client implementation using reqwest.
//!
//! Performs the two HTTP round trips of an OAuth login: the authorization
//! code exchange and the profile fetch.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use unilogin_application::{AccessToken, IdentityClient, ProfileRequest, TokenAuthMethod, TokenRequest};
use unilogin_domain::ProviderError;

use crate::settings::HttpSettings;

/// Content-Type for form-urlencoded data.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Longest body excerpt quoted in error messages.
const EXCERPT_LEN: usize = 200;

/// The HTTP client could not be built.
#[derive(Debug, Error)]
#[error("failed to build HTTP client: {0}")]
pub struct ClientBuildError(#[from] reqwest::Error);

/// `OAuth2` error response.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl TokenErrorResponse {
    fn into_denied(self) -> ProviderError {
        ProviderError::denied(
            self.error_description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or(self.error),
        )
    }
}

/// [`IdentityClient`] over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestIdentityClient {
    client: Client,
}

impl ReqwestIdentityClient {
    /// Creates a client with the given timeout and user agent.
    ///
    /// Redirects are not followed: token and profile endpoints answer
    /// directly.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(settings: &HttpSettings) -> Result<Self, ClientBuildError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }

    /// Wraps an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn network(error: &reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        return ProviderError::network(format!("request timed out: {error}"));
    }
    ProviderError::network(error.to_string())
}

fn excerpt(body: &str) -> &str {
    let body = body.trim();
    match body.char_indices().nth(EXCERPT_LEN) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

/// Reads a token endpoint response.
///
/// JSON is expected; form-encoded bodies (older GitHub and Facebook
/// endpoints) are accepted as well. An OAuth error body wins over the
/// status code.
///
/// # Errors
///
/// - [`ProviderError::Denied`] for an OAuth error body.
/// - [`ProviderError::Network`] for any other non-success status.
/// - [`ProviderError::MalformedResponse`] for an undecodable body.
/// - [`ProviderError::MissingToken`] when `access_token` is absent or empty.
pub fn parse_token_response(status: u16, body: &str) -> Result<AccessToken, ProviderError> {
    if let Ok(error) = serde_json::from_str::<TokenErrorResponse>(body) {
        return Err(error.into_denied());
    }
    if !(200..300).contains(&status) {
        return Err(ProviderError::network(format!(
            "token endpoint returned {status}: {}",
            excerpt(body)
        )));
    }

    let raw = match serde_json::from_str::<Value>(body) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) => return Err(ProviderError::malformed("token response is not an object")),
        Err(_) => form_to_value(body)?,
    };
    if let Some(error) = raw.get("error").and_then(Value::as_str) {
        return Err(TokenErrorResponse {
            error: error.to_string(),
            error_description: raw
                .get("error_description")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
        .into_denied());
    }

    let access_token = raw
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.trim().is_empty())
        .ok_or(ProviderError::MissingToken)?
        .to_string();
    let text = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);
    let expires_in = raw.get("expires_in").and_then(|v| {
        v.as_u64()
            .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
    });

    Ok(AccessToken {
        access_token,
        token_type: text("token_type"),
        expires_in,
        refresh_token: text("refresh_token"),
        raw,
    })
}

fn form_to_value(body: &str) -> Result<Value, ProviderError> {
    let pairs: BTreeMap<String, String> = serde_urlencoded::from_str(body.trim())
        .map_err(|e| ProviderError::malformed(format!("token response: {e}")))?;
    if !pairs.values().any(|v| !v.is_empty()) {
        return Err(ProviderError::malformed(format!(
            "token response is neither JSON nor a form: {}",
            excerpt(body)
        )));
    }
    Ok(Value::Object(
        pairs
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect(),
    ))
}

/// Reads a profile endpoint response.
///
/// # Errors
///
/// - [`ProviderError::Denied`] for 401 and 403.
/// - [`ProviderError::Network`] for any other non-success status.
/// - [`ProviderError::MalformedResponse`] if the body is not JSON.
pub fn parse_profile_response(status: u16, body: &str) -> Result<Value, ProviderError> {
    match status {
        200..=299 => serde_json::from_str(body)
            .map_err(|e| ProviderError::malformed(format!("profile response: {e}"))),
        401 | 403 => Err(serde_json::from_str::<TokenErrorResponse>(body).map_or_else(
            |_| ProviderError::denied(format!("profile endpoint returned {status}")),
            TokenErrorResponse::into_denied,
        )),
        _ => Err(ProviderError::network(format!(
            "profile endpoint returned {status}: {}",
            excerpt(body)
        ))),
    }
}

#[async_trait]
impl IdentityClient for ReqwestIdentityClient {
    async fn exchange_code(&self, request: TokenRequest) -> Result<AccessToken, ProviderError> {
        let TokenRequest {
            token_url,
            client_id,
            client_secret,
            code,
            redirect_uri,
            code_verifier,
            auth_method,
        } = request;

        let mut builder = self
            .client
            .post(token_url.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(ACCEPT, JSON_CONTENT_TYPE);

        let mut params = vec![
            ("grant_type", "authorization_code".to_string()),
            ("code", code),
        ];
        if let Some(redirect_uri) = redirect_uri {
            params.push(("redirect_uri", redirect_uri));
        }
        if let Some(verifier) = code_verifier {
            params.push(("code_verifier", verifier));
        }
        match auth_method {
            TokenAuthMethod::ClientSecretPost => {
                params.push(("client_id", client_id));
                if let Some(secret) = client_secret {
                    params.push(("client_secret", secret));
                }
            }
            TokenAuthMethod::ClientSecretBasic => {
                builder = builder.basic_auth(&client_id, client_secret);
                // Public clients still identify themselves in the body.
                params.push(("client_id", client_id));
            }
        }

        let body = serde_urlencoded::to_string(&params)
            .map_err(|e| ProviderError::malformed(format!("failed to encode form: {e}")))?;

        debug!(url = %token_url, ?auth_method, "exchanging authorization code");
        let response = builder
            .body(body)
            .send()
            .await
            .map_err(|e| network(&e))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| network(&e))?;
        parse_token_response(status, &text)
    }

    async fn fetch_profile(&self, request: ProfileRequest) -> Result<Value, ProviderError> {
        let mut builder = self
            .client
            .get(request.url.clone())
            .header(ACCEPT, JSON_CONTENT_TYPE);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        debug!(url = %request.url.path(), "fetching profile");
        let response = builder.send().await.map_err(|e| network(&e))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| network(&e))?;
        parse_profile_response(status, &text)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_json_token_response() {
        let token = parse_token_response(
            200,
            r#"{"access_token":"at","token_type":"bearer","expires_in":3600,"refresh_token":"rt"}"#,
        )
        .unwrap();
        assert_eq!(token.access_token, "at");
        assert_eq!(token.token_type.as_deref(), Some("bearer"));
        assert_eq!(token.expires_in, Some(3600));
        assert_eq!(token.refresh_token.as_deref(), Some("rt"));
    }

    #[test]
    fn test_form_token_response() {
        let token =
            parse_token_response(200, "access_token=gho_16C7e42F&scope=repo&token_type=bearer")
                .unwrap();
        assert_eq!(token.access_token, "gho_16C7e42F");
        assert_eq!(token.raw["scope"], json!("repo"));
    }

    #[test]
    fn test_oauth_error_is_denied_even_on_200() {
        let err = parse_token_response(
            200,
            r#"{"error":"bad_verification_code","error_description":"The code passed is incorrect or expired."}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ProviderError::denied("The code passed is incorrect or expired.")
        );

        let err = parse_token_response(400, r#"{"error":"invalid_grant"}"#).unwrap_err();
        assert_eq!(err, ProviderError::denied("invalid_grant"));

        let err = parse_token_response(200, "error=access_denied").unwrap_err();
        assert_eq!(err, ProviderError::denied("access_denied"));
    }

    #[test]
    fn test_missing_or_empty_token() {
        assert_eq!(
            parse_token_response(200, r#"{"token_type":"bearer"}"#).unwrap_err(),
            ProviderError::MissingToken
        );
        assert_eq!(
            parse_token_response(200, r#"{"access_token":"  "}"#).unwrap_err(),
            ProviderError::MissingToken
        );
    }

    #[test]
    fn test_unexpected_token_bodies() {
        assert!(matches!(
            parse_token_response(502, "<html>Bad Gateway</html>").unwrap_err(),
            ProviderError::Network { .. }
        ));
        assert!(matches!(
            parse_token_response(200, "[1,2]").unwrap_err(),
            ProviderError::MalformedResponse { .. }
        ));
        assert!(matches!(
            parse_token_response(200, "").unwrap_err(),
            ProviderError::MalformedResponse { .. }
        ));
    }

    #[test]
    fn test_expires_in_as_string() {
        let token =
            parse_token_response(200, r#"{"access_token":"a","expires_in":"5183999"}"#).unwrap();
        assert_eq!(token.expires_in, Some(5_183_999));
    }

    #[test]
    fn test_profile_responses() {
        assert_eq!(
            parse_profile_response(200, r#"{"id":1}"#).unwrap(),
            json!({ "id": 1 })
        );
        assert_eq!(
            parse_profile_response(401, "").unwrap_err(),
            ProviderError::denied("profile endpoint returned 401")
        );
        assert!(matches!(
            parse_profile_response(500, "oops").unwrap_err(),
            ProviderError::Network { .. }
        ));
        assert!(matches!(
            parse_profile_response(200, "not json").unwrap_err(),
            ProviderError::MalformedResponse { .. }
        ));
    }

    #[test]
    fn test_excerpt_is_bounded() {
        let long = "x".repeat(1000);
        assert_eq!(excerpt(&long).len(), EXCERPT_LEN);
        assert_eq!(excerpt(" short "), "short");
    }
}
