//! OAuth 2.0 authorization-code session, driven by the provider catalog.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};
use unilogin_application::{
    HostContext, IdentityClient, InFlightTask, LaunchRequest, ProfileRequest, ProviderSession,
    ResultChannel, SessionFactory, SessionPhase, TokenRequest,
};
use unilogin_domain::{
    CallbackEvent, LoginResult, ProviderConfig, ProviderError, ProviderType, ResultCode,
    UserProfile, generate_attempt_id,
};
use url::Url;

use super::authorize::authorization_url;
use crate::pkce::{generate_code_challenge, generate_code_verifier, generate_nonce};
use crate::providers::{ProviderSpec, TokenPlacement, extract_profile, spec};

/// The attempt between launch and callback.
#[derive(Debug)]
struct PendingAttempt {
    attempt_id: String,
    state: String,
    code_verifier: Option<String>,
}

enum Grant {
    /// The callback already delivered an access token (SDK or implicit flow).
    Token { access_token: String, extras: Value },
    /// An authorization code still to be exchanged.
    Code(TokenRequest),
}

/// Background resolution of one callback.
struct Exchange {
    spec: &'static ProviderSpec,
    client: Arc<dyn IdentityClient>,
    client_id: String,
    grant: Grant,
}

impl Exchange {
    async fn resolve(self) -> Result<UserProfile, ProviderError> {
        let (access_token, extras) = match self.grant {
            Grant::Token {
                access_token,
                extras,
            } => (access_token, extras),
            Grant::Code(request) => {
                let token = self.client.exchange_code(request).await?;
                if token.access_token.trim().is_empty() {
                    return Err(ProviderError::MissingToken);
                }
                (token.access_token, token.raw)
            }
        };

        let request = profile_request(self.spec, &self.client_id, &access_token)?;
        let profile = self.client.fetch_profile(request).await?;
        extract_profile(self.spec, &profile, &extras)
    }
}

/// Builds the profile request a provider expects.
///
/// # Errors
/// Returns [`ProviderError::MalformedResponse`] if the catalog endpoint
/// does not parse.
pub fn profile_request(
    spec: &ProviderSpec,
    client_id: &str,
    access_token: &str,
) -> Result<ProfileRequest, ProviderError> {
    let mut url = Url::parse(spec.profile_endpoint)
        .map_err(|e| ProviderError::malformed(format!("profile endpoint: {e}")))?;
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in spec.profile_params {
            query.append_pair(key, value);
        }
        if let Some(param) = spec.client_id_param {
            query.append_pair(param, client_id);
        }
        if let TokenPlacement::Query(param) = spec.token_placement {
            query.append_pair(param, access_token);
        }
    }
    // Drop the dangling `?` when nothing was appended.
    if url.query() == Some("") {
        url.set_query(None);
    }

    let headers = spec
        .client_id_header
        .map(|header| vec![(header.to_string(), client_id.to_string())])
        .unwrap_or_default();
    let bearer = (spec.token_placement == TokenPlacement::Bearer).then(|| access_token.to_string());

    Ok(ProfileRequest {
        url,
        headers,
        bearer,
    })
}

/// A login session for one provider, bound to one host.
///
/// `start` opens the authorization page through the host's launcher. The
/// callback carrying the session's request code resolves the attempt on a
/// background task: code exchange (when needed), then the profile fetch.
pub struct OAuthSession {
    spec: &'static ProviderSpec,
    config: ProviderConfig,
    host: HostContext,
    client: Arc<dyn IdentityClient>,
    channel: ResultChannel,
    pending: Option<PendingAttempt>,
    task: InFlightTask,
}

impl OAuthSession {
    /// Creates an idle session.
    #[must_use]
    pub fn new(
        provider: ProviderType,
        config: ProviderConfig,
        host: HostContext,
        client: Arc<dyn IdentityClient>,
    ) -> Self {
        Self {
            spec: spec(provider),
            config,
            host,
            client,
            channel: ResultChannel::new(provider),
            pending: None,
            task: InFlightTask::new(),
        }
    }

    fn emit_failure(&self, attempt_id: String, error: ProviderError) {
        debug!(provider = %self.spec.provider, %attempt_id, %error, "login attempt failed");
        self.channel
            .emit(LoginResult::failed(self.spec.provider, error).with_attempt_id(attempt_id));
    }

    fn grant_for(&self, event: &CallbackEvent, attempt: PendingAttempt) -> Result<Grant, ProviderError> {
        let payload = &event.payload;
        if let Some(access_token) = payload.non_empty("access_token") {
            return Ok(Grant::Token {
                access_token: access_token.to_string(),
                extras: serde_json::to_value(payload).unwrap_or_default(),
            });
        }

        let code = payload.non_empty("code").ok_or(ProviderError::MissingToken)?;
        let token_url = Url::parse(self.spec.token_endpoint)
            .map_err(|e| ProviderError::malformed(format!("token endpoint: {e}")))?;
        Ok(Grant::Code(TokenRequest {
            token_url,
            client_id: self.config.client_id.clone(),
            client_secret: self.config.client_secret.clone(),
            code: code.to_string(),
            redirect_uri: self.config.redirect_uri.clone(),
            code_verifier: attempt.code_verifier,
            auth_method: self.spec.auth_method,
        }))
    }
}

/// Maps a non-`Ok` or error-bearing callback to its failure.
fn callback_failure(event: &CallbackEvent) -> Option<ProviderError> {
    let payload = &event.payload;
    let description = payload.non_empty("error_description").map(str::to_string);
    match event.result_code {
        ResultCode::Canceled => Some(ProviderError::Canceled {
            reason: description,
        }),
        ResultCode::Other(code) => Some(ProviderError::denied(
            description
                .or_else(|| payload.non_empty("error").map(str::to_string))
                .unwrap_or_else(|| format!("platform result code {code}")),
        )),
        ResultCode::Ok => payload.non_empty("error").map(|error| {
            ProviderError::denied(description.unwrap_or_else(|| error.to_string()))
        }),
    }
}

impl ProviderSession for OAuthSession {
    fn provider(&self) -> ProviderType {
        self.spec.provider
    }

    fn channel(&self) -> &ResultChannel {
        &self.channel
    }

    fn phase(&self) -> SessionPhase {
        if self.pending.is_some() {
            SessionPhase::AwaitingCallback
        } else if self.task.is_running() {
            SessionPhase::Exchanging
        } else {
            SessionPhase::Idle
        }
    }

    fn start(&mut self) {
        let provider = self.spec.provider;
        if self.phase().is_in_flight() {
            info!(%provider, "restarting login; previous attempt abandoned");
        }
        self.dispose();

        let attempt_id = generate_attempt_id();
        if !self.host.is_alive() {
            self.emit_failure(
                attempt_id,
                ProviderError::LaunchFailed {
                    message: format!("host '{}' is gone", self.host.label()),
                },
            );
            return;
        }

        let state = format!("{}.{}", provider.request_code(), generate_nonce());
        let code_verifier = self.spec.pkce.then(generate_code_verifier);
        let challenge = code_verifier.as_deref().map(generate_code_challenge);
        let url = match authorization_url(
            self.spec,
            &self.config,
            self.config.redirect_uri.as_deref(),
            &state,
            challenge.as_deref(),
        ) {
            Ok(url) => url,
            Err(e) => {
                self.emit_failure(attempt_id, ProviderError::LaunchFailed {
                    message: format!("authorization endpoint: {e}"),
                });
                return;
            }
        };

        let request = LaunchRequest {
            provider,
            request_code: provider.request_code(),
            url,
        };
        match self.host.launcher().launch(&request) {
            Ok(()) => {
                info!(%provider, %attempt_id, host = self.host.label(), "authorization page launched");
                self.pending = Some(PendingAttempt {
                    attempt_id,
                    state,
                    code_verifier,
                });
            }
            Err(e) => {
                warn!(%provider, error = %e, "could not launch authorization page");
                self.emit_failure(attempt_id, ProviderError::LaunchFailed {
                    message: e.to_string(),
                });
            }
        }
    }

    fn handle_callback(&mut self, event: &CallbackEvent) -> bool {
        let provider = self.spec.provider;
        if event.request_code != provider.request_code() {
            return false;
        }
        let Some(attempt) = self.pending.take() else {
            debug!(%provider, "callback without a pending attempt; ignored");
            return true;
        };

        if let Some(error) = callback_failure(event) {
            self.emit_failure(attempt.attempt_id, error);
            return true;
        }
        // SDK flows hand back no state; redirect flows must echo ours.
        if let Some(state) = event.state()
            && state != attempt.state
        {
            self.emit_failure(
                attempt.attempt_id,
                ProviderError::malformed("state does not match the pending attempt"),
            );
            return true;
        }

        let attempt_id = attempt.attempt_id.clone();
        let grant = match self.grant_for(event, attempt) {
            Ok(grant) => grant,
            Err(error) => {
                self.emit_failure(attempt_id, error);
                return true;
            }
        };

        let Ok(runtime) = Handle::try_current() else {
            self.emit_failure(
                attempt_id,
                ProviderError::network("no async runtime to resolve the login on"),
            );
            return true;
        };

        let exchange = Exchange {
            spec: self.spec,
            client: Arc::clone(&self.client),
            client_id: self.config.client_id.clone(),
            grant,
        };
        let channel = self.channel.clone();
        debug!(%provider, %attempt_id, "resolving callback");
        self.task.track(runtime.spawn(async move {
            let result = match exchange.resolve().await {
                Ok(profile) => LoginResult::succeeded(provider, profile),
                Err(error) => LoginResult::failed(provider, error),
            };
            channel.emit(result.with_attempt_id(attempt_id));
        }));
        true
    }

    fn dispose(&mut self) {
        if self.task.cancel() {
            debug!(provider = %self.spec.provider, "in-flight exchange aborted");
        }
        self.pending = None;
    }

    fn logout(&mut self, clear_token: bool) {
        self.dispose();
        debug!(provider = %self.spec.provider, clear_token, "session state cleared");
    }
}

impl fmt::Debug for OAuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthSession")
            .field("provider", &self.spec.provider)
            .field("host", &self.host.label())
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

/// Builds [`OAuthSession`]s sharing one identity client.
#[derive(Clone)]
pub struct OAuthSessionFactory {
    client: Arc<dyn IdentityClient>,
}

impl OAuthSessionFactory {
    /// Creates a factory.
    #[must_use]
    pub fn new(client: Arc<dyn IdentityClient>) -> Self {
        Self { client }
    }
}

impl SessionFactory for OAuthSessionFactory {
    fn create(
        &self,
        provider: ProviderType,
        config: &ProviderConfig,
        host: &HostContext,
    ) -> Box<dyn ProviderSession> {
        Box::new(OAuthSession::new(
            provider,
            config.clone(),
            host.clone(),
            Arc::clone(&self.client),
        ))
    }
}

impl fmt::Debug for OAuthSessionFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthSessionFactory").finish_non_exhaustive()
    }
}
