//! Authorization URL construction.

use unilogin_domain::ProviderConfig;
use url::Url;

use crate::pkce::CHALLENGE_METHOD;
use crate::providers::ProviderSpec;

/// Scopes requested for a config, in order and without duplicates.
///
/// Provider defaults come first unless disabled, then the email scope when
/// an email is required, then the config's own scopes.
#[must_use]
pub fn requested_scopes(spec: &ProviderSpec, config: &ProviderConfig) -> Vec<String> {
    let defaults = if config.disable_default_scopes {
        &[][..]
    } else {
        spec.default_scopes
    };
    let email = spec.email_scope.filter(|_| config.require_email);

    let mut candidates: Vec<&str> = defaults.to_vec();
    candidates.extend(email);
    candidates.extend(config.scopes.iter().map(String::as_str));

    let mut scopes: Vec<String> = Vec::new();
    for scope in candidates {
        let scope = scope.trim();
        if !scope.is_empty() && !scopes.iter().any(|s| s == scope) {
            scopes.push(scope.to_string());
        }
    }
    scopes
}

/// Builds the URL of the provider's authorization page.
///
/// # Errors
/// Returns a parse error if the catalog endpoint is not a valid URL.
pub fn authorization_url(
    spec: &ProviderSpec,
    config: &ProviderConfig,
    redirect_uri: Option<&str>,
    state: &str,
    code_challenge: Option<&str>,
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(spec.authorization_endpoint)?;
    let scopes = requested_scopes(spec, config);
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("response_type", "code")
            .append_pair("client_id", &config.client_id);
        if let Some(redirect_uri) = redirect_uri {
            query.append_pair("redirect_uri", redirect_uri);
        }
        if !scopes.is_empty() {
            query.append_pair("scope", &scopes.join(spec.scope_joiner));
        }
        query.append_pair("state", state);
        if let Some(challenge) = code_challenge {
            query
                .append_pair("code_challenge", challenge)
                .append_pair("code_challenge_method", CHALLENGE_METHOD);
        }
        for (key, value) in &config.extra_params {
            query.append_pair(key, value);
        }
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::providers::spec;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use unilogin_domain::ProviderType;

    fn params(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    #[test]
    fn test_scopes_defaults_email_and_custom_deduplicated() {
        let config = ProviderConfig::new("id")
            .require_email(true)
            .with_scopes(&["email", "https://www.googleapis.com/auth/drive.readonly"]);
        assert_eq!(
            requested_scopes(spec(ProviderType::Google), &config),
            vec![
                "openid",
                "profile",
                "email",
                "https://www.googleapis.com/auth/drive.readonly"
            ]
        );
    }

    #[test]
    fn test_scopes_without_defaults() {
        let mut config = ProviderConfig::new("id").with_scopes(&["repo"]);
        config.disable_default_scopes = true;
        assert_eq!(requested_scopes(spec(ProviderType::Github), &config), vec!["repo"]);
    }

    #[test]
    fn test_authorization_url_with_pkce() {
        let config = ProviderConfig::new("client-1").with_param("prompt", "consent");
        let url = authorization_url(
            spec(ProviderType::Google),
            &config,
            Some("https://app.example/cb"),
            "9001.abc",
            Some("challenge"),
        )
        .unwrap();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        let params = params(&url);
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["client_id"], "client-1");
        assert_eq!(params["redirect_uri"], "https://app.example/cb");
        assert_eq!(params["scope"], "openid profile");
        assert_eq!(params["state"], "9001.abc");
        assert_eq!(params["code_challenge"], "challenge");
        assert_eq!(params["code_challenge_method"], "S256");
        assert_eq!(params["prompt"], "consent");
    }

    #[test]
    fn test_comma_joined_scopes_and_no_redirect() {
        let config = ProviderConfig::new("fb").require_email(true);
        let url =
            authorization_url(spec(ProviderType::Facebook), &config, None, "64206.n", None).unwrap();

        let params = params(&url);
        assert_eq!(params["scope"], "public_profile,email");
        assert!(!params.contains_key("redirect_uri"));
        assert!(!params.contains_key("code_challenge"));
    }
}
