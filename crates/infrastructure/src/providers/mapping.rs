//! Profile extraction from provider JSON.

use serde_json::Value;
use unilogin_domain::{ProviderError, UserProfile};

use super::catalog::ProviderSpec;

/// Resolves a dotted path (`data.0.id`) to a non-empty scalar string.
///
/// Numeric segments index into arrays. Numbers and booleans are rendered
/// as strings; objects, arrays, nulls and blank strings yield `None`.
#[must_use]
pub fn lookup(value: &Value, path: &str) -> Option<String> {
    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            other => other.get(segment)?,
        };
    }
    match current {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn first_of(value: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| lookup(value, path))
}

/// Builds a [`UserProfile`] from a profile response.
///
/// `token_extras` is the token response (or the callback payload for
/// token-only flows); some providers only report the email there.
///
/// # Errors
/// Returns [`ProviderError::MissingIdentity`] when no user id is found.
pub fn extract_profile(
    spec: &ProviderSpec,
    profile_json: &Value,
    token_extras: &Value,
) -> Result<UserProfile, ProviderError> {
    let mapping = &spec.mapping;
    let user_id = first_of(profile_json, mapping.user_id).ok_or_else(|| {
        ProviderError::MissingIdentity {
            field: mapping.user_id.first().copied().unwrap_or("id").to_string(),
        }
    })?;

    let mut profile = UserProfile {
        user_id,
        display_name: first_of(profile_json, mapping.display_name),
        first_name: first_of(profile_json, mapping.first_name),
        email: first_of(profile_json, mapping.email),
        avatar_url: first_of(profile_json, mapping.avatar_url),
    };

    if profile.email.is_none() {
        profile.email = spec
            .token_email_field
            .and_then(|field| lookup(token_extras, field));
    }
    if let Some(adjust) = spec.adjust {
        adjust(profile_json, &mut profile);
    }
    Ok(profile)
}
