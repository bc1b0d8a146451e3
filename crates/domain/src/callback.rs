//! Platform callback events.
//!
//! A callback event is what the host platform hands back after an external
//! authorization screen closes: the request code the screen was opened
//! with, a result code, and a string payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Outcome reported by the platform for an external screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCode {
    /// The screen completed normally.
    Ok,
    /// The user backed out.
    Canceled,
    /// Any other platform-specific code.
    Other(i32),
}

impl ResultCode {
    const RAW_OK: i32 = -1;
    const RAW_CANCELED: i32 = 0;

    /// Maps a raw platform result code.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            Self::RAW_OK => Self::Ok,
            Self::RAW_CANCELED => Self::Canceled,
            other => Self::Other(other),
        }
    }

    /// Returns the raw platform result code.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        match self {
            Self::Ok => Self::RAW_OK,
            Self::Canceled => Self::RAW_CANCELED,
            Self::Other(raw) => raw,
        }
    }
}

/// String key/value data attached to a callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackPayload(BTreeMap<String, String>);

impl CallbackPayload {
    /// Creates an empty payload.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builds a payload from key/value pairs. Later keys win.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns the value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns the value for a key if it is present and not blank.
    #[must_use]
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    /// Inserts a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns true if the payload holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// An inbound platform callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackEvent {
    /// Request code the external screen was opened with.
    pub request_code: i32,
    /// Platform outcome.
    pub result_code: ResultCode,
    /// Attached data.
    pub payload: CallbackPayload,
}

impl CallbackEvent {
    /// Creates a callback event.
    #[must_use]
    pub const fn new(request_code: i32, result_code: ResultCode, payload: CallbackPayload) -> Self {
        Self {
            request_code,
            result_code,
            payload,
        }
    }

    /// Creates a successful event with the given payload.
    #[must_use]
    pub const fn ok(request_code: i32, payload: CallbackPayload) -> Self {
        Self::new(request_code, ResultCode::Ok, payload)
    }

    /// Creates a canceled event with an empty payload.
    #[must_use]
    pub const fn canceled(request_code: i32) -> Self {
        Self::new(request_code, ResultCode::Canceled, CallbackPayload::new())
    }

    /// The OAuth `state` value carried by the payload.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.payload.get("state")
    }

    /// Turns an OAuth redirect URL into a callback event.
    ///
    /// Parameters are read from the query string and then the fragment
    /// (implicit flows), fragment values winning. The request code is the
    /// prefix of the `state` parameter, formatted `<request_code>.<nonce>`.
    /// An `error` parameter yields a canceled event when its value is
    /// `access_denied` and an [`ResultCode::Other`] event otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidCallback`] when `state` is missing or
    /// does not start with a numeric request code.
    pub fn from_redirect_url(url: &Url) -> DomainResult<Self> {
        let mut payload = CallbackPayload::from_pairs(url.query_pairs());
        if let Some(fragment) = url.fragment() {
            for (k, v) in url::form_urlencoded::parse(fragment.as_bytes()) {
                payload.insert(k, v);
            }
        }

        let state = payload
            .get("state")
            .ok_or_else(|| DomainError::InvalidCallback("missing state parameter".to_string()))?;
        let request_code = parse_request_code(state)?;

        let result_code = match payload.get("error") {
            None => ResultCode::Ok,
            Some("access_denied" | "user_cancelled_login" | "user_cancelled_authorize") => {
                ResultCode::Canceled
            }
            Some(_) => ResultCode::Other(1),
        };

        Ok(Self::new(request_code, result_code, payload))
    }
}

fn parse_request_code(state: &str) -> DomainResult<i32> {
    let (code, nonce) = state
        .split_once('.')
        .ok_or_else(|| DomainError::InvalidCallback(format!("malformed state '{state}'")))?;
    if nonce.is_empty() {
        return Err(DomainError::InvalidCallback(format!(
            "state '{state}' has no nonce"
        )));
    }
    code.parse()
        .map_err(|_| DomainError::InvalidCallback(format!("state '{state}' has no request code")))
}
