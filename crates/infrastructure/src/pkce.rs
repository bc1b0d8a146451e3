//! PKCE (RFC 7636) verifier and challenge helpers, plus state nonces.

use base64::engine::{Engine, general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

/// Length of generated code verifiers.
pub const CODE_VERIFIER_LENGTH: usize = 64;

/// Length of generated state nonces.
pub const NONCE_LENGTH: usize = 24;

/// The only challenge method we send.
pub const CHALLENGE_METHOD: &str = "S256";

fn random_alphanumeric(length: usize) -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Generates a fresh code verifier.
#[must_use]
pub fn generate_code_verifier() -> String {
    random_alphanumeric(CODE_VERIFIER_LENGTH)
}

/// Derives the S256 code challenge of a verifier.
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Generates the random half of an OAuth `state` value.
#[must_use]
pub fn generate_nonce() -> String {
    random_alphanumeric(NONCE_LENGTH)
}
