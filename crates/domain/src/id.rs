//! Login attempt identifiers.

use uuid::Uuid;

/// Generates a new login attempt id.
///
/// Attempt ids are UUID v7 strings, so they sort by creation time.
#[must_use]
pub fn generate_attempt_id() -> String {
    Uuid::now_v7().to_string()
}
