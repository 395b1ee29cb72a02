//! Error payloads returned by the gateway.
//!
//! The gateway reports failures as `{"success": false, "reason": "..."}`.
//! These builders produce those bodies so suites can assert on them with
//! exact JSON equality.

use serde_json::json;

/// Error body carrying an arbitrary reason.
#[must_use]
pub fn error_payload(reason: impl AsRef<str>) -> String {
    json!({ "success": false, "reason": reason.as_ref() }).to_string()
}

/// Body returned when `resource` does not exist.
#[must_use]
pub fn not_found(resource: &str) -> String {
    error_payload(format!("{resource} not found."))
}

/// Body returned when creating `resource` that already exists.
#[must_use]
pub fn already_exists_use_put(resource: &str) -> String {
    error_payload(format!("{resource} already exists. Use PUT."))
}
