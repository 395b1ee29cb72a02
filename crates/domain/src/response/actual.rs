//! Raw response captured from the server under test.

use std::borrow::Cow;

/// Status and body of one HTTP response.
///
/// The body is kept as bytes; JSON parsing happens on demand so that a
/// status mismatch never touches the body at all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActualResponse {
    status: u16,
    raw_body: Vec<u8>,
}

impl ActualResponse {
    /// Creates a response from a status code and the raw body bytes.
    #[must_use]
    pub fn new(status: u16, raw_body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            raw_body: raw_body.into(),
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Body bytes exactly as received.
    #[must_use]
    pub fn raw_body(&self) -> &[u8] {
        &self.raw_body
    }

    /// Body as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw_body)
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the parser error when the body is not well-formed JSON.
    pub fn parsed_body(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.raw_body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_json_body() {
        let response = ActualResponse::new(200, br#"{"a":[1,2]}"#.to_vec());
        assert_eq!(response.parsed_body().ok(), Some(json!({"a": [1, 2]})));
    }

    #[test]
    fn empty_body_is_not_json() {
        let response = ActualResponse::new(204, Vec::new());
        assert!(response.parsed_body().is_err());
        assert_eq!(response.body_text(), "");
    }

    #[test]
    fn lossy_text_survives_binary_bodies() {
        let response = ActualResponse::new(500, vec![0xff, b'o', b'k']);
        assert_eq!(response.body_text(), "\u{fffd}ok");
    }
}
