//! Outcome of comparing a response against a test case.

use std::fmt;

use serde::Serialize;

/// Printable account of why a comparison failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Status codes differ; bodies were not inspected.
    Status {
        /// Expected status code.
        expected: u16,
        /// Status code the server returned.
        actual: u16,
    },
    /// Bodies are not semantically equal.
    Body {
        /// Expected JSON as written in the test case.
        expected: String,
        /// Raw body the server returned.
        actual: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { expected, actual } => {
                write!(f, "expected status {expected}, got {actual}")
            }
            Self::Body { expected, actual } => {
                write!(f, "expected body {expected}, got {actual}")
            }
        }
    }
}

/// Result of validating one response.
///
/// `body_match` is false whenever the body was not compared, which happens
/// exactly when the status already mismatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    /// Whether the status code matched.
    pub status_match: bool,
    /// Whether the body matched.
    pub body_match: bool,
    /// Expected versus actual, present on any mismatch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

impl ComparisonResult {
    /// Status and body both matched.
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            status_match: true,
            body_match: true,
            diagnostic: None,
        }
    }

    /// Status mismatched; the body was skipped.
    #[must_use]
    pub const fn status_mismatch(expected: u16, actual: u16) -> Self {
        Self {
            status_match: false,
            body_match: false,
            diagnostic: Some(Diagnostic::Status { expected, actual }),
        }
    }

    /// Status matched but the body did not.
    #[must_use]
    pub fn body_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            status_match: true,
            body_match: false,
            diagnostic: Some(Diagnostic::Body {
                expected: expected.into(),
                actual: actual.into(),
            }),
        }
    }

    /// Check if the case passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.status_match && self.body_match
    }
}
