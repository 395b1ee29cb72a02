//! Response validation.
//!
//! Compares a captured response against a test case: exact status first,
//! then semantic JSON equality of the bodies. Object key order does not
//! matter; array element order does. Numbers compare by value, so `5`,
//! `5.0` and `5e0` are equal. Suites that hit endpoints returning
//! unordered collections use [`ExpectedBody::AnyValid`] for those cases
//! instead of relying on the validator to ignore order.

use serde_json::Value;
use thiserror::Error;

use blackbox_domain::{ActualResponse, ComparisonResult, ExpectedBody, TestCase};

/// Conditions under which no comparison is possible.
///
/// Unlike a mismatch, these abort the run.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The server returned a body that is not JSON.
    #[error("response body is not valid JSON ({source}): {body}")]
    MalformedResponse {
        /// Raw body as text.
        body: String,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The test case's expected body is not JSON.
    #[error("expected body is not valid JSON ({source}): {expected}")]
    MalformedExpectation {
        /// Expected body as written.
        expected: String,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },
}

/// Validates `actual` against the expectations of `case`.
///
/// # Errors
///
/// Returns [`ValidationError`] when the status matched but either body could
/// not be parsed. A status mismatch is reported as a failed
/// [`ComparisonResult`] without parsing either body.
pub fn validate(
    actual: &ActualResponse,
    case: &TestCase,
) -> Result<ComparisonResult, ValidationError> {
    if actual.status() != case.expected_status() {
        return Ok(ComparisonResult::status_mismatch(
            case.expected_status(),
            actual.status(),
        ));
    }

    let actual_json =
        actual
            .parsed_body()
            .map_err(|source| ValidationError::MalformedResponse {
                body: actual.body_text().into_owned(),
                source,
            })?;

    let expected = match case.expected_body() {
        ExpectedBody::AnyValid => return Ok(ComparisonResult::pass()),
        ExpectedBody::Exact(expected) => expected,
    };

    let expected_json: Value =
        serde_json::from_str(expected).map_err(|source| {
            ValidationError::MalformedExpectation {
                expected: expected.clone(),
                source,
            }
        })?;

    if json_eq(&actual_json, &expected_json) {
        Ok(ComparisonResult::pass())
    } else {
        Ok(ComparisonResult::body_mismatch(
            case.expected_body().describe(),
            actual.body_text(),
        ))
    }
}

/// Structural equality with numbers compared as `f64`.
#[allow(clippy::float_cmp)]
fn json_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l.as_f64() == r.as_f64(),
        (Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(l, r)| json_eq(l, r))
        }
        (Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l.iter()
                    .all(|(key, l)| r.get(key).is_some_and(|r| json_eq(l, r)))
        }
        _ => left == right,
    }
}
