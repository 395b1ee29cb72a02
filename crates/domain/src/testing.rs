//! Test case model.
//!
//! A [`TestCase`] pairs one request with the response it must produce, and a
//! [`TestSuite`] is an ordered run of cases against a freshly reset server.
//! Cases inside a suite are not isolated from each other: a later case may
//! rely on state written by an earlier one, so order is part of the meaning
//! of a suite and nothing in the engine reorders or deduplicates cases.

use serde::Serialize;

use crate::request::HttpMethod;

/// The body a test case expects back from the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedBody {
    /// Raw JSON text that must be semantically equal to the response.
    ///
    /// The text is kept as written and parsed only when a response is
    /// validated against it.
    Exact(String),
    /// Any syntactically valid JSON response is accepted.
    AnyValid,
}

impl ExpectedBody {
    /// Creates an exact expectation from raw JSON text.
    #[must_use]
    pub fn exact(json: impl Into<String>) -> Self {
        Self::Exact(json.into())
    }

    /// Returns a printable form of the expectation.
    #[must_use]
    pub fn describe(&self) -> &str {
        match self {
            Self::Exact(json) => json,
            Self::AnyValid => "<any valid JSON>",
        }
    }
}

/// One request and the response it must produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase {
    method: HttpMethod,
    path: String,
    request_body: String,
    expected_status: u16,
    expected_body: ExpectedBody,
}

impl TestCase {
    /// Creates a test case.
    ///
    /// `path` is appended verbatim to the server's base URL. `request_body`
    /// is sent as-is and may be deliberately malformed.
    #[must_use]
    pub fn new(
        method: HttpMethod,
        path: impl Into<String>,
        request_body: impl Into<String>,
        expected_status: u16,
        expected_body: ExpectedBody,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            request_body: request_body.into(),
            expected_status,
            expected_body,
        }
    }

    /// Creates a test case expecting an exact JSON body.
    #[must_use]
    pub fn exact(
        method: HttpMethod,
        path: impl Into<String>,
        request_body: impl Into<String>,
        expected_status: u16,
        expected_json: impl Into<String>,
    ) -> Self {
        Self::new(
            method,
            path,
            request_body,
            expected_status,
            ExpectedBody::exact(expected_json),
        )
    }

    /// Creates a test case accepting any valid JSON body.
    #[must_use]
    pub fn any_json(
        method: HttpMethod,
        path: impl Into<String>,
        request_body: impl Into<String>,
        expected_status: u16,
    ) -> Self {
        Self::new(
            method,
            path,
            request_body,
            expected_status,
            ExpectedBody::AnyValid,
        )
    }

    /// HTTP method to dispatch.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// URL path, without scheme or host.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw request body.
    #[must_use]
    pub fn request_body(&self) -> &str {
        &self.request_body
    }

    /// Expected HTTP status code.
    #[must_use]
    pub const fn expected_status(&self) -> u16 {
        self.expected_status
    }

    /// Expected response body.
    #[must_use]
    pub const fn expected_body(&self) -> &ExpectedBody {
        &self.expected_body
    }
}

/// A named, ordered sequence of test cases sharing one reset baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestSuite {
    name: String,
    cases: Vec<TestCase>,
}

impl TestSuite {
    /// Creates a suite from cases in execution order.
    #[must_use]
    pub fn new(name: impl Into<String>, cases: Vec<TestCase>) -> Self {
        Self {
            name: name.into(),
            cases,
        }
    }

    /// Appends a case to the end of the suite (builder pattern).
    #[must_use]
    pub fn with_case(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }

    /// Suite name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cases in execution order.
    #[must_use]
    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Check if the suite is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Get the number of cases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }
}
