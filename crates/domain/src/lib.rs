//! Blackbox Domain - Test definitions and results
//!
//! This crate defines the declarative model of the Blackbox HTTP test engine:
//! test cases and suites, captured responses, comparison results and run
//! reports. All types here are pure Rust with no I/O dependencies.

pub mod credential;
pub mod error;
pub mod payload;
pub mod report;
pub mod request;
pub mod response;
pub mod testing;

pub use credential::{Credential, SessionCookie};
pub use error::{DomainError, DomainResult};
pub use report::{CaseOutcome, FatalError, FatalKind, RunReport, SuiteReport};
pub use request::HttpMethod;
pub use response::{ActualResponse, ComparisonResult, Diagnostic};
pub use testing::{ExpectedBody, TestCase, TestSuite};
