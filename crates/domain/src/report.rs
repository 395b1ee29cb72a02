//! Structured results of a test run.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::request::HttpMethod;
use crate::response::ComparisonResult;
use crate::testing::TestCase;

/// Exit code for a run where every case passed.
pub const EXIT_PASSED: u8 = 0;
/// Exit code for a run that finished with assertion mismatches.
pub const EXIT_SOFT_FAILURE: u8 = 1;
/// Exit code for a run aborted by an infrastructure fault.
pub const EXIT_HARD_FAILURE: u8 = 2;

/// Result of one executed test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseOutcome {
    /// 1-based position of the case within its suite.
    pub case: usize,
    /// HTTP method dispatched.
    pub method: HttpMethod,
    /// Path requested.
    pub path: String,
    /// Comparison of the response against the expectation.
    pub result: ComparisonResult,
    /// Round trip plus validation time.
    #[serde(rename = "duration_ms", with = "duration_millis")]
    pub duration: Duration,
}

impl CaseOutcome {
    /// Records the outcome of `test_case` at 1-based position `case`.
    #[must_use]
    pub fn new(
        case: usize,
        test_case: &TestCase,
        result: ComparisonResult,
        duration: Duration,
    ) -> Self {
        Self {
            case,
            method: test_case.method(),
            path: test_case.path().to_string(),
            result,
            duration,
        }
    }

    /// Check if the case passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.result.passed()
    }
}

/// Results of one suite, in case order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    /// Suite name.
    pub name: String,
    /// Outcomes in execution order.
    pub outcomes: Vec<CaseOutcome>,
    /// Wall time spent on the suite, reset included.
    #[serde(rename = "duration_ms", with = "duration_millis")]
    pub duration: Duration,
}

impl SuiteReport {
    /// Creates a suite report.
    #[must_use]
    pub fn new(name: impl Into<String>, outcomes: Vec<CaseOutcome>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            outcomes,
            duration,
        }
    }

    /// Number of passed cases.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    /// Number of failed cases.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    /// Check if all cases passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(CaseOutcome::passed)
    }

    /// Failed outcomes in execution order.
    pub fn failures(&self) -> impl Iterator<Item = &CaseOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }
}

/// Category of an infrastructure fault that aborted a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FatalKind {
    /// The server under test could not be reached.
    Transport,
    /// Starting, resetting or stopping the fixture failed.
    Fixture,
    /// The server returned a body that is not JSON.
    MalformedResponse,
    /// A test case carries expected JSON that does not parse.
    MalformedExpectation,
}

impl fmt::Display for FatalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Transport => "transport error",
            Self::Fixture => "fixture error",
            Self::MalformedResponse => "malformed response",
            Self::MalformedExpectation => "malformed expectation",
        })
    }
}

/// Printable record of the fault that aborted a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FatalError {
    /// Fault category.
    pub kind: FatalKind,
    /// Suite running when the fault happened, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,
    /// 1-based case position, if the fault happened inside a case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case: Option<usize>,
    /// Human readable cause.
    pub message: String,
}

/// Results of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Completed suites in execution order.
    pub suites: Vec<SuiteReport>,
    /// Fault that aborted the run, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatal: Option<FatalError>,
}

impl RunReport {
    /// Creates an empty report stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::now_v7(),
            started_at: Utc::now(),
            suites: Vec::new(),
            fatal: None,
        }
    }

    /// Appends a completed suite.
    pub fn push_suite(&mut self, suite: SuiteReport) {
        self.suites.push(suite);
    }

    /// Records the fault that aborted the run. The first fault wins.
    pub fn abort(&mut self, fatal: FatalError) {
        if self.fatal.is_none() {
            self.fatal = Some(fatal);
        }
    }

    /// Total number of executed cases.
    #[must_use]
    pub fn total_cases(&self) -> usize {
        self.suites.iter().map(|s| s.outcomes.len()).sum()
    }

    /// Number of failed cases across all suites.
    #[must_use]
    pub fn failed_cases(&self) -> usize {
        self.suites.iter().map(SuiteReport::failed).sum()
    }

    /// Check if the run completed with every case passing.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.fatal.is_none() && self.suites.iter().all(SuiteReport::all_passed)
    }

    /// Process exit code: 0 on full pass, 1 on soft failures, 2 on a hard failure.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        if self.fatal.is_some() {
            EXIT_HARD_FAILURE
        } else if self.all_passed() {
            EXIT_PASSED
        } else {
            EXIT_SOFT_FAILURE
        }
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation, clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn outcome(case: usize, result: ComparisonResult) -> CaseOutcome {
        let test_case = TestCase::any_json(HttpMethod::Get, "/ob/status", "", 200);
        CaseOutcome::new(case, &test_case, result, Duration::from_millis(3))
    }

    #[test]
    fn exit_code_is_zero_on_full_pass() {
        let mut report = RunReport::new();
        report.push_suite(SuiteReport::new(
            "status",
            vec![outcome(1, ComparisonResult::pass())],
            Duration::ZERO,
        ));
        assert!(report.all_passed());
        assert_eq!(report.exit_code(), EXIT_PASSED);
    }

    #[test]
    fn exit_code_reports_soft_failures() {
        let mut report = RunReport::new();
        report.push_suite(SuiteReport::new(
            "status",
            vec![
                outcome(1, ComparisonResult::pass()),
                outcome(2, ComparisonResult::status_mismatch(200, 500)),
            ],
            Duration::ZERO,
        ));
        assert_eq!(report.total_cases(), 2);
        assert_eq!(report.failed_cases(), 1);
        assert_eq!(report.exit_code(), EXIT_SOFT_FAILURE);
    }

    #[test]
    fn hard_failure_outranks_everything_and_first_fault_wins() {
        let mut report = RunReport::new();
        report.abort(FatalError {
            kind: FatalKind::Fixture,
            suite: Some("settings".to_string()),
            case: None,
            message: "reset failed".to_string(),
        });
        report.abort(FatalError {
            kind: FatalKind::Transport,
            suite: None,
            case: None,
            message: "later".to_string(),
        });
        assert_eq!(report.exit_code(), EXIT_HARD_FAILURE);
        assert_eq!(report.fatal.map(|f| f.kind), Some(FatalKind::Fixture));
    }

    #[test]
    fn empty_run_passes() {
        assert_eq!(RunReport::default().exit_code(), EXIT_PASSED);
    }

    #[test]
    fn serializes_durations_as_millis() {
        let json = serde_json::to_value(outcome(1, ComparisonResult::pass()))
            .unwrap_or(serde_json::Value::Null);
        assert_eq!(json["duration_ms"], 3);
        assert_eq!(json["method"], "GET");
        assert_eq!(json["case"], 1);
    }
}
