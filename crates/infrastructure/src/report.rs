//! Rendering of run reports.
//!
//! The text form keeps infrastructure faults visibly apart from assertion
//! failures: a fault is printed as `infrastructure could not proceed: ...`
//! while a mismatch reads `suite <name> case <n> failed: expected ..., got ...`.

use std::fmt::Write as _;

use serde_json::ser::{PrettyFormatter, Serializer};
use thiserror::Error;

use blackbox_domain::{FatalError, RunReport, SuiteReport};

/// Output format for a run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Human readable summary.
    #[default]
    Text,
    /// Pretty-printed JSON document.
    Json,
}

/// Error type for report rendering.
#[derive(Debug, Error)]
pub enum ReportError {
    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// UTF-8 encoding error.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Renders `report` in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(report: &RunReport, format: ReportFormat) -> Result<String, ReportError> {
    match format {
        ReportFormat::Text => Ok(render_text(report)),
        ReportFormat::Json => render_json(report),
    }
}

/// Renders a human readable summary ending in a newline.
#[must_use]
pub fn render_text(report: &RunReport) -> String {
    let mut out = String::new();
    for suite in &report.suites {
        write_suite(&mut out, suite);
    }
    if let Some(fatal) = &report.fatal {
        let _ = writeln!(out, "infrastructure could not proceed: {}", describe_fatal(fatal));
    }

    let verdict = if report.fatal.is_some() {
        "ABORTED"
    } else if report.all_passed() {
        "PASSED"
    } else {
        "FAILED"
    };
    let _ = writeln!(
        out,
        "{verdict}: {} suites, {} cases, {} failed (run {})",
        report.suites.len(),
        report.total_cases(),
        report.failed_cases(),
        report.run_id
    );
    out
}

/// Renders the report as 2-space indented JSON with a trailing newline.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(report: &RunReport) -> Result<String, ReportError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    serde::Serialize::serialize(report, &mut serializer)?;

    let mut json = String::from_utf8(buffer)?;
    json.push('\n');
    Ok(json)
}

fn write_suite(out: &mut String, suite: &SuiteReport) {
    let _ = writeln!(
        out,
        "suite {}: {} passed, {} failed ({} ms)",
        suite.name,
        suite.passed(),
        suite.failed(),
        suite.duration.as_millis()
    );
    for outcome in suite.failures() {
        let detail = outcome
            .result
            .diagnostic
            .as_ref()
            .map_or_else(|| "mismatch".to_string(), ToString::to_string);
        let _ = writeln!(
            out,
            "  suite {} case {} failed: {} {}: {detail}",
            suite.name, outcome.case, outcome.method, outcome.path
        );
    }
}

fn describe_fatal(fatal: &FatalError) -> String {
    match (&fatal.suite, fatal.case) {
        (Some(suite), Some(case)) => {
            format!("{} in suite {suite} case {case}: {}", fatal.kind, fatal.message)
        }
        (Some(suite), None) => format!("{} in suite {suite}: {}", fatal.kind, fatal.message),
        _ => format!("{}: {}", fatal.kind, fatal.message),
    }
}
