//! Suite files.
//!
//! Suites are declared in YAML or JSON. Reusable JSON fragments live under
//! `payloads` and are referenced from a case as `@name`:
//!
//! ```yaml
//! payloads:
//!   settings: '{"paymentDataInQR": true}'
//! suites:
//!   - name: settings
//!     cases:
//!       - { method: POST, path: /ob/settings, body: "@settings", status: 200, expect: "{}" }
//!       - { method: GET, path: /ob/settings, status: 200, expect: "@settings" }
//! ```

mod file;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use blackbox_application::{RegistryError, SuiteRegistry};
use blackbox_domain::{ExpectedBody, HttpMethod, TestCase, TestSuite};

use file::{CaseFile, SuiteFile, SuitesFile};

const REFERENCE_PREFIX: char = '@';

/// Errors raised while loading suites.
#[derive(Debug, Error)]
pub enum SuiteFileError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The extension does not name a supported format.
    #[error("unsupported suite file extension: {0}")]
    UnsupportedFormat(PathBuf),

    /// YAML syntax or shape error.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON syntax or shape error.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A case could not be turned into a test case.
    #[error("suite '{suite}' case {case}: {message}")]
    InvalidCase {
        /// Suite name.
        suite: String,
        /// 1-based case number.
        case: usize,
        /// What is wrong.
        message: String,
    },

    /// Two suites share a name.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Serialization format of a suite file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteFormat {
    /// `.yaml` or `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl SuiteFormat {
    /// Picks the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Reads and converts a suite file.
///
/// # Errors
///
/// Returns [`SuiteFileError`] if the file cannot be read, parsed or converted.
pub async fn load_suites(path: &Path) -> Result<SuiteRegistry, SuiteFileError> {
    let format = SuiteFormat::from_path(path)
        .ok_or_else(|| SuiteFileError::UnsupportedFormat(path.to_path_buf()))?;
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SuiteFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_suites(&text, format)
}

/// Converts suite file text into a registry.
///
/// # Errors
///
/// Returns [`SuiteFileError`] on syntax errors, unknown methods, unknown
/// payload references, conflicting expectations or duplicate suite names.
pub fn parse_suites(text: &str, format: SuiteFormat) -> Result<SuiteRegistry, SuiteFileError> {
    let file: SuitesFile = match format {
        SuiteFormat::Yaml => serde_yaml::from_str(text)?,
        SuiteFormat::Json => serde_json::from_str(text)?,
    };

    let mut registry = SuiteRegistry::new();
    for suite in file.suites {
        registry.register(convert_suite(suite, &file.payloads)?)?;
    }
    Ok(registry)
}

fn convert_suite(
    suite: SuiteFile,
    payloads: &BTreeMap<String, String>,
) -> Result<TestSuite, SuiteFileError> {
    let cases = suite
        .cases
        .into_iter()
        .enumerate()
        .map(|(index, case)| {
            convert_case(case, payloads).map_err(|message| SuiteFileError::InvalidCase {
                suite: suite.name.clone(),
                case: index + 1,
                message,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TestSuite::new(suite.name, cases))
}

fn convert_case(case: CaseFile, payloads: &BTreeMap<String, String>) -> Result<TestCase, String> {
    let method: HttpMethod = case.method.parse().map_err(|e| format!("{e}"))?;
    let body = resolve(case.body, payloads)?;
    let expected = match (case.expect, case.any_json) {
        (Some(_), true) => {
            return Err("set either `expect` or `any_json`, not both".to_string());
        }
        (Some(json), false) => ExpectedBody::Exact(resolve(json, payloads)?),
        (None, true) => ExpectedBody::AnyValid,
        (None, false) => return Err("missing `expect` or `any_json`".to_string()),
    };
    Ok(TestCase::new(method, case.path, body, case.status, expected))
}

fn resolve(text: String, payloads: &BTreeMap<String, String>) -> Result<String, String> {
    match text.strip_prefix(REFERENCE_PREFIX) {
        Some(name) => payloads
            .get(name)
            .cloned()
            .ok_or_else(|| format!("unknown payload '{name}'")),
        None => Ok(text),
    }
}
