//! Run-level error types

use thiserror::Error;

use blackbox_domain::{FatalError, FatalKind};

use crate::ports::{FixtureError, TransportError};
use crate::validator::ValidationError;

/// Hard failures: any of these aborts the whole run.
///
/// Assertion mismatches are not errors; they are recorded in the report.
#[derive(Debug, Error)]
pub enum RunError {
    /// The fixture could not be started.
    #[error("{0}")]
    Start(#[source] FixtureError),

    /// The dispatcher could not be built from the fixture handle.
    #[error("dispatcher setup failed: {0}")]
    Setup(#[source] TransportError),

    /// State could not be reset before a suite.
    #[error("suite '{suite}': {source}")]
    Reset {
        /// Suite about to run.
        suite: String,
        /// Underlying fixture error.
        #[source]
        source: FixtureError,
    },

    /// The server could not be reached while running a case.
    #[error("suite '{suite}' case {case}: {source}")]
    Transport {
        /// Suite being run.
        suite: String,
        /// 1-based case position.
        case: usize,
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },

    /// A body could not be parsed, so the case cannot be compared.
    #[error("suite '{suite}' case {case}: {source}")]
    Validation {
        /// Suite being run.
        suite: String,
        /// 1-based case position.
        case: usize,
        /// Underlying validation error.
        #[source]
        source: ValidationError,
    },

    /// The fixture could not be stopped at the end of the run.
    #[error("{0}")]
    Stop(#[source] FixtureError),
}

impl RunError {
    /// Category of this failure.
    #[must_use]
    pub const fn kind(&self) -> FatalKind {
        match self {
            Self::Start(_) | Self::Reset { .. } | Self::Stop(_) => FatalKind::Fixture,
            Self::Setup(_) | Self::Transport { .. } => FatalKind::Transport,
            Self::Validation {
                source: ValidationError::MalformedResponse { .. },
                ..
            } => FatalKind::MalformedResponse,
            Self::Validation {
                source: ValidationError::MalformedExpectation { .. },
                ..
            } => FatalKind::MalformedExpectation,
        }
    }

    /// Converts this error into its report form.
    #[must_use]
    pub fn to_fatal(&self) -> FatalError {
        let (suite, case, message) = match self {
            Self::Start(e) | Self::Stop(e) => (None, None, e.to_string()),
            Self::Setup(e) => (None, None, e.to_string()),
            Self::Reset { suite, source } => (Some(suite.clone()), None, source.to_string()),
            Self::Transport {
                suite,
                case,
                source,
            } => (Some(suite.clone()), Some(*case), source.to_string()),
            Self::Validation {
                suite,
                case,
                source,
            } => (Some(suite.clone()), Some(*case), source.to_string()),
        };

        FatalError {
            kind: self.kind(),
            suite,
            case,
            message,
        }
    }
}

/// Result type alias for run operations.
pub type RunResult<T> = Result<T, RunError>;
