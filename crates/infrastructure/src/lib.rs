//! Blackbox Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports defined in the
//! application layer, plus configuration, suite file loading and report
//! rendering.

pub mod adapters;
pub mod config;
pub mod fixture;
pub mod report;
pub mod suites;

pub use adapters::{DEFAULT_TIMEOUT, ReqwestDispatcher};
pub use self::config::{ConfigError, EngineConfig, FixtureConfig};
pub use fixture::{ConfiguredFixture, ExternalFixture, HookCommand, ProcessFixture, ResetHook};
pub use report::{ReportError, ReportFormat, render, render_json, render_text};
pub use suites::{SuiteFileError, SuiteFormat, load_suites, parse_suites};
