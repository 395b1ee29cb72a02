//! Blackbox Application - Validator, runner and ports
//!
//! This crate defines the engine core:
//! - Port traits for the request dispatcher and the fixture lifecycle
//! - The response validator
//! - The sequential suite runner and whole-run engine
//! - Run-level error handling

pub mod engine;
pub mod error;
pub mod ports;
pub mod registry;
pub mod runner;
pub mod validator;

pub use engine::Engine;
pub use error::{RunError, RunResult};
pub use ports::{Dispatcher, Fixture, FixtureError, FixtureHandle, TransportError};
pub use registry::{RegistryError, SuiteRegistry};
pub use runner::{SuiteRunner, SuiteState};
pub use validator::{ValidationError, validate};
