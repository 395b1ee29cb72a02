//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the engine and the server under test.
//! Each port is a trait implemented by adapters in the infrastructure layer.

mod dispatcher;
mod fixture;

pub use dispatcher::{Dispatcher, TransportError};
pub use fixture::{Fixture, FixtureError, FixtureHandle};
