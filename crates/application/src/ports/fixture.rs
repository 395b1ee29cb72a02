//! Fixture lifecycle port

use async_trait::async_trait;
use thiserror::Error;

use blackbox_domain::Credential;

/// Errors raised while managing the server under test.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The server could not be started.
    #[error("failed to start server: {0}")]
    Start(String),

    /// The server did not accept connections in time.
    #[error("server at {address} not ready after {waited_ms}ms")]
    NotReady {
        /// Address that was polled.
        address: String,
        /// Time spent waiting.
        waited_ms: u64,
    },

    /// Backing state could not be restored to its baseline.
    #[error("failed to reset server state: {0}")]
    Reset(String),

    /// The server could not be shut down.
    #[error("failed to stop server: {0}")]
    Stop(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a started fixture hands to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureHandle {
    /// Scheme, host and port of the server, e.g. `http://127.0.0.1:9191`.
    pub base_url: String,
    /// Credential to attach to every request.
    pub credential: Credential,
}

impl FixtureHandle {
    /// Creates a handle.
    #[must_use]
    pub fn new(base_url: impl Into<String>, credential: Credential) -> Self {
        Self {
            base_url: base_url.into(),
            credential,
        }
    }
}

/// Lifecycle of the server under test and its backing state store.
#[async_trait]
pub trait Fixture: Send {
    /// Brings the server up and returns where and how to reach it.
    ///
    /// # Errors
    /// Returns an error if the server cannot be started or never becomes reachable.
    async fn start(&mut self) -> Result<FixtureHandle, FixtureError>;

    /// Restores all state reachable through the server to an empty baseline.
    ///
    /// # Errors
    /// Returns an error if the state cannot be reset.
    async fn reset(&mut self) -> Result<(), FixtureError>;

    /// Shuts the server down.
    ///
    /// # Errors
    /// Returns an error if shutdown fails.
    async fn stop(&mut self) -> Result<(), FixtureError>;
}
