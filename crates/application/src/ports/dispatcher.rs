//! Request dispatcher port

use async_trait::async_trait;
use thiserror::Error;

use blackbox_domain::{ActualResponse, HttpMethod};

/// Failure to obtain any response from the server under test.
///
/// This is distinct from a non-2xx response, which is an ordinary outcome
/// compared against the test case. A transport error means the server is
/// unreachable and always aborts the run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout that elapsed.
        timeout_ms: u64,
    },

    /// Nothing is listening at the server address.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The connection could not be established or was dropped.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The base URL and path do not form a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Any other client-side failure.
    #[error("{0}")]
    Other(String),
}

/// Port for sending one request to the server under test.
///
/// Implementations own the base address and credential of the fixture; the
/// caller only names the method, the path and the raw body. Implementations
/// must not retry and must not validate the body.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Sends a request and returns the status and raw body.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response was received.
    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: &str,
    ) -> Result<ActualResponse, TransportError>;
}
