//! Fixture for a server the engine does not own.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use blackbox_application::{Fixture, FixtureError, FixtureHandle};
use blackbox_domain::Credential;

use super::{ResetHook, socket_address, wait_until_listening};

/// A server already running at a known address.
///
/// `start` only checks that the address accepts connections and `stop`
/// leaves the server running.
#[derive(Debug, Clone)]
pub struct ExternalFixture {
    base_url: String,
    credential: Credential,
    reset: ResetHook,
    ready_timeout: Duration,
}

impl ExternalFixture {
    /// Creates a fixture for the server at `base_url` whose state is
    /// restored by `reset`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, credential: Credential, reset: ResetHook) -> Self {
        Self {
            base_url: base_url.into(),
            credential,
            reset,
            ready_timeout: Duration::from_secs(5),
        }
    }

    /// Sets how long `start` waits for the server (builder pattern).
    #[must_use]
    pub const fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }
}

#[async_trait]
impl Fixture for ExternalFixture {
    async fn start(&mut self) -> Result<FixtureHandle, FixtureError> {
        let address = socket_address(&self.base_url)?;
        wait_until_listening(&address, self.ready_timeout, || Ok(())).await?;
        info!(%address, "using running server");
        Ok(FixtureHandle::new(&self.base_url, self.credential.clone()))
    }

    async fn reset(&mut self) -> Result<(), FixtureError> {
        self.reset.run().await
    }

    async fn stop(&mut self) -> Result<(), FixtureError> {
        Ok(())
    }
}
