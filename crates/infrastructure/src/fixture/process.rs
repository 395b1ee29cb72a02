//! Fixture that launches the server under test as a child process.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tracing::{info, warn};

use blackbox_application::{Fixture, FixtureError, FixtureHandle};
use blackbox_domain::Credential;

use super::{HookCommand, ResetHook, socket_address, wait_until_listening};

/// A server process owned by the engine.
#[derive(Debug)]
pub struct ProcessFixture {
    command: HookCommand,
    base_url: String,
    credential: Credential,
    reset: ResetHook,
    shutdown: Option<HookCommand>,
    ready_timeout: Duration,
    grace_period: Duration,
    child: Option<Child>,
}

impl ProcessFixture {
    /// Creates a fixture that runs `command` and expects it to listen on `base_url`.
    #[must_use]
    pub fn new(
        command: HookCommand,
        base_url: impl Into<String>,
        credential: Credential,
        reset: ResetHook,
    ) -> Self {
        Self {
            command,
            base_url: base_url.into(),
            credential,
            reset,
            shutdown: None,
            ready_timeout: Duration::from_secs(30),
            grace_period: Duration::from_secs(5),
            child: None,
        }
    }

    /// Sets a command asking the server to shut down (builder pattern).
    ///
    /// Without one, or if the server outlives the grace period, the process
    /// is killed.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: HookCommand, grace_period: Duration) -> Self {
        self.shutdown = Some(shutdown);
        self.grace_period = grace_period;
        self
    }

    /// Sets how long `start` waits for the port to open (builder pattern).
    #[must_use]
    pub const fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Whether a child process is currently held.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.child.is_some()
    }

    async fn shut_down_gracefully(&self, child: &mut Child) -> bool {
        let Some(shutdown) = &self.shutdown else {
            return false;
        };
        if let Err(message) = shutdown.run().await {
            warn!("shutdown command failed: {message}");
            return false;
        }
        match tokio::time::timeout(self.grace_period, child.wait()).await {
            Ok(Ok(status)) => {
                info!(%status, "server exited");
                true
            }
            Ok(Err(e)) => {
                warn!("waiting for server failed: {e}");
                false
            }
            Err(_) => {
                warn!(
                    grace_ms = u64::try_from(self.grace_period.as_millis()).unwrap_or(u64::MAX),
                    "server still running after shutdown request"
                );
                false
            }
        }
    }
}

#[async_trait]
impl Fixture for ProcessFixture {
    async fn start(&mut self) -> Result<FixtureHandle, FixtureError> {
        if self.child.is_some() {
            return Err(FixtureError::Start("server is already running".to_string()));
        }
        let address = socket_address(&self.base_url)?;

        let child = Command::new(&self.command.program)
            .args(&self.command.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| FixtureError::Start(format!("{}: {e}", self.command.program)))?;
        info!(program = %self.command.program, pid = child.id(), "server spawned");
        // Kept even if the port never opens so that `stop` reaps it.
        self.child = Some(child);

        let program = &self.command.program;
        let child = &mut self.child;
        wait_until_listening(&address, self.ready_timeout, || {
            if let Some(child) = child.as_mut()
                && let Some(status) = child.try_wait()?
            {
                return Err(FixtureError::Start(format!(
                    "{program} exited with {status} before accepting connections"
                )));
            }
            Ok(())
        })
        .await?;
        info!(%address, "server accepting connections");
        Ok(FixtureHandle::new(&self.base_url, self.credential.clone()))
    }

    async fn reset(&mut self) -> Result<(), FixtureError> {
        self.reset.run().await
    }

    async fn stop(&mut self) -> Result<(), FixtureError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        if let Some(status) = child.try_wait()? {
            warn!(%status, "server had already exited");
            return Ok(());
        }
        if self.shut_down_gracefully(&mut child).await {
            return Ok(());
        }

        child
            .kill()
            .await
            .map_err(|e| FixtureError::Stop(format!("{}: {e}", self.command.program)))?;
        info!("server killed");
        Ok(())
    }
}
