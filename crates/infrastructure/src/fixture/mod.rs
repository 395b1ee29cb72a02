//! Fixture lifecycle adapters.
//!
//! Two ways of providing the server under test:
//! - [`ExternalFixture`]: the server is already running somewhere
//! - [`ProcessFixture`]: the engine launches the server as a child process
//!
//! Both reset state through a [`ResetHook`] and wait for the server's TCP
//! port to accept connections before handing out a handle.

mod external;
mod hooks;
mod process;

use std::future::Future;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::Instant;
use url::Url;

use blackbox_application::{Fixture, FixtureError, FixtureHandle};

pub use external::ExternalFixture;
pub use hooks::{HookCommand, ResetHook};
pub use process::ProcessFixture;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Fixture selected by configuration.
#[derive(Debug)]
pub enum ConfiguredFixture {
    /// Already running server.
    External(ExternalFixture),
    /// Server launched by the engine.
    Process(ProcessFixture),
}

#[async_trait]
impl Fixture for ConfiguredFixture {
    async fn start(&mut self) -> Result<FixtureHandle, FixtureError> {
        match self {
            Self::External(fixture) => fixture.start().await,
            Self::Process(fixture) => fixture.start().await,
        }
    }

    async fn reset(&mut self) -> Result<(), FixtureError> {
        match self {
            Self::External(fixture) => fixture.reset().await,
            Self::Process(fixture) => fixture.reset().await,
        }
    }

    async fn stop(&mut self) -> Result<(), FixtureError> {
        match self {
            Self::External(fixture) => fixture.stop().await,
            Self::Process(fixture) => fixture.stop().await,
        }
    }
}

/// Extracts `host:port` from a base URL.
pub(crate) fn socket_address(base_url: &str) -> Result<String, FixtureError> {
    let url = Url::parse(base_url)
        .map_err(|e| FixtureError::Start(format!("invalid base URL {base_url}: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| FixtureError::Start(format!("base URL {base_url} has no host")))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| FixtureError::Start(format!("base URL {base_url} has no port")))?;
    Ok(format!("{host}:{port}"))
}

/// Polls `address` until a TCP connection succeeds or `timeout` elapses.
///
/// `exited` runs before every attempt and aborts the wait by returning an
/// error, e.g. when the server process has already died.
pub(crate) async fn wait_until_listening<X>(
    address: &str,
    timeout: Duration,
    exited: X,
) -> Result<(), FixtureError>
where
    X: FnMut() -> Result<(), FixtureError>,
{
    poll_until_ready(address, timeout, || TcpStream::connect(address), exited).await
}

/// Readiness loop with a pluggable connect attempt.
///
/// Every attempt is cut off at the deadline, so a peer that never answers
/// cannot stretch the wait past `timeout`.
async fn poll_until_ready<C, F, T, X>(
    address: &str,
    timeout: Duration,
    mut connect: C,
    mut exited: X,
) -> Result<(), FixtureError>
where
    C: FnMut() -> F,
    F: Future<Output = io::Result<T>>,
    X: FnMut() -> Result<(), FixtureError>,
{
    let started = Instant::now();
    let deadline = started + timeout;
    loop {
        exited()?;
        let remaining = deadline.saturating_duration_since(Instant::now());
        if let Ok(Ok(_)) = tokio::time::timeout(remaining, connect()).await {
            return Ok(());
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(FixtureError::NotReady {
                address: address.to_string(),
                waited_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            });
        }
        tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::net::TcpListener;

    #[test]
    fn socket_address_uses_explicit_or_default_port() {
        assert_eq!(
            socket_address("http://127.0.0.1:9191").unwrap(),
            "127.0.0.1:9191"
        );
        assert_eq!(socket_address("http://localhost/api").unwrap(), "localhost:80");
        assert!(socket_address("not a url").is_err());
    }

    #[tokio::test]
    async fn ready_when_listener_is_bound() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        wait_until_listening(&address, Duration::from_secs(1), || Ok(()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn not_ready_after_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let result = wait_until_listening(&address, Duration::from_millis(250), || Ok(())).await;
        assert!(matches!(result, Err(FixtureError::NotReady { .. })));
    }

    #[tokio::test]
    async fn hanging_connect_is_cut_off_at_the_deadline() {
        let started = std::time::Instant::now();
        let result = poll_until_ready(
            "10.255.255.1:9191",
            Duration::from_millis(300),
            std::future::pending::<io::Result<()>>,
            || Ok(()),
        )
        .await;

        assert!(matches!(
            result,
            Err(FixtureError::NotReady { ref address, .. }) if address == "10.255.255.1:9191"
        ));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn exit_check_aborts_the_wait() {
        let mut checks = 0;
        let result = poll_until_ready(
            "127.0.0.1:1",
            Duration::from_secs(10),
            || async { Err::<(), _>(io::Error::from(io::ErrorKind::ConnectionRefused)) },
            || {
                checks += 1;
                if checks == 3 {
                    Err(FixtureError::Start("server exited".to_string()))
                } else {
                    Ok(())
                }
            },
        )
        .await;

        assert!(matches!(result, Err(FixtureError::Start(_))));
        assert_eq!(checks, 3);
    }
}
