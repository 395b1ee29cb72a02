//! Request dispatcher implementation using reqwest.
//!
//! This adapter implements the `Dispatcher` port. It owns one
//! `reqwest::Client`, built once with the fixed request timeout, plus the
//! base URL and credential handed out by the fixture.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::{Client, Method, Url};
use tracing::debug;

use blackbox_application::{Dispatcher, FixtureHandle, TransportError};
use blackbox_domain::{ActualResponse, Credential, HttpMethod};

/// Timeout applied to every request unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_REDIRECTS: usize = 10;

/// Sends test requests to the server under test.
pub struct ReqwestDispatcher {
    client: Client,
    base_url: String,
    credential: Credential,
    timeout: Duration,
}

impl ReqwestDispatcher {
    /// Creates a dispatcher for the server described by `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidUrl`] if the base URL does not parse,
    /// or [`TransportError::Other`] if the client cannot be built.
    pub fn new(handle: &FixtureHandle, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("blackbox/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        let base_url = handle.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{e}: {}", handle.base_url)))?;

        Ok(Self {
            client,
            base_url,
            credential: handle.credential.clone(),
            timeout,
        })
    }

    /// Joins the base URL and a request path.
    ///
    /// The path is appended verbatim so that query strings and unusual
    /// segments reach the server exactly as written in the test case.
    fn url_for(&self, path: &str) -> Result<Url, TransportError> {
        let raw = format!("{}{path}", self.base_url);
        Url::parse(&raw).map_err(|e| TransportError::InvalidUrl(format!("{e}: {raw}")))
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    /// Maps reqwest errors to `TransportError`.
    fn map_error(error: &reqwest::Error, timeout: Duration) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            };
        }

        if error.is_connect() {
            if Self::caused_by_refusal(error) {
                let url = error.url();
                return TransportError::ConnectionRefused {
                    host: url
                        .and_then(Url::host_str)
                        .unwrap_or("unknown")
                        .to_string(),
                    port: url.and_then(Url::port_or_known_default).unwrap_or(80),
                };
            }
            return TransportError::ConnectionFailed(Self::error_chain(error));
        }

        if error.is_redirect() {
            return TransportError::Other(format!(
                "stopped after {MAX_REDIRECTS} redirects: {error}"
            ));
        }

        TransportError::Other(Self::error_chain(error))
    }

    /// Whether any error in the source chain is an `ECONNREFUSED`.
    fn caused_by_refusal(error: &reqwest::Error) -> bool {
        let mut source = std::error::Error::source(error);
        while let Some(cause) = source {
            if let Some(io) = cause.downcast_ref::<std::io::Error>()
                && io.kind() == std::io::ErrorKind::ConnectionRefused
            {
                return true;
            }
            source = cause.source();
        }
        false
    }

    /// Joins an error and its sources into one line.
    fn error_chain(error: &reqwest::Error) -> String {
        let mut message = error.to_string();
        let mut source = std::error::Error::source(error);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

#[async_trait]
impl Dispatcher for ReqwestDispatcher {
    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: &str,
    ) -> Result<ActualResponse, TransportError> {
        let url = self.url_for(path)?;
        let start = Instant::now();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(method), url)
            .header(CONTENT_TYPE, "application/json")
            .basic_auth(&self.credential.username, Some(&self.credential.password))
            .header(COOKIE, self.credential.cookie.header_value());

        // Sent unvalidated; malformed bodies are part of what gets tested.
        if !body.is_empty() {
            builder = builder.body(body.to_string());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, self.timeout))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Self::map_error(&e, self.timeout))?;

        debug!(
            %method,
            path,
            status,
            bytes = bytes.len(),
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "request completed"
        );

        Ok(ActualResponse::new(status, bytes.to_vec()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn handle(base_url: &str) -> FixtureHandle {
        FixtureHandle::new(base_url, Credential::default())
    }

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(
            ReqwestDispatcher::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestDispatcher::to_reqwest_method(HttpMethod::Patch),
            Method::PATCH
        );
        assert_eq!(
            ReqwestDispatcher::to_reqwest_method(HttpMethod::Delete),
            Method::DELETE
        );
    }

    #[test]
    fn appends_paths_verbatim() {
        let dispatcher = ReqwestDispatcher::new(&handle("http://127.0.0.1:9191/"), DEFAULT_TIMEOUT)
            .unwrap();
        assert_eq!(dispatcher.base_url, "http://127.0.0.1:9191");
        assert_eq!(
            dispatcher.url_for("/ob/listing/ron_swanson_tshirt?x=1").unwrap().as_str(),
            "http://127.0.0.1:9191/ob/listing/ron_swanson_tshirt?x=1"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let dispatcher =
            ReqwestDispatcher::new(&handle("http://localhost:8080/api"), DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            dispatcher.url_for("/ob/status").unwrap().as_str(),
            "http://localhost:8080/api/ob/status"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        let result = ReqwestDispatcher::new(&handle("127.0.0.1 9191"), DEFAULT_TIMEOUT);
        assert!(matches!(result, Err(TransportError::InvalidUrl(_))));
    }
}
