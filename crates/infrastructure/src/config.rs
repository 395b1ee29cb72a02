//! Engine configuration.
//!
//! Settings are layered: built-in defaults, then an optional YAML/TOML/JSON
//! file, then `BLACKBOX_*` environment variables. Nested keys use a double
//! underscore, e.g. `BLACKBOX_CREDENTIAL__USERNAME`.
//!
//! The `fixture` section and its `reset` hook have no default. Running
//! without a reset must be requested with `reset: { kind: none }`.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use blackbox_domain::Credential;

use crate::fixture::{ConfiguredFixture, ExternalFixture, HookCommand, ProcessFixture, ResetHook};

const ENV_PREFIX: &str = "BLACKBOX";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The configuration parsed but is not usable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// How the server under test is provided.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FixtureConfig {
    /// The server is already running at `base_url`.
    External {
        /// Reset hook run before each suite.
        reset: ResetHook,
        /// Seconds to wait for the port to accept connections.
        #[serde(default = "default_external_ready_secs")]
        ready_timeout_secs: u64,
    },
    /// The engine launches the server.
    Process {
        /// Server command line.
        command: HookCommand,
        /// Reset hook run before each suite.
        reset: ResetHook,
        /// Command asking the server to exit; it is killed otherwise.
        #[serde(default)]
        shutdown: Option<HookCommand>,
        /// Seconds to wait for the port to accept connections.
        #[serde(default = "default_process_ready_secs")]
        ready_timeout_secs: u64,
        /// Seconds to wait after the shutdown command before killing.
        #[serde(default = "default_grace_secs")]
        grace_period_secs: u64,
    },
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Scheme, host and port of the server under test.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Credential attached to every request.
    #[serde(default)]
    pub credential: Credential,
    /// Fixture lifecycle settings.
    pub fixture: FixtureConfig,
}

impl EngineConfig {
    /// Loads configuration from `path` (if any) and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source cannot be read or the result is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the type system does not.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base_url {}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "base_url {} must use http or https",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".to_string()));
        }
        if let FixtureConfig::Process { command, .. } = &self.fixture
            && command.program.trim().is_empty()
        {
            return Err(ConfigError::Invalid(
                "fixture command program must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds the fixture this configuration describes.
    #[must_use]
    pub fn build_fixture(&self) -> ConfiguredFixture {
        match &self.fixture {
            FixtureConfig::External {
                reset,
                ready_timeout_secs,
            } => ConfiguredFixture::External(
                ExternalFixture::new(&self.base_url, self.credential.clone(), reset.clone())
                    .with_ready_timeout(Duration::from_secs(*ready_timeout_secs)),
            ),
            FixtureConfig::Process {
                command,
                reset,
                shutdown,
                ready_timeout_secs,
                grace_period_secs,
            } => {
                let mut fixture = ProcessFixture::new(
                    command.clone(),
                    &self.base_url,
                    self.credential.clone(),
                    reset.clone(),
                )
                .with_ready_timeout(Duration::from_secs(*ready_timeout_secs));
                if let Some(shutdown) = shutdown {
                    fixture = fixture
                        .with_shutdown(shutdown.clone(), Duration::from_secs(*grace_period_secs));
                }
                ConfiguredFixture::Process(fixture)
            }
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:9191".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_external_ready_secs() -> u64 {
    5
}

const fn default_process_ready_secs() -> u64 {
    30
}

const fn default_grace_secs() -> u64 {
    5
}
