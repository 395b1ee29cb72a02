//! Blackbox - Main Entry Point
//!
//! Loads configuration and suite files, runs the suites against the server
//! under test and exits with the run's status code.
//!
//! # Usage
//!
//! ```bash
//! # Run every suite against an already running gateway
//! blackbox run --config blackbox.yaml --suites suites/marketplace.yaml
//!
//! # Only the settings suites, as JSON
//! blackbox run -s suites/marketplace.yaml --filter '^settings' --format json
//!
//! # Show what a suite file contains
//! blackbox list --suites suites/marketplace.yaml
//! ```

mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use regex::Regex;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use blackbox_application::Engine;
use blackbox_domain::report::EXIT_HARD_FAILURE;
use blackbox_infrastructure::{EngineConfig, ReportFormat, ReqwestDispatcher, load_suites, render};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so JSON reports on stdout stay parseable
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run {
            config,
            suites,
            filter,
            format,
            base_url,
        } => {
            run(RunArgs {
                config,
                suites,
                filter,
                format: format.into(),
                base_url,
            })
            .await
        }
        Commands::List { suites } => list(&suites).await.map(|()| ExitCode::SUCCESS),
    };

    result.unwrap_or_else(|error| {
        eprintln!("error: {error:#}");
        ExitCode::from(EXIT_HARD_FAILURE)
    })
}

struct RunArgs {
    config: Option<PathBuf>,
    suites: PathBuf,
    filter: Option<String>,
    format: ReportFormat,
    base_url: Option<String>,
}

async fn run(args: RunArgs) -> anyhow::Result<ExitCode> {
    let mut config = EngineConfig::load(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
        config.validate()?;
    }

    let mut registry = load_suites(&args.suites)
        .await
        .with_context(|| format!("loading suites from {}", args.suites.display()))?;
    if let Some(filter) = &args.filter {
        let pattern = Regex::new(filter).with_context(|| format!("invalid filter {filter}"))?;
        registry.retain_matching(&pattern);
        if registry.is_empty() {
            warn!(%filter, "no suite matches the filter");
        }
    }

    info!(
        base_url = %config.base_url,
        suites = registry.len(),
        cases = registry.total_cases(),
        "configuration loaded"
    );

    let timeout = config.timeout();
    let mut engine = Engine::new(config.build_fixture());
    let report = engine
        .run(&registry, |handle| ReqwestDispatcher::new(handle, timeout))
        .await;

    print!("{}", render(&report, args.format)?);
    Ok(ExitCode::from(report.exit_code()))
}

async fn list(suites: &Path) -> anyhow::Result<()> {
    let registry = load_suites(suites)
        .await
        .with_context(|| format!("loading suites from {}", suites.display()))?;
    for suite in &registry {
        println!("{}\t{} cases", suite.name(), suite.len());
    }
    println!("{} suites, {} cases", registry.len(), registry.total_cases());
    Ok(())
}
