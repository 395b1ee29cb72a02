//! Command line definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use blackbox_infrastructure::ReportFormat;

/// Blackbox - stateful HTTP blackbox test runner
#[derive(Debug, Parser)]
#[command(name = "blackbox")]
#[command(about = "Runs ordered HTTP/JSON test suites against a live server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run suites against the server under test
    Run {
        /// Engine configuration file (YAML, TOML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Suite file (YAML or JSON)
        #[arg(short, long)]
        suites: PathBuf,

        /// Only run suites whose name matches this regular expression
        #[arg(short, long)]
        filter: Option<String>,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Override the configured base URL
        #[arg(long)]
        base_url: Option<String>,
    },
    /// List suites and their case counts
    List {
        /// Suite file (YAML or JSON)
        #[arg(short, long)]
        suites: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Text,
            OutputFormat::Json => Self::Json,
        }
    }
}
