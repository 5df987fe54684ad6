//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::locale::Locale;
use crate::models::{Granularity, Metric};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HealthLog - trend charts for your daily wellness journal
///
/// Reads log records exported from the journal's document store and
/// renders daily, weekly or monthly trends for one metric.
///
/// Examples:
///   healthlog --input logs.json
///   healthlog --input logs.json --granularity monthly --metric sleep
///   healthlog --input logs/ --user 9fQ2 --format json --output trend.json
///   healthlog --input logs.jsonl --watch
///   healthlog --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Log records to read
    ///
    /// A JSON array file, a JSONL file, or a directory with one JSON
    /// document per record.
    #[arg(
        short,
        long,
        value_name = "PATH",
        env = "HEALTHLOG_INPUT",
        required_unless_present = "init_config"
    )]
    pub input: Option<PathBuf>,

    /// Time bucketing of the chart
    ///
    /// Default: from config or weekly.
    #[arg(short, long, value_name = "MODE")]
    pub granularity: Option<Granularity>,

    /// Metric to chart
    ///
    /// Default: from config or steps.
    #[arg(short, long, value_name = "METRIC")]
    pub metric: Option<Metric>,

    /// Only chart records owned by this user ID
    #[arg(short, long, value_name = "ID", env = "HEALTHLOG_USER")]
    pub user: Option<String>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Output file path for the report
    ///
    /// Reports are printed to stdout when not set.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Month names used in chart labels (tr, en)
    #[arg(short, long, value_name = "LOCALE")]
    pub locale: Option<Locale>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .healthlog.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Keep running and re-render the chart whenever the input changes
    #[arg(short, long)]
    pub watch: bool,

    /// Poll interval for --watch in milliseconds
    #[arg(long, value_name = "MS")]
    pub poll_ms: Option<u64>,

    /// Fail if any record is invalid
    ///
    /// Useful for CI pipelines. Exit code 2 when a record fails validation.
    #[arg(long)]
    pub strict: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .healthlog.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Smallest accepted --poll-ms value.
pub const MIN_POLL_MS: u64 = 50;

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(poll_ms) = self.poll_ms {
            if poll_ms < MIN_POLL_MS {
                return Err(format!(
                    "Poll interval must be at least {}ms",
                    MIN_POLL_MS
                ));
            }
        }

        match self.input {
            Some(ref path) if !path.exists() => Err(format!(
                "Input path does not exist: {}",
                path.display()
            )),
            Some(_) => Ok(()),
            None => Err("An --input path is required".to_string()),
        }
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
