//! HealthLog - trend charts for a daily wellness journal
//!
//! A CLI tool that reads log records exported from the journal's
//! document store and renders daily, weekly or monthly trend charts.
//!
//! Exit codes:
//!   0 - Success (or validation problems without --strict)
//!   1 - Runtime error (unreadable input, bad config, etc.)
//!   2 - Invalid records found with --strict

mod analysis;
mod cli;
mod config;
mod locale;
mod models;
mod report;
mod store;
mod validation;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use locale::LabelFormatter;
use models::{chart_title, ChartReport, LogRecord, ReportMetadata, SeriesSummary};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("HealthLog v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .healthlog.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the chart, locale, and entry limits.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so reports printed to stdout stay clean.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run a one-shot or watching chart session. Returns exit code (0 or 2).
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let input = args
        .input
        .clone()
        .context("An --input path is required")?;
    let formatter = config.locale.formatter()?;

    info!(
        "Charting {} {} from {}",
        config.chart.granularity,
        config.chart.metric,
        input.display()
    );

    if args.watch {
        return run_watch(&input, &config, &formatter).await;
    }

    let records = store::load_records(&input)?;
    let report = build_report(records, &input, &config, &formatter);
    write_report(&report, &config)?;

    if fails_strict(&report, &config) {
        eprintln!(
            "\n⛔ {} invalid record field(s) found. Failing (exit code 2).",
            report.issues.len()
        );
        return Ok(2);
    }

    Ok(0)
}

/// Re-render the report on every store change until Ctrl-C.
async fn run_watch(input: &Path, config: &Config, formatter: &dyn LabelFormatter) -> Result<i32> {
    let interval = Duration::from_millis(config.watch.poll_ms);
    let mut subscription = store::Subscription::spawn(input.to_path_buf(), interval);

    info!(
        "Watching {} every {}ms (Ctrl-C to stop)",
        input.display(),
        config.watch.poll_ms
    );

    loop {
        tokio::select! {
            snapshot = subscription.next() => {
                let Some(snapshot) = snapshot else {
                    warn!("Watch stopped unexpectedly");
                    return Ok(1);
                };

                match snapshot {
                    Ok(records) => {
                        let report = build_report(records, input, config, formatter);
                        if let Err(e) = write_report(&report, config) {
                            error!("Failed to write report: {:#}", e);
                        }
                        // Watch mode keeps running, so strict failures are only logged
                        if fails_strict(&report, config) {
                            warn!(
                                "{} invalid record field(s) found with --strict",
                                report.issues.len()
                            );
                        }
                    }
                    Err(e) => error!("Failed to load records: {:#}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watch");
                return Ok(0);
            }
        }
    }
}

/// Whether `--strict` turns this report's validation problems into a failure.
fn fails_strict(report: &ChartReport, config: &Config) -> bool {
    config.general.strict && !report.issues.is_empty()
}

/// Filter, validate and aggregate records into a report.
fn build_report(
    records: Vec<LogRecord>,
    input: &Path,
    config: &Config,
    formatter: &dyn LabelFormatter,
) -> ChartReport {
    let records_loaded = records.len();

    let records = match config.chart.user_id {
        Some(ref user) => store::filter_user(records, user),
        None => records,
    };

    let issues = validation::validate_records(&records, &config.limits);
    if !issues.is_empty() {
        warn!("{} validation problem(s) in stored records", issues.len());
    }

    let granularity = config.chart.granularity;
    let metric = config.chart.metric;

    let records_charted = records
        .iter()
        .filter(|r| r.parsed_date().is_some())
        .count();
    if records_charted < records.len() {
        debug!(
            "Skipping {} record(s) with unparseable dates",
            records.len() - records_charted
        );
    }

    let series = analysis::aggregate(&records, granularity, metric, formatter);
    let summary = SeriesSummary::from_series(&series);

    ChartReport {
        metadata: ReportMetadata {
            source: input.display().to_string(),
            user_id: config.chart.user_id.clone(),
            granularity,
            metric,
            locale: config.locale.language,
            records_loaded,
            records_charted,
            generated_at: Utc::now(),
        },
        title: chart_title(granularity, metric),
        series,
        summary,
        issues,
    }
}

/// Render the report and write it to the configured output or stdout.
fn write_report(report: &ChartReport, config: &Config) -> Result<()> {
    let output = match config.general.format {
        OutputFormat::Json => report::generate_json_report(report)?,
        OutputFormat::Markdown => report::generate_markdown_report(report),
    };

    match config.general.output {
        Some(ref path) => {
            let path = PathBuf::from(path);
            std::fs::write(&path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!(
                "Report with {} point(s) saved to {}",
                report.series.len(),
                path.display()
            );
        }
        None => println!("{}", output),
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
