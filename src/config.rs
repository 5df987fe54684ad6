//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.healthlog.toml` files.

use crate::cli::OutputFormat;
use crate::locale::{Locale, MonthNames};
use crate::models::{Granularity, Metric};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".healthlog.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Chart settings.
    #[serde(default)]
    pub chart: ChartConfig,

    /// Label locale settings.
    #[serde(default)]
    pub locale: LocaleConfig,

    /// Per-metric entry limits.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Watch mode settings.
    #[serde(default)]
    pub watch: WatchConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report file path. Reports go to stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Exit with code 2 when any record fails validation.
    #[serde(default)]
    pub strict: bool,
}

/// Chart selection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Time bucketing mode.
    #[serde(default)]
    pub granularity: Granularity,

    /// Metric to chart.
    #[serde(default)]
    pub metric: Metric,

    /// Only chart records owned by this user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Label locale settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocaleConfig {
    /// Built-in month names to use.
    #[serde(default)]
    pub language: Locale,

    /// Custom month abbreviations, January first. Overrides `language`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub months: Vec<String>,
}

impl LocaleConfig {
    /// Build the label formatter described by this configuration.
    pub fn formatter(&self) -> Result<MonthNames> {
        if self.months.is_empty() {
            Ok(MonthNames::for_locale(self.language))
        } else {
            MonthNames::custom(self.months.clone()).context("Invalid [locale] months")
        }
    }
}

/// Range and step size for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricLimit {
    /// Largest accepted value. The smallest is always 0.
    pub max: f64,
    /// Stepper increment used by entry forms.
    pub step: f64,
}

/// Entry limits for every metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_sleep_limit")]
    pub sleep: MetricLimit,

    #[serde(default = "default_water_limit")]
    pub water: MetricLimit,

    #[serde(default = "default_steps_limit")]
    pub steps: MetricLimit,

    #[serde(default = "default_calories_limit")]
    pub calories: MetricLimit,

    #[serde(default = "default_weight_limit")]
    pub weight: MetricLimit,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            sleep: default_sleep_limit(),
            water: default_water_limit(),
            steps: default_steps_limit(),
            calories: default_calories_limit(),
            weight: default_weight_limit(),
        }
    }
}

impl LimitsConfig {
    /// Limits for one metric.
    pub fn for_metric(&self, metric: Metric) -> &MetricLimit {
        match metric {
            Metric::Sleep => &self.sleep,
            Metric::Water => &self.water,
            Metric::Steps => &self.steps,
            Metric::Calories => &self.calories,
            Metric::Weight => &self.weight,
        }
    }
}

fn default_sleep_limit() -> MetricLimit {
    MetricLimit { max: 24.0, step: 0.5 }
}

fn default_water_limit() -> MetricLimit {
    MetricLimit { max: 10.0, step: 0.25 }
}

fn default_steps_limit() -> MetricLimit {
    MetricLimit {
        max: 100_000.0,
        step: 100.0,
    }
}

fn default_calories_limit() -> MetricLimit {
    MetricLimit {
        max: 10_000.0,
        step: 50.0,
    }
}

fn default_weight_limit() -> MetricLimit {
    MetricLimit { max: 300.0, step: 0.1 }
}

/// Watch mode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// How often to poll the input for changes, in milliseconds.
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_ms: default_poll_ms(),
        }
    }
}

fn default_poll_ms() -> u64 {
    1000
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values given explicitly on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(granularity) = args.granularity {
            self.chart.granularity = granularity;
        }
        if let Some(metric) = args.metric {
            self.chart.metric = metric;
        }
        if let Some(ref user) = args.user {
            self.chart.user_id = Some(user.clone());
        }

        if let Some(format) = args.format {
            self.general.format = format;
        }
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }

        // An explicit locale replaces any custom month table
        if let Some(locale) = args.locale {
            self.locale.language = locale;
            self.locale.months.clear();
        }

        if let Some(poll_ms) = args.poll_ms {
            self.watch.poll_ms = poll_ms;
        }

        // Flags always override
        if args.strict {
            self.general.strict = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
