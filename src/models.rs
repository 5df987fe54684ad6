//! Data models for the health journal.
//!
//! This module contains the core data structures used throughout
//! the application for representing log records, chart series, and reports.

use crate::locale::Locale;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Time-bucketing mode for a chart.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One point per record, last seven records
    Daily,
    /// Mean per Monday-started week
    #[default]
    Weekly,
    /// Mean per calendar month
    Monthly,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Daily => write!(f, "daily"),
            Granularity::Weekly => write!(f, "weekly"),
            Granularity::Monthly => write!(f, "monthly"),
        }
    }
}

impl Granularity {
    /// Returns the period name used in chart titles.
    pub fn period_label(&self) -> &'static str {
        match self {
            Granularity::Daily => "Daily",
            Granularity::Weekly => "Weekly",
            Granularity::Monthly => "Monthly",
        }
    }
}

/// The numeric field being charted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Steps,
    Water,
    Sleep,
    Calories,
    Weight,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Steps => write!(f, "steps"),
            Metric::Water => write!(f, "water"),
            Metric::Sleep => write!(f, "sleep"),
            Metric::Calories => write!(f, "calories"),
            Metric::Weight => write!(f, "weight"),
        }
    }
}

impl Metric {
    /// All recognized metrics, in display order.
    pub const ALL: [Metric; 5] = [
        Metric::Steps,
        Metric::Sleep,
        Metric::Calories,
        Metric::Water,
        Metric::Weight,
    ];

    /// Reads this metric from a record.
    ///
    /// Returns `None` when the field was missing or not numeric.
    pub fn value_of(&self, record: &LogRecord) -> Option<f64> {
        match self {
            Metric::Steps => record.steps,
            Metric::Water => record.water,
            Metric::Sleep => record.sleep,
            Metric::Calories => record.calories,
            Metric::Weight => record.weight,
        }
    }

    /// Human-readable name used in chart titles.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Steps => "Steps",
            Metric::Water => "Water Intake",
            Metric::Sleep => "Sleep Duration",
            Metric::Calories => "Calories",
            Metric::Weight => "Weight",
        }
    }

    /// Suffix appended to values on the chart axis.
    pub fn axis_suffix(&self, locale: Locale) -> &'static str {
        match self {
            Metric::Sleep => match locale {
                Locale::Tr => " sa",
                Locale::En => " h",
            },
            Metric::Water => " L",
            Metric::Weight => " kg",
            Metric::Steps | Metric::Calories => "",
        }
    }

    /// Unit name shown next to raw entries.
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Steps => "steps",
            Metric::Water => "liters",
            Metric::Sleep => "hours",
            Metric::Calories => "kcal",
            Metric::Weight => "kg",
        }
    }
}

/// A single daily log document owned by the storage layer.
///
/// Metric fields are lenient: a JSON number or numeric string becomes
/// `Some`, anything else (null, missing, text, bool) becomes `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// Document identifier.
    #[serde(default)]
    pub id: String,
    /// Calendar date, usually `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub sleep: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub water: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub steps: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub calories: Option<f64>,
    /// Owning user.
    #[serde(default)]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl LogRecord {
    /// Parses the record's date, ignoring any time of day.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_log_date(&self.date)
    }
}

/// Parses a log date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS`
/// timestamps. Timestamps keep the calendar date as written.
pub fn parse_log_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

/// Converts a JSON value to a finite number, if it holds one.
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        _ => String::new(),
    })
}

/// Chart-ready output: index-aligned labels and values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    /// Appends one data point.
    pub fn push(&mut self, label: String, value: f64) {
        self.labels.push(label);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterates over `(label, value)` pairs.
    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Summary statistics over a chart series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    /// Number of data points.
    pub points: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Arithmetic mean of the plotted values.
    pub mean: Option<f64>,
}

impl SeriesSummary {
    /// Creates a summary from a chart series.
    pub fn from_series(series: &ChartSeries) -> Self {
        let mut summary = Self {
            points: series.len(),
            ..Self::default()
        };

        if series.is_empty() {
            return summary;
        }

        let mut sum = 0.0;
        for &value in &series.values {
            summary.min = Some(summary.min.map_or(value, |m: f64| m.min(value)));
            summary.max = Some(summary.max.map_or(value, |m: f64| m.max(value)));
            sum += value;
        }
        summary.mean = Some(sum / series.len() as f64);

        summary
    }
}

/// A validation problem found in a stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordIssue {
    /// Identifier of the offending record.
    pub record_id: String,
    /// Raw date of the offending record.
    pub date: String,
    /// Description of the problem.
    pub message: String,
}

/// Metadata about a chart report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path the records were loaded from.
    pub source: String,
    /// User the records were filtered to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub granularity: Granularity,
    pub metric: Metric,
    /// Locale of labels and axis suffixes.
    #[serde(default)]
    pub locale: Locale,
    /// Number of records loaded from the store.
    pub records_loaded: usize,
    /// Number of records with a usable date.
    pub records_charted: usize,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
}

/// The complete chart report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartReport {
    /// Metadata about the report.
    pub metadata: ReportMetadata,
    /// Chart title, e.g. "Weekly Steps Analysis".
    pub title: String,
    /// The aggregated series.
    pub series: ChartSeries,
    /// Summary statistics of the series.
    pub summary: SeriesSummary,
    /// Records that failed validation.
    pub issues: Vec<RecordIssue>,
}

/// Builds the chart title for a granularity and metric.
pub fn chart_title(granularity: Granularity, metric: Metric) -> String {
    format!("{} {} Analysis", granularity.period_label(), metric.label())
}
