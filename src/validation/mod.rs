//! Entry validation for log records.
//!
//! This module checks stored records against the per-metric limits used by
//! the entry forms.

use crate::config::LimitsConfig;
use crate::models::{LogRecord, Metric, RecordIssue};
use thiserror::Error;
use tracing::debug;

/// A problem with a single log entry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntryError {
    #[error("invalid date '{0}'")]
    InvalidDate(String),

    #[error("{metric} is missing or not a number")]
    MissingValue { metric: Metric },

    #[error("{metric} value {value} is out of range (0 to {max})")]
    OutOfRange { metric: Metric, value: f64, max: f64 },
}

/// Validate one record against the limits.
///
/// Returns every problem found, in field order.
pub fn validate_record(record: &LogRecord, limits: &LimitsConfig) -> Vec<EntryError> {
    let mut errors = Vec::new();

    if record.parsed_date().is_none() {
        errors.push(EntryError::InvalidDate(record.date.clone()));
    }

    for metric in Metric::ALL {
        let max = limits.for_metric(metric).max;
        match metric.value_of(record) {
            None => errors.push(EntryError::MissingValue { metric }),
            Some(value) if !(0.0..=max).contains(&value) => {
                errors.push(EntryError::OutOfRange { metric, value, max })
            }
            Some(_) => {}
        }
    }

    errors
}

/// Validate all records, flattening problems into report issues.
pub fn validate_records(records: &[LogRecord], limits: &LimitsConfig) -> Vec<RecordIssue> {
    let issues: Vec<RecordIssue> = records
        .iter()
        .flat_map(|record| {
            validate_record(record, limits)
                .into_iter()
                .map(move |error| RecordIssue {
                    record_id: record.id.clone(),
                    date: record.date.clone(),
                    message: error.to_string(),
                })
        })
        .collect();

    debug!(
        "Validated {} records, {} issues",
        records.len(),
        issues.len()
    );
    issues
}
