//! Time-series aggregation of log records.
//!
//! This module turns an unordered collection of daily log records into
//! chart-ready series for the daily, weekly and monthly views.

use crate::locale::LabelFormatter;
use crate::models::{ChartSeries, Granularity, LogRecord, Metric};
use chrono::{Datelike, Days, NaiveDate};
use std::collections::HashMap;

/// Number of records shown in the daily view.
pub const DAILY_WINDOW: usize = 7;

/// A group of records sharing the same week or month.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    /// Chart label for the bucket.
    pub label: String,
    /// Sum of the valid metric values.
    pub sum: f64,
    /// Number of records with a valid metric value.
    pub count: usize,
}

impl Bucket {
    /// Mean of the valid values, rounded half away from zero.
    ///
    /// A bucket without any valid value reduces to 0.
    pub fn rounded_mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.sum / self.count as f64).round()
    }
}

/// Aggregate records into a chart series.
///
/// Records with an unparseable date are dropped in every mode. The remaining
/// records are sorted by date, so callers need not pre-sort.
pub fn aggregate<F>(
    records: &[LogRecord],
    granularity: Granularity,
    metric: Metric,
    formatter: &F,
) -> ChartSeries
where
    F: LabelFormatter + ?Sized,
{
    let dated = sort_by_date(records);

    match granularity {
        Granularity::Daily => daily_series(&dated, metric, formatter),
        Granularity::Weekly => {
            let buckets = bucket_records(&dated, metric, formatter, |date| {
                BucketKey::Week(week_start(date))
            });
            bucket_series(buckets)
        }
        Granularity::Monthly => {
            let buckets = bucket_records(&dated, metric, formatter, |date| {
                BucketKey::Month(formatter.month_year(date))
            });
            bucket_series(buckets)
        }
    }
}

fn bucket_series(buckets: Vec<Bucket>) -> ChartSeries {
    let mut series = ChartSeries::default();
    for bucket in buckets {
        let value = bucket.rounded_mean();
        series.push(bucket.label, value);
    }
    series
}

/// Pair records with their parsed dates, dropping invalid ones, ascending.
///
/// The sort is stable: records sharing a date keep their input order.
pub fn sort_by_date(records: &[LogRecord]) -> Vec<(NaiveDate, &LogRecord)> {
    let mut dated: Vec<(NaiveDate, &LogRecord)> = records
        .iter()
        .filter_map(|r| r.parsed_date().map(|d| (d, r)))
        .collect();

    dated.sort_by_key(|(date, _)| *date);
    dated
}

/// Last [`DAILY_WINDOW`] records, one point each, missing values as 0.
fn daily_series<F>(dated: &[(NaiveDate, &LogRecord)], metric: Metric, formatter: &F) -> ChartSeries
where
    F: LabelFormatter + ?Sized,
{
    let start = dated.len().saturating_sub(DAILY_WINDOW);
    let mut series = ChartSeries::default();

    for (date, record) in &dated[start..] {
        let value = metric.value_of(record).unwrap_or(0.0);
        series.push(formatter.day_month(*date), value);
    }

    series
}

/// Grouping key of a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum BucketKey {
    /// Monday starting the week.
    Week(NaiveDate),
    /// Month label, e.g. `Eki 25`.
    Month(String),
}

/// Group date-sorted records into week or month buckets.
///
/// Buckets are returned in the order their key is first seen. Weeks are
/// keyed by their Monday, months by their label, so a monthly label is
/// never repeated.
fn bucket_records<F, K>(
    dated: &[(NaiveDate, &LogRecord)],
    metric: Metric,
    formatter: &F,
    key_of: K,
) -> Vec<Bucket>
where
    F: LabelFormatter + ?Sized,
    K: Fn(NaiveDate) -> BucketKey,
{
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut index: HashMap<BucketKey, usize> = HashMap::new();

    for (date, record) in dated {
        let key = key_of(*date);

        let position = match index.get(&key).copied() {
            Some(position) => position,
            None => {
                let label = match key {
                    BucketKey::Week(monday) => formatter.day_month(monday),
                    BucketKey::Month(ref label) => label.clone(),
                };
                buckets.push(Bucket {
                    label,
                    sum: 0.0,
                    count: 0,
                });
                index.insert(key, buckets.len() - 1);
                buckets.len() - 1
            }
        };

        let bucket = &mut buckets[position];
        if let Some(value) = metric.value_of(record) {
            bucket.sum += value;
            bucket.count += 1;
        }
    }

    buckets
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}
