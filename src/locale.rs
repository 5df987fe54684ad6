//! Chart label formatting.
//!
//! Labels are produced through the [`LabelFormatter`] trait so the
//! aggregator never depends on the process locale.

use anyhow::{bail, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Formats dates into chart labels.
pub trait LabelFormatter {
    /// Day and abbreviated month, e.g. `16 Eki`.
    fn day_month(&self, date: NaiveDate) -> String;

    /// Abbreviated month and two-digit year, e.g. `Eki 25`.
    fn month_year(&self, date: NaiveDate) -> String;
}

/// Built-in month name tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Turkish (default)
    #[default]
    Tr,
    /// English
    En,
}

const TURKISH_MONTHS: [&str; 12] = [
    "Oca", "Şub", "Mar", "Nis", "May", "Haz", "Tem", "Ağu", "Eyl", "Eki", "Kas", "Ara",
];

const ENGLISH_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A formatter backed by twelve month abbreviations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthNames {
    months: Vec<String>,
}

impl MonthNames {
    /// Creates a formatter for a built-in locale.
    pub fn for_locale(locale: Locale) -> Self {
        let table = match locale {
            Locale::Tr => &TURKISH_MONTHS,
            Locale::En => &ENGLISH_MONTHS,
        };
        Self {
            months: table.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Creates a formatter from custom abbreviations (January first).
    pub fn custom(months: Vec<String>) -> Result<Self> {
        if months.len() != 12 {
            bail!(
                "Expected 12 month abbreviations, got {}",
                months.len()
            );
        }
        if months.iter().any(|m| m.trim().is_empty()) {
            bail!("Month abbreviations must not be empty");
        }
        Ok(Self { months })
    }

    fn month(&self, date: NaiveDate) -> &str {
        &self.months[date.month0() as usize]
    }
}

impl Default for MonthNames {
    fn default() -> Self {
        Self::for_locale(Locale::default())
    }
}

impl LabelFormatter for MonthNames {
    fn day_month(&self, date: NaiveDate) -> String {
        format!("{} {}", date.day(), self.month(date))
    }

    fn month_year(&self, date: NaiveDate) -> String {
        format!("{} {:02}", self.month(date), date.year().rem_euclid(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_turkish_labels() {
        let names = MonthNames::for_locale(Locale::Tr);
        assert_eq!(names.day_month(date(2025, 10, 16)), "16 Eki");
        assert_eq!(names.day_month(date(2025, 2, 3)), "3 Şub");
        assert_eq!(names.month_year(date(2025, 10, 1)), "Eki 25");
    }

    #[test]
    fn test_english_labels() {
        let names = MonthNames::for_locale(Locale::En);
        assert_eq!(names.day_month(date(2025, 8, 9)), "9 Aug");
        assert_eq!(names.month_year(date(2009, 12, 31)), "Dec 09");
    }

    #[test]
    fn test_custom_names() {
        let months: Vec<String> = (1..=12).map(|m| format!("M{}", m)).collect();
        let names = MonthNames::custom(months).unwrap();
        assert_eq!(names.month_year(date(2030, 4, 1)), "M4 30");

        assert!(MonthNames::custom(vec!["Jan".to_string()]).is_err());
        let mut blank: Vec<String> = ENGLISH_MONTHS.iter().map(|m| m.to_string()).collect();
        blank[5] = " ".to_string();
        assert!(MonthNames::custom(blank).is_err());
    }
}
