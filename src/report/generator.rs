//! Chart report generation.
//!
//! This module renders Markdown and JSON reports from an aggregated
//! chart series.

use crate::models::{ChartReport, RecordIssue, ReportMetadata, SeriesSummary};
use anyhow::Result;

/// Issues listed individually before the rest are summarized.
const MAX_LISTED_ISSUES: usize = 20;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &ChartReport) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!("# {}\n\n", report.title));

    output.push_str(&generate_metadata_section(&report.metadata));

    output.push_str(&generate_series_section(report));

    output.push_str(&generate_summary_section(
        &report.summary,
        report.metadata.metric.axis_suffix(report.metadata.locale),
    ));

    output.push_str(&generate_issues_section(&report.issues));

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    if let Some(ref user) = metadata.user_id {
        section.push_str(&format!("- **User:** `{}`\n", user));
    }
    section.push_str(&format!("- **Granularity:** {}\n", metadata.granularity));
    section.push_str(&format!(
        "- **Metric:** {} ({})\n",
        metadata.metric,
        metadata.metric.unit()
    ));
    section.push_str(&format!(
        "- **Records Loaded:** {}\n",
        metadata.records_loaded
    ));
    section.push_str(&format!(
        "- **Records Charted:** {}\n",
        metadata.records_charted
    ));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push('\n');

    section
}

/// Generate the data point table.
fn generate_series_section(report: &ChartReport) -> String {
    let mut section = String::new();

    section.push_str("## Chart\n\n");

    if report.series.is_empty() {
        section.push_str("No records to chart yet.\n\n");
        return section;
    }

    let suffix = report
        .metadata
        .metric
        .axis_suffix(report.metadata.locale);
    section.push_str("| Label | Value |\n");
    section.push_str("|:---|---:|\n");
    for (label, value) in report.series.points() {
        section.push_str(&format!(
            "| {} | {}{} |\n",
            label,
            format_value(value),
            suffix
        ));
    }
    section.push('\n');

    section
}

/// Generate the summary statistics section.
fn generate_summary_section(summary: &SeriesSummary, suffix: &str) -> String {
    let (Some(min), Some(max), Some(mean)) = (summary.min, summary.max, summary.mean) else {
        return String::new();
    };

    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Points | Min | Max | Mean |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {}{} | {}{} | {}{} |\n\n",
        summary.points,
        format_value(min),
        suffix,
        format_value(max),
        suffix,
        format_value((mean * 100.0).round() / 100.0),
        suffix
    ));

    section
}

/// Generate the validation section.
fn generate_issues_section(issues: &[RecordIssue]) -> String {
    if issues.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Validation\n\n");
    section.push_str(&format!(
        "{} problem(s) found in stored records:\n\n",
        issues.len()
    ));

    for issue in issues.iter().take(MAX_LISTED_ISSUES) {
        let id = if issue.record_id.is_empty() {
            "(no id)"
        } else {
            issue.record_id.as_str()
        };
        section.push_str(&format!("- `{}` ({}): {}\n", id, issue.date, issue.message));
    }

    if issues.len() > MAX_LISTED_ISSUES {
        section.push_str(&format!(
            "- ... and {} more\n",
            issues.len() - MAX_LISTED_ISSUES
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by HealthLog*\n".to_string()
}

/// Format a chart value without a trailing `.0` for whole numbers.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// Generate a JSON report.
pub fn generate_json_report(report: &ChartReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;
    use crate::models::{chart_title, ChartSeries, Granularity, Metric};
    use chrono::Utc;

    fn create_test_report() -> ChartReport {
        let mut series = ChartSeries::default();
        series.push("13 Eki".to_string(), 8.0);
        series.push("20 Eki".to_string(), 7.5);

        let summary = SeriesSummary::from_series(&series);

        ChartReport {
            metadata: ReportMetadata {
                source: "logs.json".to_string(),
                user_id: Some("user-1".to_string()),
                granularity: Granularity::Weekly,
                metric: Metric::Sleep,
                locale: Locale::En,
                records_loaded: 5,
                records_charted: 4,
                generated_at: Utc::now(),
            },
            title: chart_title(Granularity::Weekly, Metric::Sleep),
            series,
            summary,
            issues: vec![RecordIssue {
                record_id: "log-9".to_string(),
                date: "garbage".to_string(),
                message: "invalid date 'garbage'".to_string(),
            }],
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# Weekly Sleep Duration Analysis"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("`user-1`"));
        assert!(markdown.contains("| 13 Eki | 8 h |"));
        assert!(markdown.contains("| 20 Eki | 7.5 h |"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains("| 2 | 7.5 h | 8 h | 7.75 h |"));
        assert!(markdown.contains("## Validation"));
        assert!(markdown.contains("`log-9`"));
    }

    #[test]
    fn test_turkish_sleep_suffix() {
        let mut report = create_test_report();
        report.metadata.locale = Locale::Tr;
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("| 13 Eki | 8 sa |"));
        assert!(markdown.contains("| 2 | 7.5 sa | 8 sa | 7.75 sa |"));
    }

    #[test]
    fn test_empty_series_section() {
        let mut report = create_test_report();
        report.series = ChartSeries::default();
        report.summary = SeriesSummary::from_series(&report.series);
        report.issues.clear();

        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("No records to chart yet."));
        assert!(!markdown.contains("## Summary"));
        assert!(!markdown.contains("## Validation"));
    }

    #[test]
    fn test_issue_list_is_capped() {
        let issues: Vec<RecordIssue> = (0..25)
            .map(|i| RecordIssue {
                record_id: format!("log-{}", i),
                date: "2025-10-16".to_string(),
                message: "steps is missing or not a number".to_string(),
            })
            .collect();

        let section = generate_issues_section(&issues);
        assert!(section.contains("25 problem(s)"));
        assert!(section.contains("... and 5 more"));
        assert!(!section.contains("`log-20`"));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1000.0), "1000");
        assert_eq!(format_value(72.5), "72.5");
        assert_eq!(format_value(0.0), "0");
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"labels\""));
        assert!(json.contains("\"values\""));
        assert!(json.contains("\"granularity\": \"weekly\""));
        assert!(json.contains("\"metric\": \"sleep\""));
    }
}
