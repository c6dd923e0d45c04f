//! Output formatting module for telstat
//!
//! This module provides formatters for the finished [`Report`]:
//! - JSON format, the artifact consumed by downstream dashboards
//! - Table format, a human-readable digest of the most recent days
//!
//! # Examples
//!
//! ```
//! use telstat::output::{JsonFormatter, OutputFormatter, TableFormatter};
//! use telstat_core::aggregation_types::Report;
//! use telstat_core::types::InstallCounts;
//!
//! let report = Report {
//!     telemetry: vec![],
//!     releases: vec![],
//!     total_installs: InstallCounts::default(),
//! };
//!
//! let json = JsonFormatter.format_report(&report).unwrap();
//! assert!(json.contains("\"totalInstalls\""));
//!
//! let table = TableFormatter::new(7).format_report(&report).unwrap();
//! assert!(table.contains("Date"));
//! ```

use prettytable::{Table, format, row};
use std::path::{Path, PathBuf};
use telstat_core::aggregation_types::{CombinedDaySummary, Report};
use telstat_core::error::Result;
use tracing::{debug, info};

/// Days shown by the terminal summary unless told otherwise
pub const DEFAULT_SUMMARY_DAYS: usize = 7;

/// Trait for report formatters
pub trait OutputFormatter {
    /// Render the whole report
    fn format_report(&self, report: &Report) -> Result<String>;
}

/// Table formatter for human-readable output
///
/// Shows the trailing `recent_days` entries of the report, newest last,
/// followed by the install totals across all releases.
pub struct TableFormatter {
    /// How many trailing days to show
    pub recent_days: usize,
}

impl TableFormatter {
    /// Create a new TableFormatter
    pub fn new(recent_days: usize) -> Self {
        Self { recent_days }
    }

    /// Format a number with thousands separators
    fn format_number(n: u64) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (count, ch) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(ch);
        }

        result.chars().rev().collect()
    }

    fn format_count(value: Option<usize>) -> String {
        value.map_or_else(|| "-".to_string(), |n| Self::format_number(n as u64))
    }

    /// Format a fraction as a percentage, `-` when unavailable
    fn format_percent(value: Option<f64>) -> String {
        value.map_or_else(|| "-".to_string(), |v| format!("{:.1}%", v * 100.0))
    }

    fn day_row(day: &CombinedDaySummary) -> prettytable::Row {
        row![
            day.date.to_string(),
            r -> Self::format_count(day.actives.today),
            r -> Self::format_count(day.actives.last7),
            r -> Self::format_count(day.actives.last30),
            r -> Self::format_number(day.installs as u64),
            r -> Self::format_percent(day.retention.day1),
            r -> Self::format_percent(day.retention.day7),
            r -> Self::format_percent(day.error_rates.today),
            r -> Self::format_percent(day.error_rates.today_latest)
        ]
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_SUMMARY_DAYS)
    }
}

impl OutputFormatter for TableFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        let mut output = String::new();

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "Date",
            b -> "Today",
            b -> "Last 7",
            b -> "Last 30",
            b -> "Installs",
            b -> "Day 1",
            b -> "Day 7",
            b -> "Error Rate",
            b -> "Latest Error Rate"
        ]);

        let skip = report.telemetry.len().saturating_sub(self.recent_days);
        for day in report.telemetry.iter().skip(skip) {
            table.add_row(Self::day_row(day));
        }
        output.push_str(&table.to_string());

        let totals = &report.total_installs;
        let mut installs = Table::new();
        installs.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        installs.set_titles(row![b -> "Releases", b -> "Windows", b -> "macOS", b -> "Linux", b -> "Total"]);
        installs.add_row(row![
            r -> Self::format_number(report.releases.len() as u64),
            r -> Self::format_number(totals.win32),
            r -> Self::format_number(totals.darwin),
            r -> Self::format_number(totals.linux),
            r -> Self::format_number(totals.total)
        ]);
        output.push('\n');
        output.push_str(&installs.to_string());

        Ok(output)
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

/// Get the appropriate formatter
pub fn get_formatter(json: bool, recent_days: usize) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter::new(recent_days))
    }
}

/// Sibling path the report is staged at before it replaces `path`
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write the report as pretty-printed JSON
///
/// The report is staged next to `path` and renamed into place, so readers
/// never observe a partially written file.
pub async fn write_report(path: &Path, report: &Report) -> Result<()> {
    let content = JsonFormatter.format_report(report)?;
    let staging = staging_path(path);

    debug!("Staging report at {}", staging.display());
    let staged = match tokio::fs::write(&staging, content.as_bytes()).await {
        Ok(()) => tokio::fs::rename(&staging, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = staged {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(e.into());
    }

    info!("Wrote {}", path.display());
    Ok(())
}
