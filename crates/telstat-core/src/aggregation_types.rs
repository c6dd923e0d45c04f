//! Aggregation data types for telstat
//!
//! Pure data structures for per-day summaries and the final report.
//! These types have no dependencies on the log loader or the release fetcher.

use crate::error_table::ErrorTable;
use crate::types::{DailyDate, InstallCounts, ReleaseInfo, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::ops::AddAssign;

/// Session counts for a day or a version bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounts {
    /// Telemetry reports received
    pub total: u64,
    /// Reports that carried at least one uncaught error
    pub errored: u64,
}

impl SessionCounts {
    /// Count one session
    pub fn record(&mut self, errored: bool) {
        self.total += 1;
        if errored {
            self.errored += 1;
        }
    }
}

impl AddAssign for SessionCounts {
    fn add_assign(&mut self, other: Self) {
        self.total += other.total;
        self.errored += other.errored;
    }
}

/// Session counts for a day, overall and per app version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sessions {
    pub total: u64,
    pub errored: u64,
    #[serde(rename = "byVersion")]
    pub by_version: BTreeMap<String, SessionCounts>,
}

impl Sessions {
    /// Overall counts without the version breakdown
    pub fn counts(&self) -> SessionCounts {
        SessionCounts {
            total: self.total,
            errored: self.errored,
        }
    }

    /// Counts for one version, zero if the version was not seen
    pub fn for_version(&self, version: &str) -> SessionCounts {
        self.by_version.get(version).copied().unwrap_or_default()
    }
}

/// Distinct users per app version, platform, and version-platform pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageBreakdown {
    pub version: BTreeMap<String, u64>,
    pub platform: BTreeMap<String, u64>,
    #[serde(rename = "versionPlatform")]
    pub version_platform: BTreeMap<String, u64>,
}

/// A deduplicated uncaught error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// First 30 characters of the message
    pub key: String,
    /// Message from the highest version seen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Stack from the highest version seen
    pub stack: String,
    /// Number of events folded into this record
    pub count: u64,
    /// Versions that raised it, ascending
    pub versions: Vec<String>,
    pub platforms: Vec<String>,
    pub processes: Vec<String>,
}

/// Summary of one day's telemetry log
///
/// Produced once by the summarizer and only read afterwards.
#[derive(Debug, Clone)]
pub struct DailySummary {
    pub date: DailyDate,
    pub unique_users: HashSet<UserId>,
    pub sessions: Sessions,
    pub usage: UsageBreakdown,
    pub errors: ErrorTable,
}

/// Distinct active users over trailing windows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actives {
    pub today: Option<usize>,
    pub last7: Option<usize>,
    pub last30: Option<usize>,
}

/// Fraction of a new-user cohort still active
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Retention {
    pub day1: Option<f64>,
    pub day7: Option<f64>,
    pub day28: Option<f64>,
    pub day30to60: Option<f64>,
}

/// Fraction of sessions that reported an error
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorRates {
    pub last7: Option<f64>,
    pub today: Option<f64>,
    #[serde(rename = "today-latest")]
    pub today_latest: Option<f64>,
    #[serde(rename = "last7-latest")]
    pub last7_latest: Option<f64>,
}

/// Final per-day entry of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedDaySummary {
    pub date: DailyDate,
    pub actives: Actives,
    /// Users seen for the first time on this day
    pub installs: usize,
    pub retention: Retention,
    pub usage: UsageBreakdown,
    #[serde(rename = "errorRates")]
    pub error_rates: ErrorRates,
    /// The day's errors, most frequent first
    pub errors: Vec<ErrorRecord>,
}

/// The report artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub telemetry: Vec<CombinedDaySummary>,
    pub releases: Vec<ReleaseInfo>,
    #[serde(rename = "totalInstalls")]
    pub total_installs: InstallCounts,
}
