//! Core domain types for telstat
//!
//! This module contains the strongly-typed identifiers and the raw record
//! shapes read from the telemetry logs and the release host.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

use crate::error::TelstatError;

/// Strongly-typed user identifier
///
/// # Examples
/// ```
/// use telstat_core::types::UserId;
///
/// let user = UserId::new("a1b2c3");
/// assert_eq!(user.as_str(), "a1b2c3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a new UserId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Calendar day of a telemetry log
///
/// Serializes as `YYYY-MM-DD`.
///
/// # Examples
/// ```
/// use telstat_core::types::DailyDate;
///
/// let day: DailyDate = "2024-02-28".parse().unwrap();
/// assert_eq!(day.succ().to_string(), "2024-02-29");
/// assert_eq!(day.format("%B %d, %Y"), "February 28, 2024");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DailyDate(NaiveDate);

impl DailyDate {
    /// Create a new DailyDate
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The following calendar day
    pub fn succ(&self) -> Self {
        Self(self.0 + chrono::Duration::days(1))
    }

    /// Signed number of days from `earlier` to `self`
    pub fn days_since(&self, earlier: &DailyDate) -> i64 {
        (self.0 - earlier.0).num_days()
    }

    /// Format with a chrono format string
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

impl fmt::Display for DailyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DailyDate {
    type Err = TelstatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| TelstatError::InvalidDate(s.to_string()))
    }
}

/// Host system information attached to a session report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system platform (`win32`, `darwin`, `linux`, ...)
    #[serde(rename = "osPlatform", default)]
    pub os_platform: Option<String>,
}

/// A single uncaught error reported by a client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    /// Error message, missing on some very old clients
    #[serde(default)]
    pub message: Option<String>,
    /// Stack trace
    #[serde(default)]
    pub stack: Option<String>,
    /// Process that raised the error (`main`, `webtorrent`, ...)
    #[serde(default)]
    pub process: Option<String>,
    /// App version that raised the error, absent before 0.13
    #[serde(default)]
    pub version: Option<String>,
}

/// One line of a day's telemetry log: one client session report
///
/// Unknown fields are ignored. Records without `system` are incomplete and
/// are dropped by the summarizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSessionRecord {
    /// Anonymous user identifier
    #[serde(rename = "userID", default)]
    pub user_id: Option<UserId>,
    /// App version, absent before 0.12
    #[serde(default)]
    pub version: Option<String>,
    /// Host system information
    #[serde(default)]
    pub system: Option<SystemInfo>,
    /// Uncaught errors seen during the session
    #[serde(rename = "uncaughtErrors", default)]
    pub uncaught_errors: Option<Vec<ErrorEvent>>,
}

/// Download counts per desktop platform
///
/// # Examples
/// ```
/// use telstat_core::types::InstallCounts;
///
/// let mut total = InstallCounts::default();
/// total += InstallCounts::new(10, 5, 2);
/// total += InstallCounts::new(1, 1, 1);
/// assert_eq!(total.total, 20);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallCounts {
    pub win32: u64,
    pub darwin: u64,
    pub linux: u64,
    pub total: u64,
}

impl InstallCounts {
    /// Create counts from the per-platform values, computing the total
    pub fn new(win32: u64, darwin: u64, linux: u64) -> Self {
        Self {
            win32,
            darwin,
            linux,
            total: win32 + darwin + linux,
        }
    }
}

impl AddAssign for InstallCounts {
    fn add_assign(&mut self, other: Self) {
        self.win32 += other.win32;
        self.darwin += other.darwin;
        self.linux += other.linux;
        self.total += other.total;
    }
}

/// A published release and its download counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    pub tag_name: String,
    pub published_at: String,
    pub installs: InstallCounts,
}
