//! Daily summarizer
//!
//! Reduces one day's session records (potentially gigabytes of log) to a
//! [`DailySummary`] of a few kilobytes: unique users, session and error
//! counts per version, a per-user usage breakdown, and the deduplicated
//! error table.
//!
//! # Examples
//!
//! ```
//! use telstat_core::types::{DailyDate, RawSessionRecord};
//! use telstat_logs::summarize_day;
//!
//! let records: Vec<RawSessionRecord> = [
//!     r#"{"userID":"a","version":"0.14.0","system":{"osPlatform":"linux"}}"#,
//!     r#"{"userID":"b","system":{"osPlatform":"win32"}}"#,
//!     r#"{"ip":"10.0.0.1"}"#,
//! ]
//! .iter()
//! .map(|line| serde_json::from_str(line).unwrap())
//! .collect();
//!
//! let date: DailyDate = "2024-01-01".parse().unwrap();
//! let summary = summarize_day(date, records);
//! assert_eq!(summary.unique_users.len(), 2);
//! assert_eq!(summary.sessions.total, 2);
//! assert_eq!(summary.usage.version["pre-0.12"], 1);
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use telstat_core::aggregation_types::{DailySummary, Sessions, UsageBreakdown};
use telstat_core::error_table::ErrorTable;
use telstat_core::types::{DailyDate, RawSessionRecord, UserId};
use telstat_core::version::PRE_0_12;
use tracing::trace;

/// Platform recorded when a report's `system` has no `osPlatform`
pub const UNKNOWN_PLATFORM: &str = "unknown";

/// Version and platform a user reported most recently on a day
#[derive(Debug, Clone)]
struct Observation {
    version: String,
    platform: String,
}

/// Accumulator for one day's records
#[derive(Debug, Default)]
struct DayAccumulator {
    unique_users: HashSet<UserId>,
    latest_by_user: HashMap<UserId, Observation>,
    sessions: Sessions,
    errors: ErrorTable,
    skipped: usize,
}

impl DayAccumulator {
    fn add_record(&mut self, record: RawSessionRecord) {
        // Filter out the rare incomplete records that carry little more than an IP
        let (Some(system), Some(user_id)) = (record.system, record.user_id) else {
            self.skipped += 1;
            return;
        };

        let version = record
            .version
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| PRE_0_12.to_string());
        let platform = system
            .os_platform
            .unwrap_or_else(|| UNKNOWN_PLATFORM.to_string());

        self.unique_users.insert(user_id.clone());
        self.latest_by_user.insert(
            user_id,
            Observation {
                version: version.clone(),
                platform: platform.clone(),
            },
        );

        let errors = record.uncaught_errors.unwrap_or_default();
        let errored = !errors.is_empty();

        // Sessions are approximated by the number of telemetry reports
        self.sessions.total += 1;
        if errored {
            self.sessions.errored += 1;
        }
        self.sessions
            .by_version
            .entry(version.clone())
            .or_default()
            .record(errored);

        for event in &errors {
            self.errors.fold(event, &platform, &version);
        }
    }

    fn usage(&self) -> UsageBreakdown {
        let mut usage = UsageBreakdown::default();
        for observation in self.latest_by_user.values() {
            bump(&mut usage.version, &observation.version);
            bump(&mut usage.platform, &observation.platform);
            bump(
                &mut usage.version_platform,
                &format!("{}-{}", observation.version, observation.platform),
            );
        }
        usage
    }

    fn into_daily_summary(self, date: DailyDate) -> DailySummary {
        if self.skipped > 0 {
            trace!("Skipped {} incomplete records for {}", self.skipped, date);
        }
        let usage = self.usage();
        DailySummary {
            date,
            unique_users: self.unique_users,
            sessions: self.sessions,
            usage,
            errors: self.errors,
        }
    }
}

fn bump(counts: &mut BTreeMap<String, u64>, key: &str) {
    *counts.entry(key.to_string()).or_default() += 1;
}

/// Summarize one day's session records
///
/// Pure function of its inputs. Usage counts are distinct users bucketed by
/// the last version and platform each user reported that day.
pub fn summarize_day<I>(date: DailyDate, records: I) -> DailySummary
where
    I: IntoIterator<Item = RawSessionRecord>,
{
    let mut accumulator = DayAccumulator::default();
    for record in records {
        accumulator.add_record(record);
    }
    accumulator.into_daily_summary(date)
}
