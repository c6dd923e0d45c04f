//! Per-day deduplication of uncaught errors
//!
//! Error events are folded into [`ErrorRecord`]s keyed by the first 30
//! characters of their message. Two different messages sharing that prefix
//! land in the same record; that approximation is accepted.
//!
//! Each record keeps the message and stack reported by the highest app
//! version seen for it, so the report shows the freshest stack trace.
//!
//! # Examples
//!
//! ```
//! use telstat_core::error_table::ErrorTable;
//! use telstat_core::types::ErrorEvent;
//!
//! let mut table = ErrorTable::new();
//! let event = ErrorEvent {
//!     message: Some("Cannot read property 'x' of undefined".to_string()),
//!     stack: Some("at render (index.js:1)".to_string()),
//!     process: Some("main".to_string()),
//!     version: None,
//! };
//! table.fold(&event, "darwin", "0.14.0");
//! table.fold(&event, "linux", "0.14.0");
//!
//! let record = table.get("Cannot read property 'x' of un").unwrap();
//! assert_eq!(record.count, 2);
//! assert_eq!(record.platforms, vec!["darwin", "linux"]);
//! ```

use crate::aggregation_types::ErrorRecord;
use crate::types::ErrorEvent;
use crate::version::{PRE_0_12, compare_versions};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Number of message characters that identify an error
pub const ERROR_KEY_LEN: usize = 30;

/// Key used for events without a message
pub const MISSING_MESSAGE_KEY: &str = "<missing error message>";

/// Stack fragment left by packaged builds older than 0.12, which neither
/// reported a version nor redacted their stack traces
pub const PRE_0_12_STACK_MARKER: &str = "app.asar";

/// Process name recorded when an event does not say which process failed
pub const UNKNOWN_PROCESS: &str = "unknown";

/// Dedup key for an error message
pub fn error_key(message: Option<&str>) -> String {
    match message {
        Some(message) => message.chars().take(ERROR_KEY_LEN).collect(),
        None => MISSING_MESSAGE_KEY.to_string(),
    }
}

/// The version an error event should be attributed to
///
/// Per-error versions were added in 0.13. Before that the session version
/// is the best guess, except for pre-0.12 packaged builds, which are
/// recognised by their unredacted stack.
pub fn resolve_error_version(event: &ErrorEvent, session_version: &str) -> String {
    if let Some(version) = event.version.as_deref().filter(|v| !v.is_empty()) {
        return version.to_string();
    }
    let stack = event.stack.as_deref().unwrap_or_default();
    if stack.contains(PRE_0_12_STACK_MARKER) {
        PRE_0_12.to_string()
    } else {
        session_version.to_string()
    }
}

/// Mutable table of one day's deduplicated errors
///
/// Records are kept in first-seen order; the index maps keys to positions.
#[derive(Debug, Clone, Default)]
pub struct ErrorTable {
    records: Vec<ErrorRecord>,
    index: HashMap<String, usize>,
}

impl ErrorTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one error event into the table
    pub fn fold(&mut self, event: &ErrorEvent, platform: &str, session_version: &str) {
        let key = error_key(event.message.as_deref());
        let err_version = resolve_error_version(event, session_version);
        let process = event.process.as_deref().unwrap_or(UNKNOWN_PROCESS);
        let stack = event.stack.clone().unwrap_or_default();

        if let Some(&pos) = self.index.get(&key) {
            let record = &mut self.records[pos];
            record.count += 1;
            insert_sorted(&mut record.platforms, platform, |a, b| a.cmp(b));
            insert_sorted(&mut record.processes, process, |a, b| a.cmp(b));
            insert_sorted(&mut record.versions, &err_version, compare_versions);

            if record.versions.last() == Some(&err_version) {
                record.message = event.message.clone();
                record.stack = stack;
            }
            return;
        }

        self.index.insert(key.clone(), self.records.len());
        self.records.push(ErrorRecord {
            key,
            message: event.message.clone(),
            stack,
            count: 1,
            versions: vec![err_version],
            platforms: vec![platform.to_string()],
            processes: vec![process.to_string()],
        });
    }

    /// Look up a record by key
    pub fn get(&self, key: &str) -> Option<&ErrorRecord> {
        self.index.get(key).map(|&pos| &self.records[pos])
    }

    /// Number of distinct errors
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no error was folded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.records.iter()
    }

    /// Total events folded across all records
    pub fn total_events(&self) -> u64 {
        self.records.iter().map(|r| r.count).sum()
    }

    /// Records ordered by count, most frequent first
    ///
    /// Ties keep first-seen order.
    pub fn sorted_by_count(&self) -> Vec<ErrorRecord> {
        let mut records = self.records.clone();
        records.sort_by(|a, b| b.count.cmp(&a.count));
        records
    }
}

/// Insert `value` into an ordered set unless it is already present
fn insert_sorted<F>(set: &mut Vec<String>, value: &str, cmp: F)
where
    F: Fn(&str, &str) -> Ordering,
{
    if let Err(pos) = set.binary_search_by(|probe| cmp(probe, value)) {
        set.insert(pos, value.to_string());
    }
}
