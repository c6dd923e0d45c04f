//! Core types, errors, and error deduplication for telstat
//!
//! This crate provides the foundational types shared by the log summarizer,
//! the release fetcher, and the cross-day aggregator. It performs no I/O.

pub mod aggregation_types;
pub mod error;
pub mod error_table;
pub mod types;
pub mod version;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{Result, TelstatError};
pub use error_table::ErrorTable;
pub use types::{DailyDate, ErrorEvent, InstallCounts, RawSessionRecord, ReleaseInfo, UserId};
