//! Telemetry log loading for telstat
//!
//! This crate finds the date-stamped day files in a telemetry directory,
//! parses their newline-delimited session records, and reduces each day to a
//! [`DailySummary`](telstat_core::aggregation_types::DailySummary).

pub mod data_loader;
pub mod summarizer;

pub use data_loader::{DataLoader, LogFile};
pub use summarizer::summarize_day;
