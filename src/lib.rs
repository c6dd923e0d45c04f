//! telstat - Summarize daily application telemetry into an analytics report
//!
//! This library provides functionality to:
//! - Summarize one day's session reports into a compact daily summary
//! - Combine daily summaries into actives, installs, retention, and error rates
//! - Count installs per platform from the app's GitHub releases
//! - Write the report as JSON and print a terminal digest
//!
//! # Examples
//!
//! ```no_run
//! use telstat::pipeline::Pipeline;
//! use telstat::output::write_report;
//! use telstat_logs::DataLoader;
//! use telstat_releases::GithubReleaseFetcher;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> telstat::Result<()> {
//!     let loader = DataLoader::new("logs/telemetry");
//!     let releases = GithubReleaseFetcher::new("webtorrent/webtorrent-desktop")?;
//!     let report = Pipeline::new(loader, Box::new(releases)).run().await?;
//!
//!     write_report(Path::new("logs/telemetry/summary.json"), &report).await?;
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod cli;
pub mod output;
pub mod pipeline;

// Re-export commonly used types
pub use telstat_core::aggregation_types::{CombinedDaySummary, DailySummary, Report};
pub use telstat_core::error::{Result, TelstatError};
pub use telstat_core::types::{DailyDate, InstallCounts, ReleaseInfo, UserId};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
