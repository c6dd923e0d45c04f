//! CLI interface for telstat
//!
//! telstat has a single action: summarize the telemetry directory, combine
//! the days, fetch the release list, and write the report. Flags only choose
//! where data comes from and goes to.
//!
//! # Example
//!
//! ```bash
//! # Summarize logs/telemetry and write logs/telemetry/summary.json
//! telstat
//!
//! # Work offline from a saved release list and show the last two weeks
//! telstat --log-dir /srv/telemetry --releases-file releases.json --summary --summary-days 14
//! ```

use crate::output::DEFAULT_SUMMARY_DAYS;
use clap::Parser;
use std::path::PathBuf;
use telstat_core::error::{Result, TelstatError};

/// Telemetry directory used when none is given
pub const DEFAULT_LOG_DIR: &str = "logs/telemetry";

/// Report file name inside the telemetry directory
pub const DEFAULT_REPORT_NAME: &str = "summary.json";

/// Repository whose releases are counted by default
pub const DEFAULT_RELEASE_REPO: &str = "webtorrent/webtorrent-desktop";

/// Summarize daily telemetry logs into an analytics report
#[derive(Parser, Debug, Clone)]
#[command(name = "telstat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding one YYYY-MM-DD.log file per day
    #[arg(long, env = "TELSTAT_LOG_DIR", default_value = DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,

    /// Report path (default: <LOG_DIR>/summary.json)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// GitHub repository (owner/name) whose releases are counted
    #[arg(long, env = "TELSTAT_RELEASE_REPO", default_value = DEFAULT_RELEASE_REPO)]
    pub repo: String,

    /// Read releases from a saved JSON list instead of GitHub
    #[arg(long, conflicts_with = "skip_releases")]
    pub releases_file: Option<PathBuf>,

    /// Do not fetch releases; install totals will be zero
    #[arg(long)]
    pub skip_releases: bool,

    /// Print a digest of the most recent days after writing the report
    #[arg(long)]
    pub summary: bool,

    /// Number of days shown by --summary
    #[arg(long, default_value_t = DEFAULT_SUMMARY_DAYS)]
    pub summary_days: usize,

    /// Print the digest as JSON instead of a table
    #[arg(long, requires = "summary")]
    pub json: bool,

    /// Only show warnings and errors
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Where the release list comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseMode {
    /// The GitHub releases API for `owner/name`
    Github(String),
    /// A saved release list on disk
    File(PathBuf),
    /// No releases
    Skip,
}

impl Cli {
    /// Report path, defaulting to `summary.json` in the telemetry directory
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.log_dir.join(DEFAULT_REPORT_NAME))
    }

    /// Release source selected by the flags
    pub fn release_mode(&self) -> ReleaseMode {
        if self.skip_releases {
            ReleaseMode::Skip
        } else if let Some(path) = &self.releases_file {
            ReleaseMode::File(path.clone())
        } else {
            ReleaseMode::Github(self.repo.clone())
        }
    }

    /// Reject flag combinations clap cannot express
    pub fn validate(&self) -> Result<()> {
        if self.summary && self.summary_days == 0 {
            return Err(TelstatError::Config(
                "--summary-days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
