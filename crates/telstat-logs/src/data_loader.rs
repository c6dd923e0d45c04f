//! Data loader for date-stamped telemetry logs
//!
//! The telemetry directory holds one file per UTC day, named
//! `YYYY-MM-DD.log`, each containing one JSON session record per line.
//! Other files in the directory (such as a previous `summary.json`) are
//! ignored.
//!
//! Day files are independent, so they are read and summarized in parallel
//! on the Rayon pool. The first unreadable file or malformed line aborts the
//! whole load: a day that cannot be summarized completely would skew every
//! retention figure that looks back at it.
//!
//! # Examples
//!
//! ```no_run
//! use telstat_logs::DataLoader;
//!
//! # async fn example() -> telstat_core::Result<()> {
//! let loader = DataLoader::new("logs/telemetry");
//! let days = loader.load_daily_summaries().await?;
//! for day in &days {
//!     println!("{}: {} users", day.date, day.unique_users.len());
//! }
//! # Ok(())
//! # }
//! ```

use crate::summarizer::summarize_day;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use telstat_core::aggregation_types::DailySummary;
use telstat_core::error::{Result, TelstatError};
use telstat_core::types::{DailyDate, RawSessionRecord};
use tracing::{debug, info, trace};
use walkdir::WalkDir;

/// Suffix of every day file
pub const LOG_FILE_SUFFIX: &str = ".log";

/// Length of the `YYYY-MM-DD` prefix
const DATE_PREFIX_LEN: usize = 10;

/// A day file and the date parsed from its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub date: DailyDate,
    pub path: PathBuf,
}

impl LogFile {
    /// Recognise a day file by its name
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let date = parse_log_file_name(name)?;
        Some(Self {
            date,
            path: path.to_path_buf(),
        })
    }
}

/// Parse the date out of a strict `YYYY-MM-DD.log` file name
pub fn parse_log_file_name(name: &str) -> Option<DailyDate> {
    let prefix = name.strip_suffix(LOG_FILE_SUFFIX)?;
    if prefix.len() != DATE_PREFIX_LEN {
        return None;
    }
    let shaped = prefix.bytes().enumerate().all(|(i, b)| match i {
        4 | 7 => b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !shaped {
        return None;
    }
    prefix.parse().ok()
}

/// Parse newline-delimited session records
///
/// Only the file's final line terminator is ignored. Every other line,
/// blank ones included, must be a session record: an empty or truncated day
/// would otherwise pass for a quiet one.
pub fn parse_records(file: &Path, content: &str) -> Result<Vec<RawSessionRecord>> {
    let body = content
        .strip_suffix('\n')
        .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
        .unwrap_or(content);

    body.split('\n')
        .enumerate()
        .map(|(index, line)| {
            serde_json::from_str::<RawSessionRecord>(line).map_err(|e| TelstatError::Parse {
                file: file.to_path_buf(),
                line: index + 1,
                error: e.to_string(),
            })
        })
        .collect()
}

/// Data loader for a telemetry log directory
pub struct DataLoader {
    /// Directory holding the day files
    log_dir: PathBuf,
    /// Whether to show a progress bar
    show_progress: bool,
}

impl DataLoader {
    /// Create a loader for a telemetry directory
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            show_progress: false,
        }
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Find the day files, ordered by the date in their names
    pub async fn find_log_files(&self) -> Result<Vec<LogFile>> {
        let dir = self.log_dir.clone();
        let files = tokio::task::spawn_blocking(move || Self::scan_log_dir(&dir))
            .await
            .map_err(|e| TelstatError::Io(std::io::Error::other(e.to_string())))??;

        info!("Found {} telemetry log files", files.len());
        Ok(files)
    }

    fn scan_log_dir(dir: &Path) -> Result<Vec<LogFile>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                TelstatError::read(path, e.into())
            })?;
            if entry.file_type().is_dir() {
                continue;
            }
            match LogFile::from_path(entry.path()) {
                Some(log_file) => files.push(log_file),
                None => trace!("Ignoring {}", entry.path().display()),
            }
        }

        // Sort on the parsed date rather than the file name
        files.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(files)
    }

    /// Read, parse, and summarize a single day file
    pub fn summarize_file(log_file: &LogFile) -> Result<DailySummary> {
        let content = std::fs::read_to_string(&log_file.path)
            .map_err(|e| TelstatError::read(&log_file.path, e))?;
        let records = parse_records(&log_file.path, &content)?;
        info!(
            "Read {} rows from {}",
            records.len(),
            log_file.path.display()
        );
        Ok(summarize_day(log_file.date, records))
    }

    /// Summarize every day file in parallel
    ///
    /// The result is sorted by date. Completion order of the parallel stage
    /// is not, so the sort is required before cross-day aggregation.
    pub async fn load_daily_summaries(&self) -> Result<Vec<DailySummary>> {
        let files = self.find_log_files().await?;
        let num_files = files.len();
        info!("Summarizing {} telemetry log files", num_files);
        if num_files == 0 {
            return Ok(Vec::new());
        }

        let progress = if self.show_progress {
            let pb = ProgressBar::new(num_files as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} files")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb.set_message("Summarizing telemetry");
            Some(Arc::new(pb))
        } else {
            None
        };

        let progress_clone = progress.clone();
        let mut summaries = tokio::task::spawn_blocking(move || {
            files
                .par_iter()
                .map(|log_file| {
                    let result = Self::summarize_file(log_file);
                    if let Some(ref pb) = progress_clone {
                        pb.inc(1);
                    }
                    result
                })
                .collect::<Result<Vec<_>>>()
        })
        .await
        .map_err(|e| TelstatError::Io(std::io::Error::other(e.to_string())))??;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        summaries.sort_by_key(|summary| summary.date);
        debug!("Summarized {} days", summaries.len());
        Ok(summaries)
    }
}
