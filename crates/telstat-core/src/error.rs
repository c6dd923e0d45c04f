//! Error types for telstat
//!
//! This module defines the error types used throughout the telstat crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! Every variant is fatal for a run: the report is all-or-nothing, so callers
//! propagate with `?` and never write partial output.
//!
//! # Example
//!
//! ```
//! use telstat_core::error::{TelstatError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to TelstatError
//!     let _file = std::fs::read_to_string("nonexistent.txt")?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::types::DailyDate;

/// Main error type for telstat operations
#[derive(Error, Debug)]
pub enum TelstatError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A log directory or day file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        /// The path that could not be read
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// A line of a day file is not a valid session record
    #[error("Parse error in {file} at line {line}: {error}")]
    Parse {
        /// The file that caused the error
        file: PathBuf,
        /// 1-based line number
        line: usize,
        /// The error message
        error: String,
    },

    /// The day sequence is not consecutive
    #[error("Missing telemetry before {date} (previous day is {previous})")]
    Gap {
        /// First date after the hole
        date: DailyDate,
        /// Date of the preceding summary
        previous: DailyDate,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Network error talking to the release host
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The release collaborator answered, but not usefully
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TelstatError {
    /// Build a read error for a path
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Whether the failure came from the release collaborator
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Upstream(_))
    }
}

/// Convenience type alias for Results in telstat
pub type Result<T> = std::result::Result<T, TelstatError>;
