//! Common test utilities and helpers for telstat tests
//!
//! Builders for synthetic session reports and helpers that lay them out as
//! a telemetry directory of day files.

#![allow(dead_code)]

use serde_json::{Value, json};
use std::path::Path;
use telstat::DailyDate;
use tempfile::TempDir;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Common test platforms
pub const TEST_PLATFORMS: &[&str] = &["darwin", "linux", "win32"];

/// Common test versions, oldest first
pub const TEST_VERSIONS: &[&str] = &["0.12.0", "0.13.1", "0.14.0"];

/// Builder for one session report line
pub struct SessionRecordBuilder {
    user_id: Option<String>,
    version: Option<String>,
    platform: Option<String>,
    has_system: bool,
    errors: Vec<Value>,
}

impl SessionRecordBuilder {
    /// Create a new builder with default values
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            version: Some(TEST_VERSIONS[2].to_string()),
            platform: Some(TEST_PLATFORMS[1].to_string()),
            has_system: true,
            errors: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Report no version at all, as clients before 0.12 did
    pub fn without_version(mut self) -> Self {
        self.version = None;
        self
    }

    pub fn with_platform(mut self, platform: &str) -> Self {
        self.platform = Some(platform.to_string());
        self
    }

    /// Drop the `system` object, making the record incomplete
    pub fn without_system(mut self) -> Self {
        self.has_system = false;
        self
    }

    pub fn without_user(mut self) -> Self {
        self.user_id = None;
        self
    }

    pub fn with_error(mut self, message: &str, stack: &str) -> Self {
        self.errors.push(json!({
            "message": message,
            "stack": stack,
            "process": "main",
        }));
        self
    }

    /// Build as a single JSON line
    pub fn to_json_line(self) -> String {
        let mut record = json!({ "ip": "10.0.0.1" });
        if let Some(user_id) = self.user_id {
            record["userID"] = json!(user_id);
        }
        if let Some(version) = self.version {
            record["version"] = json!(version);
        }
        if self.has_system {
            record["system"] = match self.platform {
                Some(platform) => json!({ "osPlatform": platform }),
                None => json!({}),
            };
        }
        if !self.errors.is_empty() {
            record["uncaughtErrors"] = Value::Array(self.errors);
        }
        record.to_string()
    }
}

/// Plain record lines for each of `users`
pub fn users(users: &[&str]) -> Vec<String> {
    users
        .iter()
        .map(|user| SessionRecordBuilder::new(user).to_json_line())
        .collect()
}

/// Write one day file
pub async fn write_day(dir: &Path, date: &str, lines: &[String]) {
    let path = dir.join(format!("{date}.log"));
    let mut file = fs::File::create(&path).await.unwrap();
    for line in lines {
        file.write_all(line.as_bytes()).await.unwrap();
        file.write_all(b"\n").await.unwrap();
    }
}

/// Create a telemetry directory with one file per consecutive day
pub async fn create_test_log_dir(start: &str, days: Vec<Vec<String>>) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let mut date: DailyDate = start.parse().unwrap();
    for lines in days {
        write_day(temp_dir.path(), &date.to_string(), &lines).await;
        date = date.succ();
    }
    temp_dir
}
