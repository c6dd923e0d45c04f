//! Report pipeline
//!
//! Wires the stages together: day files are summarized in parallel while
//! the release list is fetched, then the summaries are combined across days
//! and the installs totalled. Either branch failing fails the whole run, so
//! a partial report is never produced.

use crate::aggregation::Aggregator;
use futures::future::try_join;
use telstat_core::aggregation_types::Report;
use telstat_core::error::Result;
use telstat_logs::DataLoader;
use telstat_releases::{ReleaseSource, total_installs};
use tracing::info;

/// Produces a [`Report`] from a log directory and a release source
pub struct Pipeline {
    loader: DataLoader,
    releases: Box<dyn ReleaseSource>,
}

impl Pipeline {
    /// Create a pipeline
    pub fn new(loader: DataLoader, releases: Box<dyn ReleaseSource>) -> Self {
        Self { loader, releases }
    }

    /// Run every stage and return the finished report
    pub async fn run(&self) -> Result<Report> {
        let (days, releases) = try_join(
            self.loader.load_daily_summaries(),
            self.releases.fetch_releases(),
        )
        .await?;

        info!("Combining {} daily summaries", days.len());
        let telemetry = Aggregator::combine(&days)?;
        let total_installs = total_installs(&releases);

        Ok(Report {
            telemetry,
            releases,
            total_installs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use telstat_core::error::TelstatError;
    use telstat_core::types::{InstallCounts, ReleaseInfo};
    use telstat_releases::NoReleases;
    use tempfile::TempDir;

    const RECORD: &str = r#"{"userID":"a","version":"0.14.0","system":{"osPlatform":"linux"}}"#;

    struct FixedReleases(Vec<ReleaseInfo>);

    #[async_trait]
    impl ReleaseSource for FixedReleases {
        async fn fetch_releases(&self) -> Result<Vec<ReleaseInfo>> {
            Ok(self.0.clone())
        }
    }

    struct FailingReleases;

    #[async_trait]
    impl ReleaseSource for FailingReleases {
        async fn fetch_releases(&self) -> Result<Vec<ReleaseInfo>> {
            Err(TelstatError::Upstream("rate limited".to_string()))
        }
    }

    #[tokio::test]
    async fn test_run_builds_report() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("2024-01-01.log"), RECORD).unwrap();
        std::fs::write(temp_dir.path().join("2024-01-02.log"), RECORD).unwrap();

        let releases = vec![ReleaseInfo {
            tag_name: "v0.14.0".to_string(),
            published_at: "2016-09-03T00:00:00Z".to_string(),
            installs: InstallCounts::new(3, 2, 1),
        }];
        let pipeline = Pipeline::new(
            DataLoader::new(temp_dir.path()),
            Box::new(FixedReleases(releases)),
        );

        let report = pipeline.run().await.unwrap();
        assert_eq!(report.telemetry.len(), 2);
        assert_eq!(report.telemetry[0].installs, 1);
        assert_eq!(report.telemetry[1].installs, 0);
        assert_eq!(report.total_installs.total, 6);
    }

    #[tokio::test]
    async fn test_release_failure_fails_the_run() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("2024-01-01.log"), RECORD).unwrap();

        let pipeline = Pipeline::new(DataLoader::new(temp_dir.path()), Box::new(FailingReleases));
        let err = pipeline.run().await.unwrap_err();
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn test_empty_directory_gives_empty_report() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = Pipeline::new(DataLoader::new(temp_dir.path()), Box::new(NoReleases));

        let report = pipeline.run().await.unwrap();
        assert!(report.telemetry.is_empty());
        assert!(report.releases.is_empty());
        assert_eq!(report.total_installs, InstallCounts::default());
    }
}
