//! Release history for telstat
//!
//! This crate supplies the release list that accompanies the telemetry
//! series in the report: tag, publish date, and download counts per desktop
//! platform. The counts are opaque to the aggregation engine beyond being
//! summed into install totals.

pub mod release_fetcher;

pub use release_fetcher::{
    FileReleaseSource, GithubReleaseFetcher, NoReleases, ReleaseSource, total_installs,
};
