//! Release sources for the report
//!
//! The default source asks the GitHub releases API for the app's release
//! history and sums asset download counts per desktop platform. An offline
//! source reads a previously saved release list from disk instead.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use telstat_core::error::{Result, TelstatError};
use telstat_core::types::{InstallCounts, ReleaseInfo};
use tracing::{debug, info};

/// GitHub REST API root
const GITHUB_API_URL: &str = "https://api.github.com";

/// GitHub rejects requests without a user agent
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_11_6) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/52.0.2743.116 Safari/537.36";

/// Anything that can supply the release list
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetch releases, newest first as the host orders them
    async fn fetch_releases(&self) -> Result<Vec<ReleaseInfo>>;
}

/// Desktop platform an asset installs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetPlatform {
    Win32,
    Darwin,
    Linux,
}

/// Platform of a release asset, from its file name
pub fn classify_asset(name: &str) -> Option<AssetPlatform> {
    if name.ends_with(".dmg") {
        Some(AssetPlatform::Darwin)
    } else if name.ends_with(".exe") {
        Some(AssetPlatform::Win32)
    } else if name.ends_with(".deb")
        || name.ends_with("linux-ia32.zip")
        || name.ends_with("linux-x64.zip")
    {
        Some(AssetPlatform::Linux)
    } else {
        None
    }
}

/// Field-wise sum of the install counts of all releases
pub fn total_installs(releases: &[ReleaseInfo]) -> InstallCounts {
    let mut total = InstallCounts::default();
    for release in releases {
        total += release.installs;
    }
    total
}

/// Release as returned by the GitHub API
#[derive(Debug, Clone, Deserialize)]
pub struct GithubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub assets: Vec<GithubAsset>,
}

/// Release asset as returned by the GitHub API
#[derive(Debug, Clone, Deserialize)]
pub struct GithubAsset {
    pub name: String,
    #[serde(default)]
    pub download_count: u64,
}

impl From<GithubRelease> for ReleaseInfo {
    fn from(release: GithubRelease) -> Self {
        let (mut win32, mut darwin, mut linux) = (0, 0, 0);
        for asset in &release.assets {
            match classify_asset(&asset.name) {
                Some(AssetPlatform::Win32) => win32 += asset.download_count,
                Some(AssetPlatform::Darwin) => darwin += asset.download_count,
                Some(AssetPlatform::Linux) => linux += asset.download_count,
                None => debug!("Not counting asset {}", asset.name),
            }
        }

        ReleaseInfo {
            tag_name: release.tag_name,
            published_at: release.published_at.unwrap_or_default(),
            installs: InstallCounts::new(win32, darwin, linux),
        }
    }
}

/// Fetches releases of a GitHub repository
pub struct GithubReleaseFetcher {
    /// Releases endpoint
    url: String,
    /// HTTP client
    client: reqwest::Client,
}

impl GithubReleaseFetcher {
    /// Create a fetcher for `owner/name`
    pub fn new(repo: &str) -> Result<Self> {
        if repo.split('/').filter(|part| !part.is_empty()).count() != 2 {
            return Err(TelstatError::Config(format!(
                "Release repository must look like owner/name, got {repo:?}"
            )));
        }

        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            url: format!("{GITHUB_API_URL}/repos/{repo}/releases"),
            client,
        })
    }

    /// Endpoint queried by this fetcher
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ReleaseSource for GithubReleaseFetcher {
    async fn fetch_releases(&self) -> Result<Vec<ReleaseInfo>> {
        info!("Fetching {}", self.url);
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TelstatError::Upstream(format!(
                "{} answered {}",
                self.url, status
            )));
        }

        let data: Vec<GithubRelease> = response.json().await?;
        info!("Got {} releases", data.len());
        Ok(data.into_iter().map(ReleaseInfo::from).collect())
    }
}

/// Reads a saved release list (the report's `releases` array) from disk
pub struct FileReleaseSource {
    path: PathBuf,
}

impl FileReleaseSource {
    /// Create a source for a JSON file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ReleaseSource for FileReleaseSource {
    async fn fetch_releases(&self) -> Result<Vec<ReleaseInfo>> {
        info!("Using release list from {}", self.path.display());
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| TelstatError::read(&self.path, e))?;
        let releases: Vec<ReleaseInfo> = serde_json::from_str(&content).map_err(|e| {
            TelstatError::Upstream(format!("{}: {e}", self.path.display()))
        })?;
        Ok(releases)
    }
}

/// Supplies no releases at all
pub struct NoReleases;

#[async_trait]
impl ReleaseSource for NoReleases {
    async fn fetch_releases(&self) -> Result<Vec<ReleaseInfo>> {
        Ok(Vec::new())
    }
}
