//! App version ordering
//!
//! Clients older than 0.12 did not report a version at all; their sessions
//! are bucketed under [`PRE_0_12`], which sorts before every real version.
//! Everything else is ordered as a semantic version. Strings that do not
//! parse as one sort between the two groups, lexically among themselves.

use semver::Version;
use std::cmp::Ordering;

/// Bucket for sessions and errors from clients that predate version reporting
pub const PRE_0_12: &str = "pre-0.12";

/// Lowest version considered when looking for the latest release of a day
pub const LATEST_VERSION_FLOOR: Version = Version::new(0, 12, 0);

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum VersionKey<'a> {
    Pre,
    Unparsed(&'a str),
    Semver(Version),
}

impl<'a> VersionKey<'a> {
    fn of(raw: &'a str) -> Self {
        if raw == PRE_0_12 {
            return Self::Pre;
        }
        match parse_version(raw) {
            Some(version) => Self::Semver(version),
            None => Self::Unparsed(raw),
        }
    }
}

/// Parse a version string, tolerating a leading `v`
pub fn parse_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(trimmed).ok()
}

/// Total order over version strings
///
/// # Examples
/// ```
/// use std::cmp::Ordering;
/// use telstat_core::version::compare_versions;
///
/// assert_eq!(compare_versions("pre-0.12", "0.12.0"), Ordering::Less);
/// assert_eq!(compare_versions("0.9.0", "0.10.0"), Ordering::Less);
/// assert_eq!(compare_versions("0.14.0", "0.14.0"), Ordering::Equal);
/// ```
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    // Raw tie-break keeps the order total for equal semvers spelled differently
    VersionKey::of(a)
        .cmp(&VersionKey::of(b))
        .then_with(|| a.cmp(b))
}

/// The highest released version among `versions`, as spelled in the input
///
/// `pre-0.12` and unparseable strings are ignored. Returns the floor
/// (`0.12.0`) when nothing beats it.
pub fn latest_version<'a>(versions: impl IntoIterator<Item = &'a str>) -> String {
    let floor = LATEST_VERSION_FLOOR;
    let mut latest: Option<(Version, &str)> = None;
    for raw in versions {
        if raw == PRE_0_12 {
            continue;
        }
        let Some(version) = parse_version(raw) else {
            continue;
        };
        let current = latest.as_ref().map_or(&floor, |(v, _)| v);
        if version > *current {
            latest = Some((version, raw));
        }
    }
    latest.map_or_else(|| floor.to_string(), |(_, raw)| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pre_sorts_first() {
        assert_eq!(compare_versions(PRE_0_12, "0.0.1"), Ordering::Less);
        assert_eq!(compare_versions("0.0.1", PRE_0_12), Ordering::Greater);
        assert_eq!(compare_versions(PRE_0_12, PRE_0_12), Ordering::Equal);
    }

    #[test]
    fn test_semver_not_lexical() {
        let mut versions = vec!["0.10.0", "0.9.1", "0.13.1", PRE_0_12, "0.13.0"];
        versions.sort_by(|a, b| compare_versions(a, b));
        assert_eq!(versions, vec![PRE_0_12, "0.9.1", "0.10.0", "0.13.0", "0.13.1"]);
    }

    #[test]
    fn test_unparsed_between_pre_and_semver() {
        let mut versions = vec!["0.1.0", "dev", PRE_0_12, "beta"];
        versions.sort_by(|a, b| compare_versions(a, b));
        assert_eq!(versions, vec![PRE_0_12, "beta", "dev", "0.1.0"]);
    }

    #[test]
    fn test_leading_v_is_accepted() {
        assert_eq!(parse_version("v0.14.0"), Some(Version::new(0, 14, 0)));
        assert_eq!(compare_versions("v0.14.0", "0.13.9"), Ordering::Greater);
    }

    #[test]
    fn test_latest_version_floor() {
        assert_eq!(latest_version(Vec::<&str>::new()), "0.12.0");
        assert_eq!(latest_version(vec![PRE_0_12, "0.11.0"]), "0.12.0");
    }

    #[test]
    fn test_latest_version_must_beat_floor() {
        // The floor itself never replaces the default spelling
        assert_eq!(latest_version(vec!["0.12.0"]), "0.12.0");
        assert_eq!(latest_version(vec!["0.11.9", "v0.12.1"]), "v0.12.1");
    }

    #[test]
    fn test_latest_version_picks_highest() {
        assert_eq!(
            latest_version(vec!["0.13.0", PRE_0_12, "0.14.1", "0.14.0", "garbage"]),
            "0.14.1"
        );
    }
}
