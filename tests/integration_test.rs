//! Integration tests for telstat
//!
//! Run the whole pipeline over telemetry directories built on disk.

mod common;

use common::{SessionRecordBuilder, create_test_log_dir, users, write_day};
use std::path::Path;
use telstat::output::write_report;
use telstat::pipeline::Pipeline;
use telstat::{Report, TelstatError};
use telstat_logs::DataLoader;
use telstat_releases::{FileReleaseSource, NoReleases};

async fn run(dir: &Path) -> telstat::Result<Report> {
    Pipeline::new(DataLoader::new(dir), Box::new(NoReleases))
        .run()
        .await
}

#[tokio::test]
async fn test_two_day_scenario() {
    let long_message = "X".repeat(31);
    let day1 = users(&["A", "B"]);
    let day2 = vec![
        SessionRecordBuilder::new("A").to_json_line(),
        SessionRecordBuilder::new("C")
            .with_error(&long_message, "at render (index.js:1)")
            .to_json_line(),
    ];
    let temp_dir = create_test_log_dir("2024-01-01", vec![day1, day2]).await;

    let report = run(temp_dir.path()).await.unwrap();
    let installs: Vec<usize> = report.telemetry.iter().map(|d| d.installs).collect();
    assert_eq!(installs, vec![2, 1]);

    let day2 = &report.telemetry[1];
    assert_eq!(day2.errors.len(), 1);
    assert_eq!(day2.errors[0].count, 1);
    assert_eq!(day2.errors[0].key, "X".repeat(30));
    assert_eq!(day2.error_rates.today, Some(0.5));
    assert_eq!(day2.error_rates.today_latest, Some(0.5));
    assert_eq!(day2.error_rates.last7, None);
    assert_eq!(day2.actives.today, Some(2));
    assert_eq!(day2.retention.day1, None);
}

#[tokio::test]
async fn test_gap_fails_naming_missing_day() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    write_day(temp_dir.path(), "2024-01-01", &users(&["a"])).await;
    write_day(temp_dir.path(), "2024-01-03", &users(&["a"])).await;

    let err = run(temp_dir.path()).await.unwrap_err();
    assert!(matches!(err, TelstatError::Gap { .. }));
    assert!(err.to_string().contains("Missing telemetry before 2024-01-03"));
}

#[tokio::test]
async fn test_parse_failure_leaves_previous_report() {
    let temp_dir = create_test_log_dir(
        "2024-01-01",
        vec![users(&["a"]), vec!["{\"userID\":".to_string()]],
    )
    .await;
    let report_path = temp_dir.path().join("summary.json");
    std::fs::write(&report_path, "previous").unwrap();

    let err = run(temp_dir.path()).await.unwrap_err();
    assert!(matches!(err, TelstatError::Parse { line: 1, .. }));
    assert_eq!(std::fs::read_to_string(&report_path).unwrap(), "previous");
}

#[tokio::test]
async fn test_incomplete_records_are_ignored() {
    let day = vec![
        SessionRecordBuilder::new("a").to_json_line(),
        SessionRecordBuilder::new("b").without_system().to_json_line(),
        SessionRecordBuilder::new("c").without_user().to_json_line(),
    ];
    let temp_dir = create_test_log_dir("2024-01-01", vec![day]).await;

    let report = run(temp_dir.path()).await.unwrap();
    assert_eq!(report.telemetry[0].installs, 1);
    assert_eq!(report.telemetry[0].actives.today, Some(1));
}

#[tokio::test]
async fn test_empty_day_file_fails_without_report() {
    let temp_dir = create_test_log_dir("2024-01-01", vec![users(&["a"]), vec![]]).await;

    let err = run(temp_dir.path()).await.unwrap_err();
    assert!(matches!(err, TelstatError::Parse { line: 1, .. }));
}

#[tokio::test]
async fn test_usage_and_pre_0_12_errors() {
    let day = vec![
        SessionRecordBuilder::new("a")
            .without_version()
            .with_platform("win32")
            .with_error("boom", "at C:\\app\\resources\\app.asar\\main.js:1")
            .to_json_line(),
        SessionRecordBuilder::new("b")
            .with_version("0.13.1")
            .with_platform("darwin")
            .with_error("boom", "at /Applications/App.app/main.js:1")
            .to_json_line(),
    ];
    let temp_dir = create_test_log_dir("2024-01-01", vec![day]).await;

    let report = run(temp_dir.path()).await.unwrap();
    let day = &report.telemetry[0];
    assert_eq!(day.usage.version["pre-0.12"], 1);
    assert_eq!(day.usage.version_platform["0.13.1-darwin"], 1);

    let boom = &day.errors[0];
    assert_eq!(boom.count, 2);
    assert_eq!(boom.versions, vec!["pre-0.12", "0.13.1"]);
    assert_eq!(boom.platforms, vec!["darwin", "win32"]);
    // Display fields follow the newest version
    assert_eq!(boom.stack, "at /Applications/App.app/main.js:1");
}

#[tokio::test]
async fn test_report_with_release_file() {
    let temp_dir = create_test_log_dir("2024-01-01", vec![users(&["a"])]).await;
    let releases_path = temp_dir.path().join("releases.json");
    std::fs::write(
        &releases_path,
        r#"[
            {"tag_name":"v0.14.0","published_at":"2016-09-03T00:00:00Z","installs":{"win32":5,"darwin":3,"linux":2,"total":10}},
            {"tag_name":"v0.13.1","published_at":"2016-07-01T00:00:00Z","installs":{"win32":1,"darwin":1,"linux":1,"total":3}}
        ]"#,
    )
    .unwrap();

    let pipeline = Pipeline::new(
        DataLoader::new(temp_dir.path()),
        Box::new(FileReleaseSource::new(&releases_path)),
    );
    let report = pipeline.run().await.unwrap();
    assert_eq!(report.releases.len(), 2);
    assert_eq!(report.total_installs.win32, 6);
    assert_eq!(report.total_installs.total, 13);

    let report_path = temp_dir.path().join("summary.json");
    write_report(&report_path, &report).await.unwrap();
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(written["totalInstalls"]["total"], 13);
    assert_eq!(written["telemetry"][0]["installs"], 1);
}

#[tokio::test]
async fn test_previous_report_is_not_read_as_a_day() {
    let temp_dir = create_test_log_dir("2024-01-01", vec![users(&["a"]), users(&["a"])]).await;
    let report = run(temp_dir.path()).await.unwrap();
    write_report(&temp_dir.path().join("summary.json"), &report)
        .await
        .unwrap();

    let again = run(temp_dir.path()).await.unwrap();
    assert_eq!(again, report);
}

#[tokio::test]
async fn test_retention_over_a_week() {
    let mut days = vec![users(&["a", "b"]), users(&["a", "c", "d"])];
    for _ in 0..7 {
        days.push(users(&["a", "c"]));
    }
    let temp_dir = create_test_log_dir("2024-01-01", days).await;

    let report = run(temp_dir.path()).await.unwrap();
    // Cohort of day two is {c, d}; c is back on day three
    assert_eq!(report.telemetry[2].retention.day1, Some(0.5));
    // Day 8 looks back at the same cohort
    assert_eq!(report.telemetry[8].retention.day7, Some(0.5));
    assert_eq!(report.telemetry[6].actives.last7, Some(4));
}
