use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::{tempdir, TempDir};

#[allow(deprecated)]
fn aw_context(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("aw-context").expect("binary");
    cmd.env("AW_CONTEXT_DIR", dir.path())
        // nothing listens on the discard port
        .env("AW_CONTEXT_TRACKER_URL", "http://127.0.0.1:9")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn add_then_query_today() {
    let dir = tempdir().unwrap();

    aw_context(&dir)
        .args(["add", "Writing spec", "--tags", "work,doc"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("✓ Context added at "))
        .stdout(predicate::str::contains("  Tags: work, doc"));

    aw_context(&dir)
        .arg("query")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Found 1 context(s):\n"))
        .stdout(predicate::str::is_match(r"ID: \S+ \| Time: \d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} \| Context: Writing spec \| Tags: work, doc").unwrap());
}

#[test]
fn day_file_is_written_under_the_data_dir() {
    let dir = tempdir().unwrap();
    aw_context(&dir).args(["add", "note"]).assert().success();

    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with("context-"))
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].ends_with(".json"));

    let raw = fs::read_to_string(dir.path().join(&names[0])).unwrap();
    let value: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["context"], "note");
    assert_eq!(value[0]["tags"], serde_json::json!([]));
}

#[test]
fn search_matches_exact_tags() {
    let dir = tempdir().unwrap();
    aw_context(&dir).args(["add", "Standup", "--tags", "meeting"]).assert().success();
    aw_context(&dir).args(["add", "Planning", "--tags", "Meeting"]).assert().success();

    aw_context(&dir)
        .args(["search", "meeting"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 context(s):"))
        .stdout(predicate::str::contains("Context: Standup"))
        .stdout(predicate::str::contains("Planning").not());

    aw_context(&dir)
        .args(["search", "absent"])
        .assert()
        .success()
        .stdout("No contexts found with tag 'absent'.\n");
}

#[test]
fn empty_range_is_not_an_error() {
    let dir = tempdir().unwrap();
    aw_context(&dir)
        .args(["query", "2020-01-01"])
        .assert()
        .success()
        .stdout("No contexts found in the specified date range.\n");
}

#[test]
fn invalid_date_exits_with_validation_status() {
    let dir = tempdir().unwrap();
    aw_context(&dir)
        .args(["query", "not-a-date"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid date format"));
}

#[test]
fn missing_required_argument_fails() {
    let dir = tempdir().unwrap();
    aw_context(&dir).arg("add").assert().failure();
}

#[test]
fn json_output_is_machine_readable() {
    let dir = tempdir().unwrap();
    aw_context(&dir)
        .args(["add", "First", "--tags", " a , b ,"])
        .assert()
        .success();

    let output = aw_context(&dir)
        .args(["query", "today", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["tags"], serde_json::json!(["a", "b"]));
    assert!(entries[0]["timestamp"].as_str().unwrap().ends_with("+00:00"));
}

#[test]
fn summary_survives_unreachable_tracker() {
    let dir = tempdir().unwrap();
    aw_context(&dir).args(["add", "Deep work"]).assert().success();

    aw_context(&dir)
        .args(["summary", "--date", "today"])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Summary for "))
        .stdout(predicate::str::contains("Contexts (1):"))
        .stdout(predicate::str::contains("Error fetching activity data: "));
}

#[test]
fn enrich_with_unreachable_tracker_fails() {
    let dir = tempdir().unwrap();
    aw_context(&dir)
        .args(["enrich", "--start", "09:00"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unreachable"));
}

#[test]
fn version_flag_prints_crate_version() {
    let dir = tempdir().unwrap();
    aw_context(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
