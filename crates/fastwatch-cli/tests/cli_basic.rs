//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against an isolated data
//! directory and verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command against `data_dir` and return (stdout, stderr, code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "fastwatch-cli", "--quiet", "--"])
        .args(args)
        .env("FASTWATCH_DATA_DIR", data_dir)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn fresh_store_reports_not_fasting() {
    let dir = tempfile::TempDir::new().unwrap();
    let (stdout, _stderr, code) = run_cli(dir.path(), &["fast", "status"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Not fasting"));
}

#[test]
fn start_status_stop_cycle() {
    let dir = tempfile::TempDir::new().unwrap();

    let (stdout, _, code) = run_cli(dir.path(), &["fast", "start", "--goal", "16:8"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Fasting started"));

    let (stdout, _, code) = run_cli(dir.path(), &["fast", "status"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Fasting (16:8)"));

    let (stdout, _, code) = run_cli(dir.path(), &["fast", "stop"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Fast complete"));

    let (stdout, _, code) = run_cli(dir.path(), &["history", "list", "--json"]);
    assert_eq!(code, 0);
    let records: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 1);
}

#[test]
fn double_start_fails() {
    let dir = tempfile::TempDir::new().unwrap();

    let (_, _, code) = run_cli(dir.path(), &["fast", "start"]);
    assert_eq!(code, 0);

    let (_, stderr, code) = run_cli(dir.path(), &["fast", "start", "--goal", "18:6"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("already running"));

    // The failed start left no history behind.
    let (stdout, _, code) = run_cli(dir.path(), &["history", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("No completed fasts"));
}

#[test]
fn status_json_is_parseable() {
    let dir = tempfile::TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["fast", "status", "--json"]);
    assert_eq!(code, 0);
    let snapshot: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(snapshot["isFasting"], false);
}

#[test]
fn suggest_show_uses_fixed_fallback() {
    let dir = tempfile::TempDir::new().unwrap();
    let (_, _, code) = run_cli(
        dir.path(),
        &["config", "set", "--mode", "fixed", "--fixed-start", "18:30"],
    );
    assert_eq!(code, 0);

    let (stdout, _, code) = run_cli(dir.path(), &["suggest", "show"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("18:30"));
}
