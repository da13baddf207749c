//! End-to-end replay tests over synthetic session files.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    deprecated
)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;
use vigil_core::CalibrationTarget;
use vigil_test_support::{FrameBuilder, SessionBuilder};

const FPS: f64 = 30.0;

/// Command isolated from the user's config and data directories.
fn vigil(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("vigil").unwrap();
    cmd.current_dir(home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"));
    cmd
}

fn calm_session(dir: &Path, name: &str, seconds: f64) -> PathBuf {
    let path = dir.join(name);
    SessionBuilder::new(FPS)
        .hold(seconds, &FrameBuilder::attentive())
        .write_jsonl(&path)
        .unwrap();
    path
}

fn yawning_session(dir: &Path) -> PathBuf {
    let path = dir.join("yawn.jsonl");
    let yawn = FrameBuilder::new().eyes(0.3).mouth(0.8).upright().build();
    SessionBuilder::new(FPS)
        .hold(1.0, &FrameBuilder::attentive())
        .hold(1.0, &yawn)
        .write_jsonl(&path)
        .unwrap();
    path
}

fn json_lines(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn test_calm_session_writes_every_frame() {
    let home = TempDir::new().unwrap();
    let session = calm_session(home.path(), "calm.jsonl", 1.0);

    let output = vigil(home.path()).arg(&session).output().unwrap();
    assert_eq!(output.status.code(), Some(0));

    let lines = json_lines(&output.stdout);
    assert_eq!(lines.len(), 30);
    for line in &lines {
        assert_eq!(line["source"].as_str(), session.to_str());
        assert!(line["metrics"]["avg_ear"].as_f64().is_some());
        assert_eq!(line["posture"], "not_calibrated");
        assert!(line.get("alert").is_none());
    }
    assert_eq!(lines[0]["eyes"]["status"], "normal");
}

#[test]
fn test_yawn_raises_alert_and_exit_code() {
    let home = TempDir::new().unwrap();
    let session = yawning_session(home.path());

    let output = vigil(home.path())
        .arg("--alerts-only")
        .arg(&session)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let lines = json_lines(&output.stdout);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["alert"]["reason"], "tired");
    assert_eq!(lines[0]["alert"]["message"], "You look tired - take a break");
    assert_eq!(lines[0]["eyes"]["yawning"], true);
}

#[test]
fn test_summary_per_session_in_sorted_order() {
    let home = TempDir::new().unwrap();
    let sessions = home.path().join("sessions");
    std::fs::create_dir(&sessions).unwrap();
    calm_session(&sessions, "b.jsonl", 0.5);
    calm_session(&sessions, "a.jsonl", 1.0);
    std::fs::write(sessions.join("notes.txt"), "not a session").unwrap();

    let output = vigil(home.path())
        .arg("--summary")
        .arg(&sessions)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let lines = json_lines(&output.stdout);
    assert_eq!(lines.len(), 2);
    assert!(lines[0]["source"].as_str().unwrap().ends_with("a.jsonl"));
    assert_eq!(lines[0]["frames"], 30);
    assert_eq!(lines[1]["frames"], 15);
    for line in &lines {
        assert!(line["analyzed_at"].as_str().unwrap().contains('T'));
        assert_eq!(line["blink_count"], 0);
        assert_eq!(line["alerts"].as_array().map(Vec::len), Some(0));
    }
}

#[test]
fn test_json_array_output() {
    let home = TempDir::new().unwrap();
    let session = yawning_session(home.path());

    let output = vigil(home.path())
        .args(["--format", "json", "--summary", "--pretty"])
        .arg(&session)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with('['));
    let value: Value = serde_json::from_str(&stdout).unwrap();
    let summaries = value.as_array().unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0]["alerts"][0]["reason"], "tired");
}

#[test]
fn test_unreadable_lines_are_counted() {
    let home = TempDir::new().unwrap();
    let path = calm_session(home.path(), "damaged.jsonl", 0.5);
    let mut content = std::fs::read_to_string(&path).unwrap();
    content.push_str("{\"type\":\"frame\",\"timestamp\":\n");
    std::fs::write(&path, content).unwrap();

    let output = vigil(home.path())
        .arg("--summary")
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let lines = json_lines(&output.stdout);
    assert_eq!(lines[0]["frames"], 15);
    assert_eq!(lines[0]["skipped_records"], 1);
}

#[test]
fn test_session_without_readable_records_is_skipped() {
    let home = TempDir::new().unwrap();
    let garbage = home.path().join("garbage.jsonl");
    std::fs::write(&garbage, "hello\nworld\n").unwrap();
    let calm = calm_session(home.path(), "calm.jsonl", 0.5);

    vigil(home.path())
        .arg("--summary")
        .arg(&garbage)
        .arg(&calm)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("calm.jsonl").and(predicate::str::contains("garbage").not()))
        .stderr(predicate::str::contains("Skipping"));
}

#[test]
fn test_calibration_record_in_session() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("calibrated.jsonl");
    SessionBuilder::new(FPS)
        .calibrate(CalibrationTarget::Both)
        .hold(3.0, &FrameBuilder::attentive())
        .write_jsonl(&path)
        .unwrap();

    let output = vigil(home.path())
        .arg("--summary")
        .arg(&path)
        .output()
        .unwrap();

    let lines = json_lines(&output.stdout);
    assert_eq!(lines[0]["eyes_calibrated"], true);
    assert_eq!(lines[0]["posture_calibrated"], true);
    assert!(lines[0]["posture_frames"]["good"].as_u64().unwrap() > 0);
}

#[test]
fn test_baseline_save_restore_and_clear() {
    let home = TempDir::new().unwrap();
    let baseline = home.path().join("state").join("baseline.json");
    let calibration = calm_session(home.path(), "calibration.jsonl", 3.0);
    let later = calm_session(home.path(), "later.jsonl", 0.5);

    // Calibrate and persist.
    vigil(home.path())
        .args(["--calibrate", "--save-baseline", "--summary", "--baseline"])
        .arg(&baseline)
        .arg(&calibration)
        .assert()
        .code(0);

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&baseline).unwrap()).unwrap();
    assert!((saved["avg_ear"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    assert!(saved["eye_shoulder_ratio"].as_f64().is_some());

    // Restored on the next run.
    let output = vigil(home.path())
        .args(["--summary", "--baseline"])
        .arg(&baseline)
        .arg(&later)
        .output()
        .unwrap();
    let lines = json_lines(&output.stdout);
    assert_eq!(lines[0]["eyes_calibrated"], true);
    assert_eq!(lines[0]["posture_calibrated"], true);

    // Ignored with --no-baseline.
    let output = vigil(home.path())
        .args(["--summary", "--no-baseline", "--baseline"])
        .arg(&baseline)
        .arg(&later)
        .output()
        .unwrap();
    let lines = json_lines(&output.stdout);
    assert_eq!(lines[0]["eyes_calibrated"], false);

    // Shown and cleared through the baseline subcommand.
    vigil(home.path())
        .args(["baseline", "show", "--file"])
        .arg(&baseline)
        .assert()
        .success()
        .stdout(predicate::str::contains("avg_ear"));

    vigil(home.path())
        .args(["baseline", "clear", "--file"])
        .arg(&baseline)
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));
    assert!(!baseline.exists());
}

#[test]
fn test_save_without_calibration_writes_nothing() {
    let home = TempDir::new().unwrap();
    let baseline = home.path().join("baseline.json");
    let session = calm_session(home.path(), "calm.jsonl", 0.5);

    vigil(home.path())
        .args(["--save-baseline", "--summary", "--baseline"])
        .arg(&baseline)
        .arg(&session)
        .assert()
        .code(0)
        .stderr(predicate::str::contains("No calibrated baseline to save"));
    assert!(!baseline.exists());
}

#[test]
fn test_no_eyes_reports_posture_only() {
    let home = TempDir::new().unwrap();
    let session = yawning_session(home.path());

    let output = vigil(home.path()).arg("--no-eyes").arg(&session).output().unwrap();
    assert_eq!(output.status.code(), Some(0));

    let lines = json_lines(&output.stdout);
    assert!(!lines.is_empty());
    for line in &lines {
        assert!(line.get("eyes").is_none());
        assert!(line["metrics"].get("avg_ear").is_none());
        assert!(line["metrics"]["eye_shoulder_ratio"].as_f64().is_some());
    }
}

#[test]
fn test_quiet_suppresses_status_lines() {
    let home = TempDir::new().unwrap();
    let session = calm_session(home.path(), "calm.jsonl", 0.5);

    vigil(home.path())
        .args(["--summary", "--quiet"])
        .arg(&session)
        .assert()
        .code(0)
        .stderr(predicate::str::is_empty());
}
