//! Integration tests for top-level CLI behavior

use assert_cmd::Command;
use predicates::prelude::*;

use crate::helpers::{run_evtmkr, Workspace};

// ============================================================================
// Help Output Tests
// ============================================================================

#[test]
fn help_lists_subcommands() {
    let (stdout, _stderr, exit_code) = run_evtmkr(&["--help"]);

    assert_eq!(exit_code, 0);
    for cmd in ["review", "events", "config", "completions"] {
        assert!(stdout.contains(cmd), "missing {} in help", cmd);
    }
}

#[test]
fn review_help_shows_arguments() {
    let (stdout, _stderr, exit_code) = run_evtmkr(&["review", "--help"]);

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("<VIDEO>"));
    assert!(stdout.contains("--duration"));
    assert!(stdout.contains("--events"));
    assert!(stdout.contains("--log-file"));
}

#[test]
fn version_flag_prints_version() {
    Command::cargo_bin("evtmkr")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[test]
fn no_arguments_shows_usage() {
    let (_stdout, stderr, exit_code) = run_evtmkr(&[]);

    assert_eq!(exit_code, 2);
    assert!(stderr.contains("Usage"));
}

#[test]
fn review_requires_duration() {
    let (_stdout, stderr, exit_code) = run_evtmkr(&["review", "clip.mp4"]);

    assert_eq!(exit_code, 2);
    assert!(stderr.contains("--duration"));
}

#[test]
fn review_missing_video_fails_before_terminal_setup() {
    let ws = Workspace::new();
    let video = ws.path().join("missing.mp4");
    let log = ws.path().join("evtmkr.log");

    Command::cargo_bin("evtmkr")
        .unwrap()
        .args(["--config", &ws.config_arg(), "review"])
        .arg(&video)
        .args(["--duration", "1000", "--log-file"])
        .arg(&log)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Video not found"));
}

#[test]
fn review_rejects_zero_duration() {
    let ws = Workspace::new();
    let video = ws.write("clip.mp4", "");
    let log = ws.path().join("evtmkr.log");

    Command::cargo_bin("evtmkr")
        .unwrap()
        .args(["--config", &ws.config_arg(), "review"])
        .arg(&video)
        .args(["--duration", "0", "--log-file"])
        .arg(&log)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--duration must be greater than 0"));
}

// ============================================================================
// Completions Tests
// ============================================================================

#[test]
fn completions_for_bash_mention_binary() {
    Command::cargo_bin("evtmkr")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_evtmkr"));
}

#[test]
fn completions_reject_unknown_shell() {
    let (_stdout, stderr, exit_code) = run_evtmkr(&["completions", "tcsh"]);

    assert_eq!(exit_code, 2);
    assert!(stderr.contains("invalid value"));
}
