//! Integration tests for the events subcommands

use crate::helpers::{run_evtmkr, Workspace};

// ============================================================================
// events show
// ============================================================================

#[test]
fn show_lists_markers_with_timestamps() {
    let ws = Workspace::new();
    let file = ws.write("event-clip.txt", "{'1': [120, 340], '2': [200]}");
    let (stdout, _stderr, exit_code) = run_evtmkr(&[
        "--config",
        &ws.config_arg(),
        "events",
        "show",
        &file.display().to_string(),
    ]);

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("1 (2)"));
    assert!(stdout.contains("2 (1)"));
    assert!(stdout.contains("00:00:04"));
    assert!(stdout.contains("00:00:11"));
}

#[test]
fn show_uses_fps_override() {
    let ws = Workspace::new();
    let file = ws.write("event-clip.txt", "{'1': [120]}");
    let (stdout, _stderr, exit_code) = run_evtmkr(&[
        "--config",
        &ws.config_arg(),
        "events",
        "show",
        &file.display().to_string(),
        "--fps",
        "60",
    ]);

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("00:00:02"));
}

#[test]
fn show_empty_file() {
    let ws = Workspace::new();
    let file = ws.write("event-clip.txt", "{}");
    let (stdout, _stderr, exit_code) = run_evtmkr(&[
        "--config",
        &ws.config_arg(),
        "events",
        "show",
        &file.display().to_string(),
    ]);

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("(no markers)"));
}

// ============================================================================
// events check
// ============================================================================

#[test]
fn check_accepts_legacy_file() {
    let ws = Workspace::new();
    let file = ws.write("event-clip.txt", "{'1': [120, 340, 560], '2': [200, 480]}");
    let (stdout, _stderr, exit_code) =
        run_evtmkr(&["events", "check", &file.display().to_string()]);

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("ok (5 markers, 2 keys)"));
}

#[test]
fn check_rejects_malformed_file() {
    let ws = Workspace::new();
    let file = ws.write("event-clip.txt", "{'1': [120, 340}");
    let (_stdout, stderr, exit_code) =
        run_evtmkr(&["events", "check", &file.display().to_string()]);

    assert_eq!(exit_code, 1);
    assert!(stderr.contains("is not a valid event file"));
    assert!(stderr.contains("Malformed event data"));
}

#[test]
fn check_missing_file() {
    let ws = Workspace::new();
    let missing = ws.path().join("event-none.txt");
    let (_stdout, stderr, exit_code) =
        run_evtmkr(&["events", "check", &missing.display().to_string()]);

    assert_eq!(exit_code, 1);
    assert!(stderr.contains("Failed to read"));
}

// ============================================================================
// events path
// ============================================================================

#[test]
fn path_uses_configured_save_dir() {
    let ws = Workspace::new();
    let (stdout, _stderr, exit_code) = run_evtmkr(&[
        "--config",
        &ws.config_arg(),
        "events",
        "path",
        "/videos/clip.mp4",
    ]);

    assert_eq!(exit_code, 0);
    let expected = ws.save_dir().join("event-clip.txt");
    assert_eq!(stdout.trim(), expected.display().to_string());
}
