//! Integration tests for the config subcommands

use std::fs;

use evtmkr::Config;

use crate::helpers::{run_evtmkr, Workspace};

#[test]
fn config_path_honours_override() {
    let ws = Workspace::new();
    let (stdout, _stderr, exit_code) = run_evtmkr(&["config", "path", "--config", &ws.config_arg()]);

    assert_eq!(exit_code, 0);
    assert_eq!(stdout.trim(), ws.config_arg());
}

#[test]
fn config_show_prints_merged_toml() {
    let ws = Workspace::new();
    let (stdout, _stderr, exit_code) = run_evtmkr(&["--config", &ws.config_arg(), "config", "show"]);

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("[playback]"));
    assert!(stdout.contains("fps = 30.0"));
    assert!(stdout.contains("Marked Events"));
}

#[test]
fn config_show_without_file_uses_defaults() {
    let ws = Workspace::new();
    let missing = ws.path().join("absent.toml").display().to_string();
    let (stdout, _stderr, exit_code) = run_evtmkr(&["--config", &missing, "config", "show"]);

    assert_eq!(exit_code, 0);
    assert!(stdout.contains("video_fps_original = 119.88"));
}

#[test]
fn config_show_reports_invalid_values() {
    let ws = Workspace::new();
    let bad = ws.write("bad.toml", "[playback]\nfps = 0.0\n");
    let (_stdout, stderr, exit_code) =
        run_evtmkr(&["--config", &bad.display().to_string(), "config", "show"]);

    assert_eq!(exit_code, 1);
    assert!(stderr.contains("playback.fps"));
}

#[test]
fn config_init_writes_defaults_once() {
    let ws = Workspace::new();
    let target = ws.path().join("nested").join("config.toml");
    let target_arg = target.display().to_string();

    let (stdout, _stderr, exit_code) = run_evtmkr(&["--config", &target_arg, "config", "init"]);
    assert_eq!(exit_code, 0);
    assert!(stdout.contains("Wrote default config"));
    let written = fs::read_to_string(&target).unwrap();
    assert_eq!(Config::from_toml_str(&written).unwrap().playback.fps, 30.0);

    let (_stdout, stderr, exit_code) = run_evtmkr(&["--config", &target_arg, "config", "init"]);
    assert_eq!(exit_code, 1);
    assert!(stderr.contains("already exists"));

    let (_stdout, _stderr, exit_code) =
        run_evtmkr(&["--config", &target_arg, "config", "init", "--force"]);
    assert_eq!(exit_code, 0);
}
