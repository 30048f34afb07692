//! Shared helpers for the CLI tests

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Helper to run the evtmkr CLI and capture output
pub fn run_evtmkr(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_evtmkr"))
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("EVTMKR_LOG")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute evtmkr");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

/// A temporary workspace with its own config file and save directory.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let ws = Self {
            dir: TempDir::new().unwrap(),
        };
        let config = format!(
            "[workspace]\nsave_dir = '{}'\n",
            ws.save_dir().display()
        );
        fs::write(ws.config_path(), config).unwrap();
        ws
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    pub fn config_arg(&self) -> String {
        self.config_path().display().to_string()
    }

    pub fn save_dir(&self) -> PathBuf {
        self.path().join("Marked Events")
    }

    /// Write `content` to a file in the workspace and return its path.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }
}
