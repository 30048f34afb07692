//! Subcommand handlers.

pub mod completions;
pub mod config;
pub mod events;
pub mod review;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use evtmkr::Config;

/// Config file in use: `--config` if given, else the default location.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::config_path().context("Failed to locate config file"),
    }
}

/// Load the config, falling back to defaults when the file does not exist.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = config_path(explicit)?;
    if !path.exists() {
        return Ok(Config::default());
    }
    Config::load_from(&path).with_context(|| format!("Failed to load {}", path.display()))
}
