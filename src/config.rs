//! Configuration file handling.
//!
//! The config lives at `<config dir>/evtmkr/config.toml` and is loaded once at
//! startup, validated, and then passed explicitly to the components that need
//! it. A missing file means defaults; a malformed or invalid one is an
//! [`ReviewError::InvalidConfig`] reported before any video is opened.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::{validate_rate, FrameClock};
use crate::error::{Result, ReviewError};
use crate::events::{Pairing, PairingMode};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub marker: MarkerConfig,
    pub playback: PlaybackConfig,
    pub workspace: WorkspaceConfig,
}

/// Marker keys, their colors and pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Keys that toggle a marker, in display order (`"1"` or `"Key_1"`)
    pub keys: Vec<String>,
    /// RGB color per key, cycled when there are fewer colors than keys
    pub colors: Vec<[u8; 3]>,
    /// Frames around the playhead within which a marker key unmarks
    pub unmark_tolerance: u64,
    pub pairing: PairingConfig,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            keys: ["1", "2", "3", "4", "5"].map(String::from).to_vec(),
            colors: vec![
                [172, 157, 147],
                [199, 184, 164],
                [147, 155, 144],
                [180, 166, 169],
                [158, 170, 177],
            ],
            unmark_tolerance: 0,
            pairing: PairingConfig::default(),
        }
    }
}

/// Pairing rules as persisted: 1-based marker index → partner index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingConfig {
    pub enabled: bool,
    pub mode: PairingMode,
    pub offset: i64,
    pub rules: BTreeMap<String, String>,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: PairingMode::Link,
            offset: 0,
            rules: BTreeMap::from([("1".to_string(), "4".to_string())]),
        }
    }
}

/// Frame rates, stepping and speed limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Review frame rate: frame numbers, stepping and polling
    pub fps: f64,
    /// Native rate of the source, used for slider scrubbing
    pub video_fps_original: f64,
    pub large_step_multiplier: u64,
    pub frame_step: u64,
    pub min_speed: f64,
    pub max_speed: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            video_fps_original: 119.88,
            large_step_multiplier: 6,
            frame_step: 1,
            min_speed: 0.1,
            max_speed: 8.0,
        }
    }
}

/// Where event files are saved and searched for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory event files are saved to (default: `<data dir>/evtmkr/Marked Events`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_dir: Option<PathBuf>,
    /// Directory searched for an existing event file when a video opens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events_dir: Option<PathBuf>,
    pub auto_search_events: bool,
    /// Regex extracting the task id from a video path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_pattern: Option<String>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            save_dir: None,
            events_dir: None,
            auto_search_events: true,
            task_pattern: None,
        }
    }
}

impl Config {
    /// Default config file location.
    pub fn config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("evtmkr").join("config.toml"))
            .ok_or_else(|| ReviewError::invalid_config("could not determine config directory"))
    }

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load and validate a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ReviewError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content).map_err(|e| match e {
            ReviewError::InvalidConfig(msg) => {
                ReviewError::invalid_config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| ReviewError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ReviewError::invalid_config(e.to_string()))
    }

    /// Write the config to the default location.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let write_err = |source| ReviewError::FileWrite {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, self.to_toml_string()?).map_err(write_err)
    }

    /// Reject values the review core cannot work with.
    pub fn validate(&self) -> Result<()> {
        let playback = &self.playback;
        validate_rate("playback.fps", playback.fps)?;
        validate_rate("playback.video_fps_original", playback.video_fps_original)?;
        if playback.frame_step == 0 {
            return Err(ReviewError::invalid_config("playback.frame_step must be at least 1"));
        }
        if playback.large_step_multiplier == 0 {
            return Err(ReviewError::invalid_config(
                "playback.large_step_multiplier must be at least 1",
            ));
        }
        if !(playback.min_speed > 0.0 && playback.min_speed <= 1.0)
            || !(playback.max_speed >= 1.0 && playback.max_speed.is_finite())
        {
            return Err(ReviewError::invalid_config(format!(
                "playback speed range must satisfy 0 < min_speed <= 1 <= max_speed, got [{}, {}]",
                playback.min_speed, playback.max_speed
            )));
        }

        let keys = self.marker_keys();
        if keys.is_empty() {
            return Err(ReviewError::invalid_config("marker.keys must not be empty"));
        }
        for (i, key) in keys.iter().enumerate() {
            if key.chars().count() != 1 {
                return Err(ReviewError::invalid_config(format!(
                    "marker key {:?} must be a single character",
                    self.marker.keys[i]
                )));
            }
            if is_reserved_key(key) {
                return Err(ReviewError::invalid_config(format!(
                    "marker key {:?} is taken by a reviewer binding or combo letter",
                    self.marker.keys[i]
                )));
            }
            if keys[..i].contains(key) {
                return Err(ReviewError::invalid_config(format!(
                    "marker key {:?} is listed twice",
                    key
                )));
            }
        }

        for (index, partner) in &self.marker.pairing.rules {
            self.key_for_index(index)?;
            self.key_for_index(partner)?;
        }

        self.task_regex()?;
        Ok(())
    }

    /// Marker keys with any `Key_` prefix stripped.
    pub fn marker_keys(&self) -> Vec<String> {
        self.marker.keys.iter().map(|k| normalize_key(k)).collect()
    }

    /// Pairing rules translated from marker indices to key names.
    pub fn pairing(&self) -> Result<Pairing> {
        let cfg = &self.marker.pairing;
        let mut pairing = Pairing::new(cfg.enabled, cfg.mode, cfg.offset);
        for (index, partner) in &cfg.rules {
            pairing.set_rule(self.key_for_index(index)?, self.key_for_index(partner)?);
        }
        Ok(pairing)
    }

    /// Store `pairing` back as 1-based index rules.
    ///
    /// Rules naming a key that is not configured are dropped.
    pub fn set_pairing(&mut self, pairing: &Pairing) {
        let keys = self.marker_keys();
        let index_of = |key: &str| {
            keys.iter()
                .position(|k| k == key)
                .map(|i| (i + 1).to_string())
        };
        self.marker.pairing.enabled = pairing.enabled;
        self.marker.pairing.mode = pairing.mode;
        self.marker.pairing.offset = pairing.offset;
        self.marker.pairing.rules = pairing
            .rules()
            .iter()
            .filter_map(|(k, p)| Some((index_of(k)?, index_of(p)?)))
            .collect();
    }

    pub fn clock(&self) -> Result<FrameClock> {
        FrameClock::new(self.playback.fps, self.playback.video_fps_original)
    }

    pub fn task_regex(&self) -> Result<Option<Regex>> {
        match self.workspace.task_pattern.as_deref() {
            None | Some("") => Ok(None),
            Some(pattern) => Regex::new(&format!("(?i){}", pattern))
                .map(Some)
                .map_err(|e| {
                    ReviewError::invalid_config(format!("workspace.task_pattern: {}", e))
                }),
        }
    }

    /// Directory event files are saved to.
    pub fn save_dir(&self) -> PathBuf {
        self.workspace.save_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|dir| dir.join("evtmkr"))
                .unwrap_or_else(|| PathBuf::from("."))
                .join("Marked Events")
        })
    }

    /// Default log file for interactive sessions.
    pub fn default_log_path() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join("evtmkr"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("evtmkr.log")
    }

    fn key_for_index(&self, index: &str) -> Result<String> {
        let keys = self.marker_keys();
        index
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|&i| i >= 1 && i <= keys.len())
            .map(|i| keys[i - 1].clone())
            .ok_or_else(|| {
                ReviewError::invalid_config(format!(
                    "pairing rule index {:?} must be between 1 and {}",
                    index,
                    keys.len()
                ))
            })
    }
}

/// Characters bound to reviewer commands.
const RESERVED_KEYS: &[char] = &['q', 'g', '?', ' ', '+', '=', '-', '_'];

/// Letters are the second half of combo markers, so they cannot be marker
/// keys themselves.
fn is_reserved_key(key: &str) -> bool {
    key.chars()
        .any(|c| c.is_alphabetic() || RESERVED_KEYS.contains(&c))
}

/// `"Key_1"` → `"1"`, `"Key_A"` → `"a"`, anything else unchanged.
fn normalize_key(key: &str) -> String {
    let key = key.strip_prefix("Key_").unwrap_or(key);
    if key.chars().count() == 1 {
        key.to_lowercase()
    } else {
        key.to_string()
    }
}
