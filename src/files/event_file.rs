//! Reading, writing and finding event files.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, error, info};

use super::filename::{derive_event_id, event_filename, is_event_filename, matches_task};
use crate::config::Config;
use crate::error::{Result, ReviewError};
use crate::events::{parse_literal, to_literal, EventLog, Markers};

/// What a save did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No markers; nothing was written
    Empty,
    /// The file already holds exactly these markers
    Unchanged(PathBuf),
    Written(PathBuf),
}

/// Event file locations and naming for a review session.
#[derive(Debug, Clone)]
pub struct EventStore {
    save_dir: PathBuf,
    events_dir: Option<PathBuf>,
    task_pattern: Option<Regex>,
    auto_search: bool,
}

impl EventStore {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            events_dir: None,
            task_pattern: None,
            auto_search: true,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            save_dir: config.save_dir(),
            events_dir: config.workspace.events_dir.clone(),
            task_pattern: config.task_regex()?,
            auto_search: config.workspace.auto_search_events,
        })
    }

    pub fn with_events_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.events_dir = Some(dir.into());
        self
    }

    pub fn with_task_pattern(mut self, pattern: Regex) -> Self {
        self.task_pattern = Some(pattern);
        self
    }

    pub fn with_auto_search(mut self, enabled: bool) -> Self {
        self.auto_search = enabled;
        self
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Directory searched when a video is opened.
    pub fn search_dir(&self) -> &Path {
        self.events_dir.as_deref().unwrap_or(&self.save_dir)
    }

    pub fn event_id(&self, video: &Path) -> String {
        derive_event_id(video, self.task_pattern.as_ref())
    }

    /// Where the events for `video` are saved.
    pub fn event_path(&self, video: &Path) -> PathBuf {
        self.save_dir.join(event_filename(&self.event_id(video)))
    }

    /// Save the log's markers for `video`.
    pub fn save(&self, video: &Path, log: &mut EventLog) -> Result<SaveOutcome> {
        self.save_to(&self.event_path(video), log)
    }

    /// Save the log's markers to `path`.
    ///
    /// Empty logs are not written, and a file that already holds the same
    /// text is left alone. The write goes through a temporary file so an
    /// existing event file is never left half-written. On failure the log is
    /// untouched and the markers are dumped to the error log.
    pub fn save_to(&self, path: &Path, log: &mut EventLog) -> Result<SaveOutcome> {
        if log.markers().is_empty() {
            info!("nothing to save");
            return Ok(SaveOutcome::Empty);
        }

        let content = to_literal(log.markers());
        if fs::read_to_string(path).is_ok_and(|existing| existing == content) {
            log.mark_saved();
            info!(path = %path.display(), "events unchanged");
            return Ok(SaveOutcome::Unchanged(path.to_path_buf()));
        }

        if let Err(e) = write_atomic(path, &content) {
            error!(path = %path.display(), error = %e, events = %content, "failed to save events");
            return Err(e);
        }
        log.mark_saved();
        info!(path = %path.display(), "saved events");
        Ok(SaveOutcome::Written(path.to_path_buf()))
    }

    /// Replace the log's markers with the contents of `path`.
    ///
    /// On any error the log keeps its current markers.
    pub fn load(&self, path: &Path, log: &mut EventLog) -> Result<()> {
        let markers = read_event_file(path)?;
        log.import(markers);
        info!(path = %path.display(), "loaded events");
        Ok(())
    }

    /// Find an existing event file for `video`.
    ///
    /// Looks in the search directory for `event-<id>.txt`. When the task
    /// pattern matches the video, any `event-*.txt` whose name contains the
    /// task id also counts; the first such name in sort order wins.
    pub fn discover(&self, video: &Path) -> Option<PathBuf> {
        if !self.auto_search {
            return None;
        }
        let dir = self.search_dir();
        let id = self.event_id(video);

        let exact = dir.join(event_filename(&id));
        if exact.is_file() {
            debug!(path = %exact.display(), "found event file");
            return Some(exact);
        }

        let pattern = self.task_pattern.as_ref()?;
        if !matches_task(video, pattern) {
            return None;
        }
        let entries = fs::read_dir(dir).ok()?;
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| is_event_filename(n) && n.contains(&id))
            })
            .collect();
        candidates.sort();
        let found = candidates.into_iter().next();
        if let Some(path) = &found {
            debug!(path = %path.display(), id, "found event file by task id");
        }
        found
    }
}

/// Read and parse an event file.
pub fn read_event_file(path: &Path) -> Result<Markers> {
    let content = fs::read_to_string(path).map_err(|source| ReviewError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_literal(&content)
}

/// Write `content` next to `path` and rename it into place.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let write_err = |source| ReviewError::FileWrite {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    fs::write(&tmp, content).map_err(write_err)?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        write_err(e)
    })
}
