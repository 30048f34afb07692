//! Review sessions.
//!
//! A [`ReviewSession`] owns everything one reviewer works with: the event
//! log, the playback controller, the key handler and the event store. It
//! turns terminal events into operations, keeps the status message, and
//! renders the screen. The interactive loop lives in `native`.
//!
//! # Usage
//!
//! ```no_run
//! use evtmkr::review::run_review;
//! use evtmkr::Config;
//! use std::path::Path;
//!
//! let config = Config::load().unwrap();
//! run_review(config, Path::new("clip.mp4"), 60_000, None).unwrap();
//! ```

mod native;

use std::io::Write;
use std::path::{Path, PathBuf};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Result, ReviewError};
use crate::events::EventLog;
use crate::files::{EventStore, SaveOutcome};
use crate::input::{handle_mouse_event, InputResult, KeyHandler};
use crate::media::MediaBackend;
use crate::playback::{PlaybackController, PollUpdate};
use crate::render::{self, StatusInfo};

pub use native::{run_review, ReviewResult};

/// One reviewer's working state.
pub struct ReviewSession<B: MediaBackend> {
    config: Config,
    log: EventLog,
    playback: PlaybackController<B>,
    keys: KeyHandler,
    store: EventStore,
    video: Option<PathBuf>,
    events_file: Option<PathBuf>,
    status: Option<String>,
    /// Frame-entry text while the field is open
    entry: Option<String>,
    show_help: bool,
    term_cols: u16,
    term_rows: u16,
}

impl<B: MediaBackend> ReviewSession<B> {
    pub fn new(config: Config, backend: B) -> Result<Self> {
        config.validate()?;
        let store = EventStore::from_config(&config)?;
        Self::with_store(config, backend, store)
    }

    pub fn with_store(config: Config, backend: B, store: EventStore) -> Result<Self> {
        Ok(Self {
            log: EventLog::with_pairing(config.pairing()?),
            playback: PlaybackController::from_config(&config, backend)?,
            keys: KeyHandler::new(&config),
            store,
            config,
            video: None,
            events_file: None,
            status: None,
            entry: None,
            show_help: false,
            term_cols: 80,
            term_rows: 24,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut EventLog {
        &mut self.log
    }

    pub fn playback(&self) -> &PlaybackController<B> {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackController<B> {
        &mut self.playback
    }

    pub fn keys(&self) -> &KeyHandler {
        &self.keys
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn video(&self) -> Option<&Path> {
        self.video.as_deref()
    }

    /// Event file last loaded or saved.
    pub fn events_file(&self) -> Option<&Path> {
        self.events_file.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn entry(&self) -> Option<&str> {
        self.entry.as_deref()
    }

    pub fn is_showing_help(&self) -> bool {
        self.show_help
    }

    pub fn set_size(&mut self, cols: u16, rows: u16) {
        self.term_cols = cols;
        self.term_rows = rows;
    }

    /// Open a video.
    ///
    /// Events of the previous video are saved first; if that save fails the
    /// previous video and its markers stay loaded and the error is returned.
    /// Otherwise the log is cleared and, with auto-search enabled, an
    /// existing event file for the new video is loaded. Returns that file, if
    /// one was found and loaded.
    pub fn load_video(&mut self, path: &Path) -> Result<Option<PathBuf>> {
        if self.video.is_some() {
            if let Err(e) = self.save() {
                warn!(error = %e, "keeping current video, its events were not saved");
                self.status = Some(format!("Save failed, video not switched: {}", e));
                return Err(e);
            }
        }

        self.playback.load(path)?;
        self.log.clear();
        self.video = Some(path.to_path_buf());
        self.events_file = None;
        self.entry = None;
        self.status = Some(format!("Opened {}", display_name(path)));

        let Some(found) = self.store.discover(path) else {
            return Ok(None);
        };
        match self.store.load(&found, &mut self.log) {
            Ok(()) => {
                info!(path = %found.display(), "auto-loaded events");
                self.status = Some(format!("Loaded events from {}", found.display()));
                self.events_file = Some(found.clone());
                Ok(Some(found))
            }
            Err(e) => {
                warn!(path = %found.display(), error = %e, "could not auto-load events");
                self.status = Some(format!("Could not load {}: {}", found.display(), e));
                Ok(None)
            }
        }
    }

    /// Replace the markers with the contents of an event file.
    pub fn load_events(&mut self, path: &Path) -> Result<()> {
        self.store.load(path, &mut self.log)?;
        self.events_file = Some(path.to_path_buf());
        self.status = Some(format!("Loaded events from {}", path.display()));
        Ok(())
    }

    /// Save the markers for the current video.
    pub fn save(&mut self) -> Result<SaveOutcome> {
        let video = self.video.clone().ok_or(ReviewError::NoMediaLoaded)?;
        let outcome = self.store.save(&video, &mut self.log)?;
        if let SaveOutcome::Written(path) | SaveOutcome::Unchanged(path) = &outcome {
            self.events_file = Some(path.clone());
        }
        Ok(outcome)
    }

    /// Save and put the outcome on the status line.
    fn save_and_report(&mut self) -> Option<SaveOutcome> {
        match self.save() {
            Ok(outcome) => {
                self.status = Some(match &outcome {
                    SaveOutcome::Empty => "Nothing to save".to_string(),
                    SaveOutcome::Unchanged(_) => "Nothing new to save".to_string(),
                    SaveOutcome::Written(path) => format!("Saved {}", path.display()),
                });
                Some(outcome)
            }
            Err(e) => {
                self.status = Some(format!("Save failed: {}", e));
                None
            }
        }
    }

    /// Stop playback and make the final save.
    pub fn close(&mut self) -> Result<SaveOutcome> {
        self.playback.stop();
        if self.video.is_none() {
            return Ok(SaveOutcome::Empty);
        }
        self.save()
    }

    /// Handle one terminal event.
    pub fn handle_event(&mut self, event: Event) -> InputResult {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                // If help is showing, any key closes it
                if self.show_help {
                    self.show_help = false;
                    return InputResult::Continue;
                }
                if self.entry.is_some() {
                    self.handle_entry_key(key);
                    return InputResult::Continue;
                }

                let result = self.keys.handle_key(
                    key,
                    self.entry.is_some(),
                    &mut self.playback,
                    &mut self.log,
                );
                if let Some(message) = self.keys.take_message() {
                    self.status = Some(message);
                }
                match result {
                    InputResult::Save => {
                        self.save_and_report();
                    }
                    InputResult::Help => self.show_help = true,
                    InputResult::FrameEntry => {
                        self.entry = Some(self.playback.begin_frame_entry());
                    }
                    InputResult::Quit | InputResult::Continue => {}
                }
                result
            }
            Event::Mouse(mouse) => {
                handle_mouse_event(mouse, self.term_cols, self.term_rows, &mut self.playback)
            }
            Event::Resize(cols, rows) => {
                self.set_size(cols, rows);
                InputResult::Continue
            }
            _ => InputResult::Continue, // Ignore focus events, paste, key release
        }
    }

    /// Keys while the frame-number field is open.
    fn handle_entry_key(&mut self, key: KeyEvent) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() || (c == '-' && entry.is_empty()) => {
                entry.push(c);
            }
            KeyCode::Backspace => {
                entry.pop();
            }
            KeyCode::Esc => {
                self.entry = None;
                self.playback.cancel_frame_entry();
            }
            KeyCode::Enter => {
                let text = self.entry.take().unwrap_or_default();
                match self.playback.commit_frame_entry(&text) {
                    Ok(Some(frame)) => self.status = Some(format!("Jumped to frame {}", frame)),
                    Ok(None) => {}
                    Err(e) => {
                        warn!(input = text.as_str(), error = %e, "frame entry rejected");
                        self.status = Some(e.to_string());
                    }
                }
            }
            _ => {}
        }
    }

    /// Poll the backend.
    pub fn tick(&mut self) -> PollUpdate {
        self.playback.poll()
    }

    /// Draw the whole screen.
    pub fn render(&self, out: &mut impl Write, update: &PollUpdate) -> anyhow::Result<()> {
        let (cols, rows) = (self.term_cols, self.term_rows);
        if self.show_help {
            return render::render_help(out, cols, rows);
        }

        let keys = self.keys.marker_keys();
        let palette = &self.config.marker.colors;
        let spans = self.log.pairs();
        let panel_height = rows.saturating_sub(render::STATUS_LINES);

        let video = self.video.as_deref().map(display_name);
        let events_file = self.events_file.as_ref().map(|p| p.display().to_string());
        let panel = render::build_panel_rows(
            video.as_deref(),
            events_file.as_deref(),
            self.log.markers(),
            &spans,
            keys,
            update.frame,
            cols as usize,
        );
        render::render_panel(out, cols, panel_height, &panel, palette)?;
        render::render_separator_line(out, cols, panel_height)?;

        let total_frames = self.playback.clock().time_to_frame(update.duration_ms);
        let (cells, playhead) = render::build_timeline(
            render::bar_width(cols),
            update.frame,
            total_frames,
            self.log.markers(),
            &spans,
            keys,
        );
        render::render_timeline(out, cols, render::timeline_row(rows), &cells, playhead, palette)?;

        let info = StatusInfo {
            state: Some(update.state),
            frame: update.frame,
            marker: self.log.marker_at(update.frame),
            time_label: &update.time_label,
            speed: self.playback.speed(),
            combo_mode: self.keys.combo_mode(),
            pending: self.keys.pending(),
            dirty: self.log.is_dirty(),
            entry: self.entry.as_deref(),
            message: self.status.as_deref(),
        };
        render::render_status_line(out, cols, rows.saturating_sub(1), &info)?;
        out.flush()?;
        Ok(())
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
