//! A backend that plays a virtual timeline against the wall clock.
//!
//! Nothing is decoded: the playhead simply advances with elapsed time scaled
//! by the playback speed and stops at the configured duration. The terminal
//! reviewer uses it to step through a recording whose frames are shown by an
//! external viewer, and tests use it as a deterministic transport.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::debug;

use super::{MediaBackend, MediaState};
use crate::error::{Result, ReviewError};

/// Wall-clock transport with a fixed duration.
#[derive(Debug)]
pub struct ClockBackend {
    duration_ms: u64,
    source: Option<PathBuf>,
    playing: bool,
    /// Stopped explicitly or by reaching the end; cleared by play/pause/load
    stopped: bool,
    speed: f64,
    /// Position when the clock was last rebased
    base_ms: f64,
    /// Wall time of the last rebase
    origin: Instant,
}

impl ClockBackend {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            source: None,
            playing: false,
            stopped: false,
            speed: 1.0,
            base_ms: 0.0,
            origin: Instant::now(),
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Playhead position at wall time `now`.
    pub fn position_at(&self, now: Instant) -> u64 {
        let mut pos = self.base_ms;
        if self.playing {
            let elapsed = now.saturating_duration_since(self.origin).as_secs_f64();
            pos += elapsed * 1000.0 * self.speed;
        }
        (pos.round() as u64).min(self.duration_ms)
    }

    /// Transport state at wall time `now`; playback ends at the duration.
    pub fn state_at(&self, now: Instant) -> MediaState {
        if self.source.is_none() || self.stopped {
            MediaState::Stopped
        } else if self.playing {
            if self.position_at(now) >= self.duration_ms {
                MediaState::Stopped
            } else {
                MediaState::Playing
            }
        } else {
            MediaState::Paused
        }
    }

    /// Re-anchor the clock at `now`. A playhead that reached the end stays
    /// stopped there.
    fn rebase(&mut self, now: Instant) {
        self.base_ms = self.position_at(now) as f64;
        self.origin = now;
        if self.playing && self.base_ms as u64 >= self.duration_ms {
            self.playing = false;
            self.stopped = true;
            debug!(duration_ms = self.duration_ms, "reached end of media");
        }
    }
}

impl MediaBackend for ClockBackend {
    fn load(&mut self, path: &Path) -> Result<()> {
        std::fs::metadata(path).map_err(|source| ReviewError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        self.source = Some(path.to_path_buf());
        self.playing = false;
        self.stopped = false;
        self.speed = 1.0;
        self.base_ms = 0.0;
        self.origin = Instant::now();
        debug!(path = %path.display(), duration_ms = self.duration_ms, "media loaded");
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    fn play(&mut self) {
        if self.source.is_none() {
            return;
        }
        let now = Instant::now();
        self.rebase(now);
        if self.base_ms as u64 >= self.duration_ms {
            // Replaying after the end starts over
            self.base_ms = 0.0;
        }
        self.stopped = false;
        self.playing = true;
    }

    fn pause(&mut self) {
        self.rebase(Instant::now());
        self.playing = false;
        self.stopped = false;
    }

    fn stop(&mut self) {
        self.playing = false;
        self.stopped = true;
        self.base_ms = 0.0;
        self.origin = Instant::now();
    }

    fn seek(&mut self, position_ms: u64) {
        self.rebase(Instant::now());
        self.base_ms = position_ms.min(self.duration_ms) as f64;
        self.origin = Instant::now();
    }

    fn position_ms(&self) -> u64 {
        self.position_at(Instant::now())
    }

    fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    fn set_speed(&mut self, factor: f64) {
        self.rebase(Instant::now());
        self.speed = factor;
    }

    fn state(&self) -> MediaState {
        self.state_at(Instant::now())
    }
}
