//! Transport state, seeking and frame navigation over a [`MediaBackend`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use super::speed::next_speed;
use crate::clock::{format_timestamp, frame_to_time, FrameClock};
use crate::config::{Config, PlaybackConfig};
use crate::error::{Result, ReviewError};
use crate::media::{MediaBackend, MediaState};

type StateListener = Box<dyn FnMut(MediaState)>;

/// What one poll of the backend observed.
#[derive(Debug, Clone, PartialEq)]
pub struct PollUpdate {
    pub position_ms: u64,
    pub duration_ms: u64,
    pub frame: u64,
    /// `HH:MM:SS / HH:MM:SS`
    pub time_label: String,
    /// Slider value to display; `None` while the user holds the slider
    pub slider: Option<u64>,
    pub state: MediaState,
    /// Set when the transport state changed since the last poll
    pub changed: Option<MediaState>,
}

/// Frame-accurate playback control.
///
/// Every navigation call converts through the [`FrameClock`], so the frame
/// shown after a seek is exactly the frame that was asked for. Calls that
/// need media degrade to no-ops before [`PlaybackController::load`].
pub struct PlaybackController<B: MediaBackend> {
    backend: B,
    clock: FrameClock,
    frame_step: u64,
    large_step_multiplier: u64,
    min_speed: f64,
    max_speed: f64,
    speed: f64,
    state: MediaState,
    media: Option<PathBuf>,
    scrubbing: bool,
    entering_frame: bool,
    listeners: Vec<StateListener>,
}

impl<B: MediaBackend> fmt::Debug for PlaybackController<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackController")
            .field("clock", &self.clock)
            .field("speed", &self.speed)
            .field("state", &self.state)
            .field("media", &self.media)
            .field("scrubbing", &self.scrubbing)
            .field("entering_frame", &self.entering_frame)
            .finish_non_exhaustive()
    }
}

impl<B: MediaBackend> PlaybackController<B> {
    pub fn new(backend: B, clock: FrameClock, playback: &PlaybackConfig) -> Self {
        Self {
            backend,
            clock,
            frame_step: playback.frame_step.max(1),
            large_step_multiplier: playback.large_step_multiplier.max(1),
            min_speed: playback.min_speed,
            max_speed: playback.max_speed,
            speed: 1.0,
            state: MediaState::Stopped,
            media: None,
            scrubbing: false,
            entering_frame: false,
            listeners: Vec::new(),
        }
    }

    /// Build from a validated config.
    pub fn from_config(config: &Config, backend: B) -> Result<Self> {
        Ok(Self::new(backend, config.clock()?, &config.playback))
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn state(&self) -> MediaState {
        self.state
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn media_path(&self) -> Option<&Path> {
        self.media.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.media.is_some() && self.backend.is_loaded()
    }

    pub fn is_scrubbing(&self) -> bool {
        self.scrubbing
    }

    pub fn is_entering_frame(&self) -> bool {
        self.entering_frame
    }

    pub fn frame_step(&self) -> u64 {
        self.frame_step
    }

    pub fn large_step_multiplier(&self) -> u64 {
        self.large_step_multiplier
    }

    /// Register a listener for transport state changes.
    pub fn subscribe(&mut self, listener: impl FnMut(MediaState) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Open `path` in the backend, paused at the start at normal speed.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        self.backend.load(path)?;
        self.media = Some(path.to_path_buf());
        self.speed = 1.0;
        self.backend.set_speed(1.0);
        self.scrubbing = false;
        self.entering_frame = false;
        self.set_state(MediaState::Paused);
        info!(path = %path.display(), duration_ms = self.backend.duration_ms(), "media loaded");
        Ok(())
    }

    pub fn toggle_play_pause(&mut self) {
        if self.state == MediaState::Playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Start playback. After the media ended, playback restarts at 0.
    pub fn play(&mut self) {
        if !self.is_loaded() {
            return;
        }
        if self.state == MediaState::Stopped
            && self.backend.position_ms() >= self.backend.duration_ms()
        {
            self.backend.seek(0);
        }
        self.backend.play();
        self.set_state(MediaState::Playing);
    }

    pub fn pause(&mut self) {
        if !self.is_loaded() {
            return;
        }
        self.backend.pause();
        self.set_state(MediaState::Paused);
    }

    pub fn stop(&mut self) {
        if !self.is_loaded() {
            return;
        }
        self.backend.stop();
        self.set_state(MediaState::Stopped);
    }

    /// Seek to `frame` without changing the transport state.
    ///
    /// Negative frames clamp to 0 and frames past the end clamp to the
    /// duration. Returns the frame actually shown, or `None` without media.
    pub fn jump_to_frame(&mut self, frame: i64) -> Option<u64> {
        if !self.is_loaded() {
            return None;
        }
        let frame = frame.max(0) as u64;
        let target_ms = self.clock.frame_to_time(frame).min(self.backend.duration_ms());
        self.backend.seek(target_ms);
        let shown = self.clock.time_to_frame(target_ms);
        debug!(frame, shown, target_ms, "jump to frame");
        Some(shown)
    }

    /// Move by `delta` frames from the current frame.
    pub fn step(&mut self, delta: i64) -> Option<u64> {
        let current = self.current_frame() as i64;
        self.jump_to_frame(current.saturating_add(delta))
    }

    /// Move by `n` configured frame steps.
    pub fn step_frames(&mut self, n: i64) -> Option<u64> {
        self.step(n.saturating_mul(self.frame_step as i64))
    }

    /// Move by `n` large steps (`large_step_multiplier` frame steps each).
    pub fn large_step(&mut self, n: i64) -> Option<u64> {
        let frames = (self.large_step_multiplier as i64).saturating_mul(self.frame_step as i64);
        self.step(n.saturating_mul(frames))
    }

    /// Multiply the speed by `factor`; see [`next_speed`].
    pub fn adjust_speed(&mut self, factor: f64) -> f64 {
        let speed = next_speed(self.speed, factor, self.min_speed, self.max_speed);
        self.apply_speed(speed)
    }

    pub fn reset_speed(&mut self) -> f64 {
        self.apply_speed(1.0)
    }

    fn apply_speed(&mut self, speed: f64) -> f64 {
        self.speed = speed;
        self.backend.set_speed(speed);
        debug!(speed, "playback speed");
        speed
    }

    /// Frame at the backend's current position.
    pub fn current_frame(&self) -> u64 {
        self.clock.time_to_frame(self.backend.position_ms())
    }

    /// Slider value for a media position.
    ///
    /// Slider values are in source-rate milliseconds so that
    /// [`FrameClock::slider_to_frame`] maps them back to the same frame.
    pub fn slider_value(&self, position_ms: u64) -> u64 {
        frame_to_time(self.clock.time_to_frame(position_ms), self.clock.original_fps())
    }

    /// Largest slider value for the loaded media.
    pub fn slider_max(&self) -> u64 {
        self.slider_value(self.backend.duration_ms())
    }

    /// The user grabbed the slider; polls stop moving it.
    pub fn begin_scrub(&mut self) {
        self.scrubbing = true;
    }

    /// Live seek while dragging. Returns the frame under the slider.
    pub fn scrub_to(&mut self, slider: u64) -> Option<u64> {
        if !self.scrubbing {
            self.begin_scrub();
        }
        self.jump_to_frame(self.clock.slider_to_frame(slider) as i64)
    }

    /// The slider was released at `slider`; jump to its frame.
    pub fn end_scrub(&mut self, slider: u64) -> Option<u64> {
        self.scrubbing = false;
        self.jump_to_frame(self.clock.slider_to_frame(slider) as i64)
    }

    /// Open frame-number entry. Pauses playback and returns the prefill text.
    pub fn begin_frame_entry(&mut self) -> String {
        self.entering_frame = true;
        self.pause();
        self.current_frame().to_string()
    }

    pub fn cancel_frame_entry(&mut self) {
        self.entering_frame = false;
    }

    /// Close frame-number entry with the typed `text`.
    ///
    /// Empty text resumes playback and returns `Ok(None)`. A number jumps to
    /// that frame. Anything else is [`ReviewError::InvalidFrameInput`]; the
    /// entry is closed in every case.
    pub fn commit_frame_entry(&mut self, text: &str) -> Result<Option<u64>> {
        self.entering_frame = false;
        let text = text.trim();
        if text.is_empty() {
            self.play();
            return Ok(None);
        }
        let frame: i64 = text.parse().map_err(|_| ReviewError::InvalidFrameInput {
            input: text.to_string(),
        })?;
        if !self.is_loaded() {
            return Err(ReviewError::NoMediaLoaded);
        }
        Ok(self.jump_to_frame(frame))
    }

    /// Read position and state from the backend.
    ///
    /// A backend that stopped on its own (end of media) moves the controller
    /// to `Stopped` and reports the change.
    pub fn poll(&mut self) -> PollUpdate {
        let position_ms = self.backend.position_ms();
        let duration_ms = self.backend.duration_ms();
        let backend_state = self.backend.state();

        let changed = if self.is_loaded() && backend_state != self.state {
            if backend_state == MediaState::Stopped {
                debug!(position_ms, "media ended");
            }
            self.set_state(backend_state);
            Some(backend_state)
        } else {
            None
        };

        PollUpdate {
            position_ms,
            duration_ms,
            frame: self.clock.time_to_frame(position_ms),
            time_label: format!(
                "{} / {}",
                format_timestamp(position_ms),
                format_timestamp(duration_ms)
            ),
            slider: (!self.scrubbing).then(|| self.slider_value(position_ms)),
            state: self.state,
            changed,
        }
    }

    /// How long to wait before the next poll; `None` unless playing.
    pub fn poll_interval(&self) -> Option<Duration> {
        (self.state == MediaState::Playing)
            .then(|| Duration::from_millis(self.clock.poll_interval_ms()))
    }

    fn set_state(&mut self, state: MediaState) {
        if self.state == state {
            return;
        }
        debug!(from = ?self.state, to = ?state, "transport state");
        self.state = state;
        for listener in &mut self.listeners {
            listener(state);
        }
    }
}
