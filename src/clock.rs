//! Conversion between the continuous media timeline and frame indices.
//!
//! The media backend reports time in milliseconds; navigation and markers work
//! in whole frames. Two rates are involved:
//!
//! - `fps`: the configured review rate, used for the displayed frame number,
//!   stepping and direct frame entry
//! - `original_fps`: the native rate of the source, used only when a slider
//!   scrub position is mapped back to a frame

use crate::error::{Result, ReviewError};

/// Highest rate whose frames are still at least one millisecond apart.
///
/// Above this, `frame_to_time` can map two frames to the same millisecond and
/// the round trip stops being exact.
pub const MAX_FPS: f64 = 1000.0;

/// Frame/time converter for one configured pair of rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    fps: f64,
    original_fps: f64,
}

impl FrameClock {
    /// Create a clock, rejecting rates that cannot address whole frames.
    pub fn new(fps: f64, original_fps: f64) -> Result<Self> {
        validate_rate("fps", fps)?;
        validate_rate("video_fps_original", original_fps)?;
        Ok(Self { fps, original_fps })
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn original_fps(&self) -> f64 {
        self.original_fps
    }

    /// Frame shown at `position_ms`: `round(position_ms * fps / 1000)`.
    pub fn time_to_frame(&self, position_ms: u64) -> u64 {
        time_to_frame(position_ms, self.fps)
    }

    /// Start time of `frame`: `round(frame * 1000 / fps)`.
    pub fn frame_to_time(&self, frame: u64) -> u64 {
        frame_to_time(frame, self.fps)
    }

    /// Map a slider value (media milliseconds) to the nearest source frame.
    pub fn slider_to_frame(&self, slider_ms: u64) -> u64 {
        time_to_frame(slider_ms, self.original_fps)
    }

    /// Milliseconds between two polls of the backend position.
    pub fn poll_interval_ms(&self) -> u64 {
        ((1000.0 / self.fps) as u64).max(1)
    }
}

/// `round(position_ms * fps / 1000)`.
pub fn time_to_frame(position_ms: u64, fps: f64) -> u64 {
    (position_ms as f64 * fps / 1000.0).round() as u64
}

/// `round(frame * 1000 / fps)`.
pub fn frame_to_time(frame: u64, fps: f64) -> u64 {
    (frame as f64 * 1000.0 / fps).round() as u64
}

/// Format milliseconds as `HH:MM:SS` for the time label.
pub fn format_timestamp(ms: u64) -> String {
    let total_secs = ms / 1000;
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}

pub(crate) fn validate_rate(name: &str, fps: f64) -> Result<()> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(ReviewError::invalid_config(format!(
            "{} must be a positive number, got {}",
            name, fps
        )));
    }
    if fps > MAX_FPS {
        return Err(ReviewError::invalid_config(format!(
            "{} must not exceed {} (millisecond resolution), got {}",
            name, MAX_FPS, fps
        )));
    }
    Ok(())
}
