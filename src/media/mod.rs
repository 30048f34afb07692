//! The media backend seam.
//!
//! Decoding and rendering happen outside this crate. The review core only
//! needs a transport it can command (play, pause, seek, speed) and query
//! (position, duration, state) without blocking.

mod clock_backend;

use std::path::Path;

use crate::error::Result;

pub use clock_backend::ClockBackend;

/// Transport state as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaState {
    Stopped,
    Playing,
    Paused,
}

/// A media player the review core can drive.
///
/// Commands must return immediately; position and state are read by polling.
pub trait MediaBackend {
    /// Open `path`. On success the backend is paused at position 0.
    fn load(&mut self, path: &Path) -> Result<()>;
    fn is_loaded(&self) -> bool;
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn seek(&mut self, position_ms: u64);
    fn position_ms(&self) -> u64;
    fn duration_ms(&self) -> u64;
    fn set_speed(&mut self, factor: f64);
    fn state(&self) -> MediaState;
}
