//! Playback control for the reviewer.
//!
//! This module handles transport state, seeking, frame stepping, speed and
//! position polling on top of a media backend.

mod controller;
mod speed;

pub use controller::{PlaybackController, PollUpdate};
pub use speed::{next_speed, SPEED_STEP};
