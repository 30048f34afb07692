//! evtmkr - frame-accurate event marking for video review
//!
//! A reviewer steps through a video and tags frames with marker keys. The
//! crate is split into:
//!
//! - `events`: the marker log with undo/redo and key pairing
//! - `clock`: time/frame conversion
//! - `media` and `playback`: the transport and its controller
//! - `input` and `render`: terminal key/mouse handling and drawing
//! - `files`: event file naming, saving and discovery
//! - `review`: the session tying them together and the terminal loop

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod files;
pub mod input;
pub mod logging;
pub mod media;
pub mod playback;
pub mod render;
pub mod review;

pub use clock::FrameClock;
pub use config::Config;
pub use error::{Result, ReviewError};
pub use events::{EventLog, Markers, Pairing, PairingMode};
pub use files::{EventStore, SaveOutcome};
pub use media::{ClockBackend, MediaBackend, MediaState};
pub use playback::PlaybackController;
pub use review::{ReviewResult, ReviewSession};
