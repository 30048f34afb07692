//! Input handling for the reviewer.
//!
//! Keyboard events drive playback and marking through [`KeyHandler`]; mouse
//! events on the timeline bar scrub. Both return an [`InputResult`] telling
//! the main loop what to do next.

mod keyboard;
mod mouse;

pub use keyboard::KeyHandler;
pub use mouse::handle_mouse_event;

/// Result of processing an input event.
///
/// Returned by the input handlers to signal control flow decisions to the
/// main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResult {
    /// Keep reviewing
    Continue,
    /// Save events and exit
    Quit,
    /// Save events now
    Save,
    /// Show the help overlay
    Help,
    /// Open the frame-number entry field
    FrameEntry,
}
