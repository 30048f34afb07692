//! Rendering components for the reviewer.
//!
//! This module contains the UI rendering functions: the marker panel, the
//! timeline bar, the status line and the help overlay. All of them only
//! read the event log and playback state.

mod ansi;
mod help;
mod markers;
mod progress;
mod status;

pub use help::{calc_help_start_col, calc_help_start_row, render_help, HELP_BOX_WIDTH, HELP_LINES};
pub use markers::{build_panel_rows, render_panel, truncate, PanelRow};
pub use progress::{
    bar_width, build_timeline, column_to_ratio, frame_to_column, key_slot, render_timeline,
    timeline_row, Cell, BAR_START,
};
pub use status::{build_status_line, render_separator_line, render_status_line, StatusInfo};

/// Rows used below the marker panel (separator, timeline, status line).
pub const STATUS_LINES: u16 = 3;
