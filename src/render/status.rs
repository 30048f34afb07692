//! Status line rendering.
//!
//! Displays transport state, frame number, the marker under the playhead,
//! the time label, speed, combo mode and the frame-entry field.

use std::io::Write;

use anyhow::Result;

use super::ansi;
use crate::media::MediaState;

/// Everything the status line shows.
#[derive(Debug, Clone, Default)]
pub struct StatusInfo<'a> {
    pub state: Option<MediaState>,
    pub frame: u64,
    pub marker: Option<&'a str>,
    pub time_label: &'a str,
    pub speed: f64,
    pub combo_mode: bool,
    pub pending: Option<&'a str>,
    pub dirty: bool,
    /// Text typed into the frame-entry field while it is open
    pub entry: Option<&'a str>,
    pub message: Option<&'a str>,
}

/// Builds a colored line while tracking its visible width.
struct Line {
    text: String,
    visible: usize,
}

impl Line {
    fn new() -> Self {
        Self {
            text: String::with_capacity(256),
            visible: 0,
        }
    }

    fn push(&mut self, color: &str, segment: &str) {
        self.text.push_str(color);
        self.text.push_str(segment);
        self.visible += segment.chars().count();
    }
}

/// Build the status line text and its visible width.
pub fn build_status_line(info: &StatusInfo) -> (String, usize) {
    let mut line = Line::new();
    line.push(ansi::WHITE, " ");

    let icon = match info.state {
        Some(MediaState::Playing) => "⏸ ",
        Some(MediaState::Paused) => "▶ ",
        Some(MediaState::Stopped) | None => "■ ",
    };
    line.push(ansi::WHITE, icon);

    match info.entry {
        Some(entry) => {
            line.push(ansi::YELLOW, "Frame: [");
            line.push(ansi::WHITE, entry);
            line.push(ansi::YELLOW, "_]  ");
        }
        None => line.push(ansi::WHITE, &format!("Frame: {}  ", info.frame)),
    }

    line.push(ansi::DARK_GREY, "Marker: ");
    line.push(ansi::CYAN, info.marker.unwrap_or("–"));
    line.push(ansi::DARK_GREY, "  ");
    line.push(ansi::GREY, info.time_label);
    line.push(ansi::WHITE, &format!("  {:.1}x  ", info.speed));

    let combo = if info.combo_mode { "ON" } else { "OFF" };
    line.push(ansi::DARK_GREY, "Combo Mark: ");
    line.push(
        if info.combo_mode {
            ansi::MAGENTA
        } else {
            ansi::DARK_GREY
        },
        combo,
    );
    if let Some(pending) = info.pending {
        line.push(ansi::MAGENTA, &format!(" [{}…]", pending));
    }

    if info.dirty {
        line.push(ansi::YELLOW, "  ● unsaved");
    }
    if let Some(message) = info.message {
        line.push(ansi::DARK_GREY, "  │ ");
        line.push(ansi::GREEN, message);
    }

    (line.text, line.visible)
}

/// Render the status line, padded to the full width.
pub fn render_status_line(
    out: &mut impl Write,
    width: u16,
    row: u16,
    info: &StatusInfo,
) -> Result<()> {
    let mut output = String::with_capacity(320);
    ansi::move_to_row(&mut output, row);
    let (text, visible) = build_status_line(info);
    output.push_str(&text);

    // Pad to full width to overwrite any leftover content
    for _ in visible..width as usize {
        output.push(' ');
    }
    output.push_str(ansi::RESET);
    write!(out, "{}", output)?;
    Ok(())
}

/// Render a separator line.
pub fn render_separator_line(out: &mut impl Write, width: u16, row: u16) -> Result<()> {
    let mut output = String::with_capacity(width as usize * 3 + 20);
    ansi::move_to_row(&mut output, row);
    output.push_str(ansi::DARK_GREY);
    for _ in 0..width {
        output.push('─');
    }
    output.push_str(ansi::RESET);
    write!(out, "{}", output)?;
    Ok(())
}
