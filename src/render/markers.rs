//! Marker list panel.
//!
//! The upper part of the screen: which video and event file are open, then
//! one row per marker key listing its frames, with the frame under the
//! playhead bracketed.

use std::io::Write;

use anyhow::Result;

use super::ansi::{self, palette_color};
use super::progress::key_slot;
use crate::events::{Markers, PairSpan};

/// A panel row: palette slot (if the row belongs to a key) and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelRow {
    pub slot: Option<usize>,
    pub text: String,
}

/// Truncate `text` to `width` characters, ending in `…` when cut.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('…');
    cut
}

/// Build the panel rows.
pub fn build_panel_rows(
    video: Option<&str>,
    events_file: Option<&str>,
    markers: &Markers,
    spans: &[PairSpan],
    keys: &[String],
    current_frame: u64,
    width: usize,
) -> Vec<PanelRow> {
    let mut rows = vec![
        PanelRow {
            slot: None,
            text: truncate(&format!(" Video:  {}", video.unwrap_or("–")), width),
        },
        PanelRow {
            slot: None,
            text: truncate(&format!(" Events: {}", events_file.unwrap_or("–")), width),
        },
        PanelRow {
            slot: None,
            text: String::new(),
        },
    ];

    if markers.is_empty() {
        rows.push(PanelRow {
            slot: None,
            text: truncate(" No markers yet. Press a marker key to mark the current frame.", width),
        });
        return rows;
    }

    for track in markers.tracks().iter().filter(|t| !t.frames().is_empty()) {
        let frames: Vec<String> = track
            .frames()
            .iter()
            .map(|&f| {
                if f == current_frame {
                    format!("[{}]", f)
                } else {
                    f.to_string()
                }
            })
            .collect();
        let text = format!(
            " ◆ {:<4} ({:>3})  {}",
            track.key(),
            track.frames().len(),
            frames.join(" ")
        );
        rows.push(PanelRow {
            slot: Some(key_slot(keys, track.key())),
            text: truncate(&text, width),
        });
    }

    if !spans.is_empty() {
        rows.push(PanelRow {
            slot: None,
            text: String::new(),
        });
        let pairs: Vec<String> = spans
            .iter()
            .map(|s| format!("{}:{}–{}:{}", s.start_key, s.start, s.end_key, s.end))
            .collect();
        rows.push(PanelRow {
            slot: None,
            text: truncate(&format!(" Pairs: {}", pairs.join("  ")), width),
        });
    }

    rows
}

/// Render `rows` into the first `height` terminal rows, clearing the rest.
pub fn render_panel(
    out: &mut impl Write,
    width: u16,
    height: u16,
    rows: &[PanelRow],
    palette: &[[u8; 3]],
) -> Result<()> {
    let mut output = String::with_capacity(width as usize * height as usize);
    for row in 0..height {
        ansi::move_to_row(&mut output, row);
        output.push_str("\x1b[2K");
        if let Some(panel_row) = rows.get(row as usize) {
            match panel_row.slot {
                Some(slot) => ansi::fg_rgb(&mut output, palette_color(palette, slot)),
                None => output.push_str(ansi::GREY),
            }
            output.push_str(&panel_row.text);
            output.push_str(ansi::RESET);
        }
    }
    write!(out, "{}", output)?;
    Ok(())
}
