//! Timeline bar rendering.
//!
//! The bar spans the media duration. Each marked frame is drawn in its key's
//! color, paired markers are joined by a span, and the playhead sits on top.

use std::io::Write;

use anyhow::Result;

use super::ansi::{self, palette_color};
use crate::events::{Markers, PairSpan};

/// First terminal column of the bar.
pub const BAR_START: u16 = 1;

/// One column of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Track,
    /// Inside a pair span; palette slot of the start key
    Span(usize),
    /// A marked frame; palette slot of its key
    Marker(usize),
    Playhead,
}

/// Width of the bar for a terminal `term_cols` wide.
pub fn bar_width(term_cols: u16) -> usize {
    (term_cols as usize).saturating_sub(2)
}

/// Terminal row the bar is drawn on.
pub fn timeline_row(term_rows: u16) -> u16 {
    term_rows.saturating_sub(2)
}

/// Column (within the bar) for `frame` out of `total_frames`.
pub fn frame_to_column(frame: u64, total_frames: u64, bar_width: usize) -> usize {
    if bar_width == 0 {
        return 0;
    }
    if total_frames == 0 {
        return 0;
    }
    let ratio = (frame as f64 / total_frames as f64).clamp(0.0, 1.0);
    ((ratio * bar_width as f64) as usize).min(bar_width - 1)
}

/// Position along the bar for a terminal column, `0.0..=1.0`.
///
/// Returns `None` for columns outside the bar.
pub fn column_to_ratio(column: u16, term_cols: u16) -> Option<f64> {
    let width = bar_width(term_cols);
    if width == 0 || column < BAR_START || column >= BAR_START + width as u16 {
        return None;
    }
    if width == 1 {
        return Some(0.0);
    }
    Some((column - BAR_START) as f64 / (width - 1) as f64)
}

/// Palette slot for a marker key.
///
/// Configured keys use their own slot; combo markers such as `1a` use the
/// slot of their leading key. Unknown keys fall back to slot 0.
pub fn key_slot(keys: &[String], key: &str) -> usize {
    keys.iter()
        .position(|k| k == key)
        .or_else(|| keys.iter().position(|k| key.starts_with(k.as_str())))
        .unwrap_or(0)
}

/// Build the timeline cells.
///
/// Returns the cells and the playhead column.
pub fn build_timeline(
    bar_width: usize,
    current_frame: u64,
    total_frames: u64,
    markers: &Markers,
    spans: &[PairSpan],
    keys: &[String],
) -> (Vec<Cell>, usize) {
    let mut cells = vec![Cell::Track; bar_width];
    if bar_width == 0 {
        return (cells, 0);
    }

    for span in spans {
        let slot = key_slot(keys, &span.start_key);
        let from = frame_to_column(span.start, total_frames, bar_width);
        let to = frame_to_column(span.end, total_frames, bar_width);
        for cell in &mut cells[from..=to] {
            *cell = Cell::Span(slot);
        }
    }

    for track in markers.tracks() {
        let slot = key_slot(keys, track.key());
        for &frame in track.frames() {
            cells[frame_to_column(frame, total_frames, bar_width)] = Cell::Marker(slot);
        }
    }

    let playhead = frame_to_column(current_frame, total_frames, bar_width);
    cells[playhead] = Cell::Playhead;
    (cells, playhead)
}

/// Render the timeline bar.
///
/// # Arguments
/// * `out` - Writer to render to
/// * `width` - Terminal width
/// * `row` - Row to render at (0-indexed)
/// * `cells` - Cells from [`build_timeline`]
/// * `playhead` - Playhead column from [`build_timeline`]
/// * `palette` - Marker colors by palette slot
pub fn render_timeline(
    out: &mut impl Write,
    width: u16,
    row: u16,
    cells: &[Cell],
    playhead: usize,
    palette: &[[u8; 3]],
) -> Result<()> {
    let mut output = String::with_capacity(width as usize * 24);
    ansi::move_to_row(&mut output, row);
    output.push_str(ansi::BAR_BG);
    output.push(' ');

    for (i, cell) in cells.iter().enumerate() {
        match *cell {
            Cell::Track => {
                output.push_str(if i < playhead {
                    ansi::GREEN
                } else {
                    ansi::DARK_GREY
                });
                output.push(if i < playhead { '━' } else { '─' });
            }
            Cell::Span(slot) => {
                ansi::fg_rgb(&mut output, palette_color(palette, slot));
                output.push('═');
            }
            Cell::Marker(slot) => {
                ansi::fg_rgb(&mut output, palette_color(palette, slot));
                output.push('◆');
            }
            Cell::Playhead => {
                output.push_str(ansi::WHITE);
                output.push('⏺');
            }
        }
    }

    let used = 1 + cells.len();
    for _ in used..width as usize {
        output.push(' ');
    }
    output.push_str(ansi::RESET);
    write!(out, "{}", output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> Vec<String> {
        ["1", "2", "3", "4"].map(String::from).to_vec()
    }

    #[test]
    fn bar_geometry() {
        assert_eq!(bar_width(80), 78);
        assert_eq!(bar_width(1), 0);
        assert_eq!(timeline_row(24), 22);
    }

    #[test]
    fn frame_columns_cover_the_bar() {
        assert_eq!(frame_to_column(0, 100, 10), 0);
        assert_eq!(frame_to_column(50, 100, 10), 5);
        assert_eq!(frame_to_column(100, 100, 10), 9);
        assert_eq!(frame_to_column(500, 100, 10), 9);
        assert_eq!(frame_to_column(5, 0, 10), 0);
    }

    #[test]
    fn column_ratio_inside_and_outside_bar() {
        assert_eq!(column_to_ratio(0, 12), None);
        assert_eq!(column_to_ratio(1, 12), Some(0.0));
        assert_eq!(column_to_ratio(10, 12), Some(1.0));
        assert_eq!(column_to_ratio(11, 12), None);
    }

    #[test]
    fn combo_markers_share_their_key_slot() {
        let keys = keys();
        assert_eq!(key_slot(&keys, "3"), 2);
        assert_eq!(key_slot(&keys, "2b"), 1);
        assert_eq!(key_slot(&keys, "x"), 0);
    }

    #[test]
    fn markers_and_playhead() {
        let markers = Markers::from_pairs([("2", vec![20, 80])]);
        let (cells, playhead) = build_timeline(10, 50, 100, &markers, &[], &keys());
        assert_eq!(playhead, 5);
        assert_eq!(cells[5], Cell::Playhead);
        assert_eq!(cells[2], Cell::Marker(1));
        assert_eq!(cells[8], Cell::Marker(1));
        assert_eq!(cells[0], Cell::Track);
    }

    #[test]
    fn playhead_wins_over_marker() {
        let markers = Markers::from_pairs([("1", vec![50])]);
        let (cells, _) = build_timeline(10, 50, 100, &markers, &[], &keys());
        assert_eq!(cells[5], Cell::Playhead);
    }

    #[test]
    fn spans_join_paired_markers() {
        let markers = Markers::from_pairs([("1", vec![10]), ("4", vec![40])]);
        let spans = vec![PairSpan {
            start_key: "1".to_string(),
            end_key: "4".to_string(),
            start: 10,
            end: 40,
        }];
        let (cells, _) = build_timeline(10, 90, 100, &markers, &spans, &keys());
        assert_eq!(cells[1], Cell::Marker(0));
        assert_eq!(cells[2], Cell::Span(0));
        assert_eq!(cells[3], Cell::Span(0));
        assert_eq!(cells[4], Cell::Marker(3));
        assert_eq!(cells[5], Cell::Track);
    }

    #[test]
    fn empty_bar_is_safe() {
        let markers = Markers::from_pairs([("1", vec![5])]);
        let (cells, playhead) = build_timeline(0, 5, 10, &markers, &[], &keys());
        assert!(cells.is_empty());
        assert_eq!(playhead, 0);
    }

    #[test]
    fn render_writes_glyphs_and_pads() {
        let markers = Markers::from_pairs([("1", vec![20])]);
        let (cells, playhead) = build_timeline(10, 50, 100, &markers, &[], &keys());
        let mut out = Vec::new();
        render_timeline(&mut out, 12, 3, &cells, playhead, &[[1, 2, 3]]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\x1b[4;1H"));
        assert!(text.contains("\x1b[38;2;1;2;3m◆"));
        assert!(text.contains('⏺'));
        assert!(text.ends_with(ansi::RESET));
    }
}
