//! Mouse input handling for the reviewer.
//!
//! Left-button press on the timeline bar grabs the slider, dragging scrubs,
//! and releasing jumps to the frame under the pointer.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use super::InputResult;
use crate::media::MediaBackend;
use crate::playback::PlaybackController;
use crate::render::{column_to_ratio, timeline_row, BAR_START};

/// Handle a mouse event for a terminal of `term_cols` × `term_rows`.
pub fn handle_mouse_event<B: MediaBackend>(
    mouse: MouseEvent,
    term_cols: u16,
    term_rows: u16,
    playback: &mut PlaybackController<B>,
) -> InputResult {
    if !playback.is_loaded() {
        return InputResult::Continue;
    }

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if mouse.row == timeline_row(term_rows) {
                if let Some(value) = slider_at(mouse.column, term_cols, playback) {
                    playback.begin_scrub();
                    playback.scrub_to(value);
                }
            }
        }
        MouseEventKind::Drag(MouseButton::Left) if playback.is_scrubbing() => {
            let column = clamp_to_bar(mouse.column, term_cols);
            if let Some(value) = slider_at(column, term_cols, playback) {
                playback.scrub_to(value);
            }
        }
        MouseEventKind::Up(MouseButton::Left) if playback.is_scrubbing() => {
            let column = clamp_to_bar(mouse.column, term_cols);
            match slider_at(column, term_cols, playback) {
                Some(value) => {
                    playback.end_scrub(value);
                }
                None => {
                    // Bar too narrow to map; keep the position reached so far
                    let frame = playback.current_frame();
                    playback.end_scrub(frame_slider(frame, playback));
                }
            }
        }
        _ => {}
    }

    InputResult::Continue
}

/// Slider value under `column`, if it is on the bar.
fn slider_at<B: MediaBackend>(
    column: u16,
    term_cols: u16,
    playback: &PlaybackController<B>,
) -> Option<u64> {
    let ratio = column_to_ratio(column, term_cols)?;
    Some((ratio * playback.slider_max() as f64).round() as u64)
}

fn frame_slider<B: MediaBackend>(frame: u64, playback: &PlaybackController<B>) -> u64 {
    playback.slider_value(playback.clock().frame_to_time(frame))
}

/// Keep a drag that left the bar pinned to its nearest end.
fn clamp_to_bar(column: u16, term_cols: u16) -> u16 {
    let last = BAR_START + (term_cols.saturating_sub(2)).saturating_sub(1);
    column.clamp(BAR_START, last.max(BAR_START))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::media::ClockBackend;
    use crossterm::event::KeyModifiers;
    use tempfile::NamedTempFile;

    const COLS: u16 = 12; // bar covers columns 1..=10
    const ROWS: u16 = 24;

    fn event(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn loaded() -> (PlaybackController<ClockBackend>, NamedTempFile) {
        let video = NamedTempFile::new().unwrap();
        let mut playback =
            PlaybackController::from_config(&Config::default(), ClockBackend::new(9_000)).unwrap();
        playback.load(video.path()).unwrap();
        (playback, video)
    }

    #[test]
    fn click_drag_release_scrubs() {
        let (mut playback, _video) = loaded();
        let row = timeline_row(ROWS);

        handle_mouse_event(
            event(MouseEventKind::Down(MouseButton::Left), 1, row),
            COLS,
            ROWS,
            &mut playback,
        );
        assert!(playback.is_scrubbing());
        assert_eq!(playback.current_frame(), 0);

        handle_mouse_event(
            event(MouseEventKind::Drag(MouseButton::Left), 10, row),
            COLS,
            ROWS,
            &mut playback,
        );
        assert_eq!(playback.current_frame(), 270);

        handle_mouse_event(
            event(MouseEventKind::Up(MouseButton::Left), 4, row),
            COLS,
            ROWS,
            &mut playback,
        );
        assert!(!playback.is_scrubbing());
        assert_eq!(playback.current_frame(), 90);
    }

    #[test]
    fn drag_past_the_bar_pins_to_the_end() {
        let (mut playback, _video) = loaded();
        let row = timeline_row(ROWS);
        handle_mouse_event(
            event(MouseEventKind::Down(MouseButton::Left), 5, row),
            COLS,
            ROWS,
            &mut playback,
        );
        handle_mouse_event(
            event(MouseEventKind::Up(MouseButton::Left), 200, 0),
            COLS,
            ROWS,
            &mut playback,
        );
        assert_eq!(playback.current_frame(), 270);
    }

    #[test]
    fn clicks_off_the_bar_are_ignored() {
        let (mut playback, _video) = loaded();
        handle_mouse_event(
            event(MouseEventKind::Down(MouseButton::Left), 5, 0),
            COLS,
            ROWS,
            &mut playback,
        );
        assert!(!playback.is_scrubbing());

        // Release without a grab does nothing
        handle_mouse_event(
            event(MouseEventKind::Up(MouseButton::Left), 5, timeline_row(ROWS)),
            COLS,
            ROWS,
            &mut playback,
        );
        assert_eq!(playback.current_frame(), 0);
    }

    #[test]
    fn clamp_to_bar_limits() {
        assert_eq!(clamp_to_bar(0, COLS), 1);
        assert_eq!(clamp_to_bar(50, COLS), 10);
        assert_eq!(clamp_to_bar(4, COLS), 4);
    }
}
