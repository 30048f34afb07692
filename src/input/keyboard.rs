//! Keyboard input handling for the reviewer.
//!
//! Handles stepping, transport, speed, marking, combo marking, undo/redo and
//! the keys that hand control back to the main loop (save, help, frame
//! entry, quit).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info, warn};

use super::InputResult;
use crate::config::Config;
use crate::events::{Edit, EventLog};
use crate::media::MediaBackend;
use crate::playback::PlaybackController;

/// Speed factor applied by `+`.
const SPEED_UP: f64 = 1.1;
/// Speed factor applied by `-`.
const SPEED_DOWN: f64 = 0.9;

/// Maps key presses to playback and event-log operations.
///
/// Holds only the key-level state: the configured marker keys, the combo
/// mark mode flag and the marker key waiting for its combo letter.
#[derive(Debug, Clone)]
pub struct KeyHandler {
    marker_keys: Vec<String>,
    unmark_tolerance: u64,
    combo_mode: bool,
    pending: Option<String>,
    message: Option<String>,
}

impl KeyHandler {
    pub fn new(config: &Config) -> Self {
        Self {
            marker_keys: config.marker_keys(),
            unmark_tolerance: config.marker.unmark_tolerance,
            combo_mode: false,
            pending: None,
            message: None,
        }
    }

    pub fn marker_keys(&self) -> &[String] {
        &self.marker_keys
    }

    pub fn combo_mode(&self) -> bool {
        self.combo_mode
    }

    /// Marker key waiting for a combo letter.
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Status message left by the last key, if any.
    pub fn take_message(&mut self) -> Option<String> {
        self.message.take()
    }

    pub fn toggle_combo_mode(&mut self) {
        self.combo_mode = !self.combo_mode;
        self.pending = None;
        let status = if self.combo_mode { "ON" } else { "OFF" };
        info!(status, "combo mark mode");
        self.message = Some(format!("Combo Mark: {}", status));
    }

    /// Handle a keyboard event.
    ///
    /// `editing` is true while the frame-number entry field owns the
    /// keyboard; every key is ignored then.
    pub fn handle_key<B: MediaBackend>(
        &mut self,
        key: KeyEvent,
        editing: bool,
        playback: &mut PlaybackController<B>,
        log: &mut EventLog,
    ) -> InputResult {
        if editing || key.kind != KeyEventKind::Press {
            return InputResult::Continue;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        // Combo mode: pending marker key + letter
        if let KeyCode::Char(c) = key.code {
            if self.combo_mode && !ctrl && !alt && c.is_alphabetic() {
                if let Some(pending) = self.pending.take() {
                    let marker = format!("{}{}", pending, c.to_lowercase());
                    self.add_combo_marker(&marker, playback, log);
                    return InputResult::Continue;
                }
            }
        }

        match key.code {
            // === Quit ===
            KeyCode::Char('c') if ctrl => InputResult::Quit,
            KeyCode::Char('q') if !ctrl && !alt => InputResult::Quit,
            KeyCode::Esc => InputResult::Quit,

            // === Main loop requests ===
            KeyCode::Char('?') => InputResult::Help,
            KeyCode::Char('g') if !ctrl && !alt => {
                if playback.is_loaded() {
                    InputResult::FrameEntry
                } else {
                    InputResult::Continue
                }
            }
            KeyCode::Char('s') if ctrl => InputResult::Save,

            // === History ===
            KeyCode::Char('z') | KeyCode::Char('Z') if ctrl => {
                let redo = shift || key.code == KeyCode::Char('Z');
                let edit = if redo { log.redo() } else { log.undo() };
                self.message = Some(match (&edit, redo) {
                    (Some(edit), false) => format!("Undo {}", describe(edit)),
                    (Some(edit), true) => format!("Redo {}", describe(edit)),
                    (None, false) => "Nothing to undo".to_string(),
                    (None, true) => "Nothing to redo".to_string(),
                });
                InputResult::Continue
            }
            KeyCode::Char('d') if ctrl => {
                self.toggle_combo_mode();
                InputResult::Continue
            }

            // === Transport ===
            KeyCode::Char(' ') => {
                playback.toggle_play_pause();
                InputResult::Continue
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let speed = playback.adjust_speed(SPEED_UP);
                self.message = Some(format!("{:.1}x", speed));
                InputResult::Continue
            }
            KeyCode::Char('-') | KeyCode::Char('_') => {
                let speed = playback.adjust_speed(SPEED_DOWN);
                self.message = Some(format!("{:.1}x", speed));
                InputResult::Continue
            }
            KeyCode::Enter => {
                playback.reset_speed();
                self.message = Some("1.0x".to_string());
                InputResult::Continue
            }

            // === Marker removal ===
            KeyCode::Delete | KeyCode::Backspace => {
                self.remove_at_playhead(playback, log);
                InputResult::Continue
            }

            // === Arrows ===
            KeyCode::Left | KeyCode::Right => {
                let sign = if key.code == KeyCode::Left { -1 } else { 1 };
                if alt {
                    let delta = sign * playback.frame_step() as i64;
                    self.nudge_at_playhead(delta, true, playback, log);
                } else if ctrl {
                    jump_to_adjacent_marker(sign > 0, playback, log);
                } else {
                    playback.step_frames(sign);
                    self.pending = None;
                }
                InputResult::Continue
            }
            KeyCode::Up | KeyCode::Down => {
                let sign = if key.code == KeyCode::Up { -1 } else { 1 };
                if alt {
                    let delta = sign
                        * (playback.frame_step() * playback.large_step_multiplier()) as i64;
                    self.nudge_at_playhead(delta, false, playback, log);
                } else {
                    playback.large_step(sign);
                    self.pending = None;
                }
                InputResult::Continue
            }

            // === Marker keys ===
            KeyCode::Char(c) if !ctrl && !alt => {
                let name = c.to_lowercase().to_string();
                if self.marker_keys.contains(&name) {
                    if self.combo_mode {
                        self.pending = Some(name);
                    } else {
                        self.toggle_mark(&name, playback, log);
                    }
                }
                InputResult::Continue
            }

            _ => InputResult::Continue,
        }
    }

    /// Mark `key` at the playhead, or unmark its nearest marker within the
    /// unmark tolerance.
    fn toggle_mark<B: MediaBackend>(
        &mut self,
        key: &str,
        playback: &PlaybackController<B>,
        log: &mut EventLog,
    ) {
        if !playback.is_loaded() {
            self.message = Some("No media loaded".to_string());
            return;
        }
        let frame = playback.current_frame();
        let marked = log
            .markers()
            .nearest(key, frame, self.unmark_tolerance)
            .is_some();

        let outcome = if marked {
            log.remove_nearest(key, frame as i64, self.unmark_tolerance)
                .map(|removed| removed.map(|f| format!("Unmarked {} at {}", key, f)))
        } else {
            log.mark(key, frame as i64)
                .map(|added| added.then(|| format!("Marked {} at {}", key, frame)))
        };
        match outcome {
            Ok(message) => self.message = message,
            Err(e) => warn!(key, frame, error = %e, "marking failed"),
        }
    }

    fn add_combo_marker<B: MediaBackend>(
        &mut self,
        marker: &str,
        playback: &PlaybackController<B>,
        log: &mut EventLog,
    ) {
        if !playback.is_loaded() {
            self.message = Some("No media loaded".to_string());
            return;
        }
        let frame = playback.current_frame();
        match log.add_marker(marker, frame as i64) {
            Ok(true) => self.message = Some(format!("Marked {} at {}", marker, frame)),
            Ok(false) => {}
            Err(e) => warn!(marker, frame, error = %e, "combo marking failed"),
        }
    }

    fn remove_at_playhead<B: MediaBackend>(
        &mut self,
        playback: &PlaybackController<B>,
        log: &mut EventLog,
    ) {
        let frame = playback.current_frame();
        match log.remove_at(frame as i64) {
            Ok(Some(key)) => self.message = Some(format!("Removed {} at {}", key, frame)),
            Ok(None) => {}
            Err(e) => warn!(frame, error = %e, "removing marker failed"),
        }
    }

    /// Move the marker under the playhead; `follow` moves the playhead too.
    fn nudge_at_playhead<B: MediaBackend>(
        &mut self,
        delta: i64,
        follow: bool,
        playback: &mut PlaybackController<B>,
        log: &mut EventLog,
    ) {
        let frame = playback.current_frame();
        if let Some((key, to)) = log.nudge(frame, delta) {
            if follow {
                playback.jump_to_frame(to as i64);
            }
            self.message = Some(format!("Moved {} from {} to {}", key, frame, to));
        }
    }
}

/// Jump to the closest marked frame after (or before) the playhead.
fn jump_to_adjacent_marker<B: MediaBackend>(
    forward: bool,
    playback: &mut PlaybackController<B>,
    log: &EventLog,
) {
    let frame = playback.current_frame();
    let target = if forward {
        log.next_marker_after(frame)
    } else {
        log.prev_marker_before(frame)
    };
    if let Some(target) = target {
        debug!(from = frame, to = target, "jump to marker");
        playback.jump_to_frame(target as i64);
    }
}

fn describe(edit: &Edit) -> String {
    match edit {
        Edit::Add { key, frame } => format!("mark {} at {}", key, frame),
        Edit::Remove { key, frame } => format!("unmark {} at {}", key, frame),
        Edit::Nudge { key, from, to } => format!("move {} {} → {}", key, from, to),
        Edit::Batch(edits) => format!("{} changes", edits.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Markers, PairingMode};
    use crate::media::ClockBackend;
    use tempfile::NamedTempFile;

    struct Fixture {
        keys: KeyHandler,
        playback: PlaybackController<ClockBackend>,
        log: EventLog,
        _video: NamedTempFile,
    }

    impl Fixture {
        fn new(config: &Config) -> Self {
            let video = NamedTempFile::new().unwrap();
            let mut playback =
                PlaybackController::from_config(config, ClockBackend::new(600_000)).unwrap();
            playback.load(video.path()).unwrap();
            Self {
                keys: KeyHandler::new(config),
                playback,
                log: EventLog::with_pairing(config.pairing().unwrap()),
                _video: video,
            }
        }

        fn press(&mut self, code: KeyCode) -> InputResult {
            self.press_with(code, KeyModifiers::NONE)
        }

        fn press_with(&mut self, code: KeyCode, modifiers: KeyModifiers) -> InputResult {
            self.keys.handle_key(
                KeyEvent::new(code, modifiers),
                false,
                &mut self.playback,
                &mut self.log,
            )
        }

        fn seek(&mut self, frame: i64) {
            self.playback.jump_to_frame(frame);
        }

        fn frames(&self, key: &str) -> Vec<u64> {
            self.log.markers().get(key).unwrap_or(&[]).to_vec()
        }
    }

    fn fixture() -> Fixture {
        Fixture::new(&Config::default())
    }

    #[test]
    fn arrows_step_by_frame_and_large_step() {
        let mut f = fixture();
        f.seek(100);
        f.press(KeyCode::Right);
        assert_eq!(f.playback.current_frame(), 101);
        f.press(KeyCode::Left);
        f.press(KeyCode::Left);
        assert_eq!(f.playback.current_frame(), 99);
        f.press(KeyCode::Down);
        assert_eq!(f.playback.current_frame(), 105);
        f.press(KeyCode::Up);
        assert_eq!(f.playback.current_frame(), 99);
    }

    #[test]
    fn marker_key_toggles_mark() {
        let mut f = fixture();
        f.seek(120);
        f.press(KeyCode::Char('1'));
        assert_eq!(f.frames("1"), vec![120]);
        assert_eq!(f.keys.take_message().as_deref(), Some("Marked 1 at 120"));

        f.press(KeyCode::Char('1'));
        assert!(f.frames("1").is_empty());
        assert_eq!(f.log.undo_stack().len(), 2);
    }

    #[test]
    fn unmark_uses_tolerance() {
        let mut config = Config::default();
        config.marker.unmark_tolerance = 2;
        let mut f = Fixture::new(&config);
        f.seek(50);
        f.press(KeyCode::Char('2'));
        f.seek(52);
        f.press(KeyCode::Char('2'));
        assert!(f.frames("2").is_empty());
    }

    #[test]
    fn unconfigured_keys_do_nothing() {
        let mut f = fixture();
        f.press(KeyCode::Char('9'));
        f.press(KeyCode::Char('x'));
        assert!(f.log.markers().is_empty());
        assert!(f.log.undo_stack().is_empty());
    }

    #[test]
    fn editing_suppresses_every_key() {
        let mut f = fixture();
        let result = f.keys.handle_key(
            KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE),
            true,
            &mut f.playback,
            &mut f.log,
        );
        assert_eq!(result, InputResult::Continue);
        f.keys.handle_key(
            KeyEvent::new(KeyCode::Char('1'), KeyModifiers::NONE),
            true,
            &mut f.playback,
            &mut f.log,
        );
        assert!(f.log.markers().is_empty());
    }

    #[test]
    fn key_release_is_ignored() {
        let mut f = fixture();
        let mut event = KeyEvent::new(KeyCode::Char('1'), KeyModifiers::NONE);
        event.kind = KeyEventKind::Release;
        f.keys.handle_key(event, false, &mut f.playback, &mut f.log);
        assert!(f.log.markers().is_empty());
    }

    #[test]
    fn undo_and_redo_shortcuts() {
        let mut f = fixture();
        f.seek(10);
        f.press(KeyCode::Char('1'));
        f.press_with(KeyCode::Char('z'), KeyModifiers::CONTROL);
        assert!(f.frames("1").is_empty());
        f.press_with(
            KeyCode::Char('z'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        );
        assert_eq!(f.frames("1"), vec![10]);
        assert!(f.log.redo_stack().is_empty());

        // Terminals without the shift flag report an uppercase letter
        f.press_with(KeyCode::Char('z'), KeyModifiers::CONTROL);
        f.press_with(KeyCode::Char('Z'), KeyModifiers::CONTROL);
        assert_eq!(f.frames("1"), vec![10]);
    }

    #[test]
    fn delete_removes_marker_at_playhead() {
        let mut f = fixture();
        f.seek(30);
        f.press(KeyCode::Char('3'));
        f.press(KeyCode::Delete);
        assert!(f.frames("3").is_empty());
        f.press(KeyCode::Backspace);
        assert_eq!(f.log.undo_stack().len(), 2);
    }

    #[test]
    fn combo_mode_builds_marker_ids() {
        let mut f = fixture();
        f.press_with(KeyCode::Char('d'), KeyModifiers::CONTROL);
        assert!(f.keys.combo_mode());

        f.seek(200);
        f.press(KeyCode::Char('1'));
        assert_eq!(f.keys.pending(), Some("1"));
        assert!(f.log.markers().is_empty());

        f.press(KeyCode::Char('A'));
        assert_eq!(f.frames("1a"), vec![200]);
        assert_eq!(f.keys.pending(), None);
    }

    #[test]
    fn movement_clears_pending_combo_key() {
        let mut f = fixture();
        f.press_with(KeyCode::Char('d'), KeyModifiers::CONTROL);
        f.press(KeyCode::Char('2'));
        f.press(KeyCode::Right);
        assert_eq!(f.keys.pending(), None);
        f.press(KeyCode::Char('b'));
        assert!(f.log.markers().is_empty());
    }

    #[test]
    fn combo_mode_off_clears_pending() {
        let mut f = fixture();
        f.press_with(KeyCode::Char('d'), KeyModifiers::CONTROL);
        f.press(KeyCode::Char('2'));
        f.press_with(KeyCode::Char('d'), KeyModifiers::CONTROL);
        assert!(!f.keys.combo_mode());
        assert_eq!(f.keys.pending(), None);
    }

    #[test]
    fn alt_arrows_nudge_and_follow() {
        let mut f = fixture();
        f.seek(100);
        f.press(KeyCode::Char('1'));
        f.press_with(KeyCode::Right, KeyModifiers::ALT);
        assert_eq!(f.frames("1"), vec![101]);
        assert_eq!(f.playback.current_frame(), 101);

        f.press_with(KeyCode::Down, KeyModifiers::ALT);
        assert_eq!(f.frames("1"), vec![107]);
        assert_eq!(f.playback.current_frame(), 101);
    }

    #[test]
    fn ctrl_arrows_jump_between_markers() {
        let mut f = fixture();
        f.log.import(Markers::from_pairs([
            ("1", vec![10, 300]),
            ("2", vec![150]),
        ]));
        f.seek(100);
        f.press_with(KeyCode::Right, KeyModifiers::CONTROL);
        assert_eq!(f.playback.current_frame(), 150);
        f.press_with(KeyCode::Right, KeyModifiers::CONTROL);
        assert_eq!(f.playback.current_frame(), 300);
        f.press_with(KeyCode::Right, KeyModifiers::CONTROL);
        assert_eq!(f.playback.current_frame(), 300);
        f.press_with(KeyCode::Left, KeyModifiers::CONTROL);
        assert_eq!(f.playback.current_frame(), 150);
    }

    #[test]
    fn speed_keys() {
        let mut f = fixture();
        f.press(KeyCode::Char('+'));
        assert_eq!(f.playback.speed(), 1.1);
        f.press(KeyCode::Char('-'));
        f.press(KeyCode::Char('-'));
        assert_eq!(f.playback.speed(), 0.9);
        f.press(KeyCode::Enter);
        assert_eq!(f.playback.speed(), 1.0);
    }

    #[test]
    fn control_flow_keys() {
        let mut f = fixture();
        assert_eq!(f.press(KeyCode::Char('q')), InputResult::Quit);
        assert_eq!(f.press(KeyCode::Esc), InputResult::Quit);
        assert_eq!(
            f.press_with(KeyCode::Char('c'), KeyModifiers::CONTROL),
            InputResult::Quit
        );
        assert_eq!(
            f.press_with(KeyCode::Char('s'), KeyModifiers::CONTROL),
            InputResult::Save
        );
        assert_eq!(f.press(KeyCode::Char('?')), InputResult::Help);
        assert_eq!(f.press(KeyCode::Char('g')), InputResult::FrameEntry);
    }

    #[test]
    fn same_frame_pairing_marks_partner() {
        let mut config = Config::default();
        config.marker.pairing.mode = PairingMode::SameFrame;
        let mut f = Fixture::new(&config);
        f.seek(40);
        f.press(KeyCode::Char('1'));
        assert_eq!(f.frames("1"), vec![40]);
        assert_eq!(f.frames("4"), vec![40]);
        assert_eq!(f.log.undo_stack().len(), 1);

        // Unmarking leaves the partner alone
        f.press(KeyCode::Char('1'));
        assert!(f.frames("1").is_empty());
        assert_eq!(f.frames("4"), vec![40]);
    }

    #[test]
    fn link_pairing_marks_only_the_key() {
        let mut f = fixture();
        assert_eq!(f.log.pairing().mode, PairingMode::Link);
        assert_eq!(f.log.pairing().partner_of("1"), Some("4"));
        f.seek(40);
        f.press(KeyCode::Char('1'));
        assert!(f.frames("4").is_empty());
    }

    #[test]
    fn marking_without_media_is_refused() {
        let config = Config::default();
        let mut keys = KeyHandler::new(&config);
        let mut playback =
            PlaybackController::from_config(&config, ClockBackend::new(1000)).unwrap();
        let mut log = EventLog::new();
        keys.handle_key(
            KeyEvent::new(KeyCode::Char('1'), KeyModifiers::NONE),
            false,
            &mut playback,
            &mut log,
        );
        assert!(log.markers().is_empty());
        assert_eq!(keys.take_message().as_deref(), Some("No media loaded"));
    }
}
