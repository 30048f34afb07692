//! End-to-end review sessions through the library API

use std::fs;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use evtmkr::files::read_event_file;
use evtmkr::input::InputResult;
use evtmkr::{ClockBackend, Config, EventStore, ReviewSession, SaveOutcome};

use crate::helpers::Workspace;

fn press(session: &mut ReviewSession<ClockBackend>, code: KeyCode, modifiers: KeyModifiers) {
    session.handle_event(Event::Key(KeyEvent::new(code, modifiers)));
}

fn session(config: Config) -> ReviewSession<ClockBackend> {
    let store = EventStore::from_config(&config).unwrap();
    ReviewSession::with_store(config, ClockBackend::new(120_000), store).unwrap()
}

fn config(ws: &Workspace) -> Config {
    Config::load_from(&ws.config_path()).unwrap()
}

#[test]
fn review_marks_edits_and_persists() {
    let ws = Workspace::new();
    let video = ws.write("clip.mp4", "");
    let mut s = session(config(&ws));
    s.load_video(&video).unwrap();

    // Mark frames 0, 1 and 7 with key 1, then move the last one to key 2
    press(&mut s, KeyCode::Char('1'), KeyModifiers::NONE);
    press(&mut s, KeyCode::Right, KeyModifiers::NONE);
    press(&mut s, KeyCode::Char('1'), KeyModifiers::NONE);
    press(&mut s, KeyCode::Down, KeyModifiers::NONE);
    press(&mut s, KeyCode::Char('1'), KeyModifiers::NONE);
    let frame = s.playback().current_frame();
    press(&mut s, KeyCode::Char('2'), KeyModifiers::NONE);

    assert_eq!(s.log().markers().get("1"), Some(&[0, 1][..]));
    assert_eq!(s.log().markers().get("2"), Some(&[frame][..]));

    // One undo reverses the move
    press(&mut s, KeyCode::Char('z'), KeyModifiers::CONTROL);
    assert_eq!(s.log().markers().get("1"), Some(&[0, 1, frame][..]));
    press(&mut s, KeyCode::Char('z'), KeyModifiers::CONTROL | KeyModifiers::SHIFT);
    assert_eq!(s.log().markers().get("2"), Some(&[frame][..]));

    let outcome = s.close().unwrap();
    let path = ws.save_dir().join("event-clip.txt");
    assert_eq!(outcome, SaveOutcome::Written(path.clone()));
    assert_eq!(read_event_file(&path).unwrap(), s.log().export());

    // A fresh session finds and loads the same events
    let mut again = session(config(&ws));
    assert_eq!(again.load_video(&video).unwrap(), Some(path));
    assert_eq!(again.log().export(), s.log().export());
    assert!(again.log().undo_stack().is_empty());
}

#[test]
fn second_save_without_changes_is_unchanged() {
    let ws = Workspace::new();
    let video = ws.write("clip.mp4", "");
    let mut s = session(config(&ws));
    s.load_video(&video).unwrap();
    press(&mut s, KeyCode::Char('3'), KeyModifiers::NONE);

    assert!(matches!(s.save().unwrap(), SaveOutcome::Written(_)));
    assert!(matches!(s.save().unwrap(), SaveOutcome::Unchanged(_)));
}

#[test]
fn task_pattern_finds_events_in_events_dir() {
    let ws = Workspace::new();
    let events_dir = ws.path().join("shared");
    fs::create_dir_all(&events_dir).unwrap();
    fs::write(
        events_dir.join("event-20250312-Pici-BBT-left-3.txt"),
        "{'1': [42]}",
    )
    .unwrap();
    let video = ws.write("20250312-Pici-BBT-left-3_cam2.mp4", "");

    let mut config = config(&ws);
    config.workspace.events_dir = Some(events_dir);
    config.workspace.task_pattern =
        Some(r"2025\d{4}-(Pici|Fusillo)-(TS|BBT|Brinkman|Pull).*?-\d{1,2}".to_string());

    let mut s = session(config);
    assert!(s.load_video(&video).unwrap().is_some());
    assert_eq!(s.log().markers().get("1"), Some(&[42][..]));
}

#[test]
fn quit_key_ends_the_session() {
    let ws = Workspace::new();
    let mut s = session(config(&ws));
    let result = s.handle_event(Event::Key(KeyEvent::new(
        KeyCode::Char('q'),
        KeyModifiers::NONE,
    )));
    assert_eq!(result, InputResult::Quit);
}
