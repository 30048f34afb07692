//! Interactive terminal reviewer.
//!
//! Runs a [`ReviewSession`] over a [`ClockBackend`] in the alternate screen,
//! with raw mode and mouse capture, until the reviewer quits or the process
//! is asked to terminate. Events are saved on the way out.

use std::io::{self, Stdout, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use signal_hook::consts::{SIGHUP, SIGTERM};
use tracing::{info, warn};

use super::ReviewSession;
use crate::config::Config;
use crate::error::ReviewError;
use crate::events::{to_literal, Markers};
use crate::files::SaveOutcome;
use crate::input::InputResult;
use crate::media::ClockBackend;

/// How long to wait for input while not playing.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// How a review ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewResult {
    /// The reviewer quit; carries what the final save did
    Finished(SaveOutcome),
    /// SIGTERM or SIGHUP; events were still saved
    Terminated(SaveOutcome),
}

/// Restores the terminal when dropped, including on panic unwinds.
struct TerminalGuard;

impl TerminalGuard {
    fn enter(out: &mut Stdout) -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        if let Err(err) = execute!(out, EnterAlternateScreen, EnableMouseCapture, Hide) {
            disable_raw_mode().ok();
            return Err(err).context("Failed to enter alternate screen");
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        disable_raw_mode().ok();
        execute!(io::stdout(), Show, DisableMouseCapture, LeaveAlternateScreen).ok();
    }
}

/// Review `video` interactively.
///
/// The virtual transport runs for `duration_ms`. With `events`, that file is
/// loaded after the video instead of any auto-discovered one.
pub fn run_review(
    config: Config,
    video: &Path,
    duration_ms: u64,
    events: Option<&Path>,
) -> Result<ReviewResult> {
    let mut session = ReviewSession::new(config, ClockBackend::new(duration_ms))
        .context("Invalid configuration")?;
    session
        .load_video(video)
        .with_context(|| format!("Failed to open {}", video.display()))?;
    if let Some(path) = events {
        session
            .load_events(path)
            .with_context(|| format!("Failed to load events from {}", path.display()))?;
    }

    let terminate = Arc::new(AtomicBool::new(false));
    for signal in [SIGTERM, SIGHUP] {
        signal_hook::flag::register(signal, Arc::clone(&terminate))
            .context("Failed to register signal handler")?;
    }

    let mut stdout = io::stdout();
    let loop_result = {
        let _guard = TerminalGuard::enter(&mut stdout)?;
        let (cols, rows) = terminal::size().unwrap_or((80, 24));
        session.set_size(cols, rows);
        event_loop(&mut session, &mut stdout, &terminate)
    };

    // Save even when the loop failed
    let outcome = session.close();
    if let Err(e) = &loop_result {
        warn!(error = %e, "review loop ended with an error");
    }
    if let Err(e) = &outcome {
        warn!(error = %e, "final save failed");
        eprintln!("{}", save_failure_notice(e, session.log().markers()));
    }
    let terminated = loop_result?;
    let outcome = outcome.context("Failed to save events")?;
    info!(?outcome, terminated, "review finished");

    Ok(if terminated {
        ReviewResult::Terminated(outcome)
    } else {
        ReviewResult::Finished(outcome)
    })
}

/// Shown on stderr after the terminal is restored when the final save
/// failed, so the markers can still be copied by hand.
fn save_failure_notice(err: &ReviewError, markers: &Markers) -> String {
    format!(
        "Could not save events ({}). Copy them manually:\n{}",
        err,
        to_literal(markers)
    )
}

/// Returns `true` if a signal ended the loop.
fn event_loop(
    session: &mut ReviewSession<ClockBackend>,
    out: &mut impl Write,
    terminate: &AtomicBool,
) -> Result<bool> {
    let mut update = session.tick();
    session.render(out, &update)?;

    loop {
        if terminate.load(Ordering::Relaxed) {
            return Ok(true);
        }

        let timeout = session.playback().poll_interval().unwrap_or(IDLE_POLL);
        if event::poll(timeout)? {
            let ev = event::read()?;
            if session.handle_event(ev) == InputResult::Quit {
                return Ok(false);
            }
        }

        update = session.tick();
        session.render(out, &update)?;
    }
}
