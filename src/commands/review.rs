//! Review subcommand handler

use anyhow::{bail, Result};
use std::path::Path;

use evtmkr::files::SaveOutcome;
use evtmkr::review::{run_review, ReviewResult};
use evtmkr::Config;

/// Open `video` in the interactive reviewer and report the final save.
#[cfg(not(tarpaulin_include))]
pub fn handle_review(
    config: Config,
    video: &Path,
    duration_ms: u64,
    events: Option<&Path>,
) -> Result<()> {
    if !video.exists() {
        bail!("Video not found: {}", video.display());
    }
    if duration_ms == 0 {
        bail!("--duration must be greater than 0");
    }

    let result = run_review(config, video, duration_ms, events)?;
    let (outcome, terminated) = match result {
        ReviewResult::Finished(outcome) => (outcome, false),
        ReviewResult::Terminated(outcome) => (outcome, true),
    };

    match outcome {
        SaveOutcome::Empty => println!("No markers to save."),
        SaveOutcome::Unchanged(path) => println!("Events up to date: {}", path.display()),
        SaveOutcome::Written(path) => println!("Saved events to {}", path.display()),
    }
    if terminated {
        eprintln!("Review ended by signal.");
    }
    Ok(())
}
