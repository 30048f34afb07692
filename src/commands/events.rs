//! Event file subcommands handler

use anyhow::{Context, Result};
use std::path::Path;

use evtmkr::clock::format_timestamp;
use evtmkr::files::{read_event_file, EventStore};
use evtmkr::{Config, EventLog, FrameClock};

/// Print the markers in an event file with their timestamps.
///
/// Times use `fps` if given, else the configured review rate.
#[cfg(not(tarpaulin_include))]
pub fn handle_show(config: &Config, file: &Path, fps: Option<f64>) -> Result<()> {
    let clock = FrameClock::new(
        fps.unwrap_or(config.playback.fps),
        config.playback.video_fps_original,
    )?;

    let markers = read_event_file(file)
        .with_context(|| format!("Failed to read events from {}", file.display()))?;
    let mut log = EventLog::with_pairing(config.pairing()?);
    log.import(markers);

    println!("{}", file.display());
    if log.markers().is_empty() {
        println!("  (no markers)");
        return Ok(());
    }

    for track in log.markers().tracks().iter().filter(|t| !t.frames().is_empty()) {
        println!("  {} ({})", track.key(), track.frames().len());
        for &frame in track.frames() {
            println!(
                "    {:>8}  {}",
                frame,
                format_timestamp(clock.frame_to_time(frame))
            );
        }
    }

    let spans = log.pairs();
    if !spans.is_empty() {
        println!("  pairs");
        for span in spans {
            println!(
                "    {}:{} -> {}:{}",
                span.start_key, span.start, span.end_key, span.end
            );
        }
    }
    Ok(())
}

/// Print the event file path for a video, and any existing file found for it.
#[cfg(not(tarpaulin_include))]
pub fn handle_path(config: &Config, video: &Path) -> Result<()> {
    let store = EventStore::from_config(config)?;
    println!("{}", store.event_path(video).display());
    if let Some(found) = store.discover(video) {
        if found != store.event_path(video) {
            println!("existing: {}", found.display());
        }
    }
    Ok(())
}

/// Check that an event file parses; prints a summary.
#[cfg(not(tarpaulin_include))]
pub fn handle_check(file: &Path) -> Result<()> {
    let markers = read_event_file(file)
        .with_context(|| format!("{} is not a valid event file", file.display()))?;
    let keys = markers
        .tracks()
        .iter()
        .filter(|t| !t.frames().is_empty())
        .count();
    println!(
        "{}: ok ({} markers, {} keys)",
        file.display(),
        markers.len(),
        keys
    );
    Ok(())
}
