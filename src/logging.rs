//! Tracing subscriber setup.
//!
//! The filter comes from `EVTMKR_LOG`, then `RUST_LOG`, then the verbosity
//! flag. Interactive reviews log to a file so output does not tear the
//! terminal UI; everything else logs to stderr.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn env_filter(verbose: bool) -> EnvFilter {
    std::env::var("EVTMKR_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| {
                if verbose {
                    EnvFilter::new("debug")
                } else {
                    EnvFilter::new("info")
                }
            },
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info")),
        )
}

/// Install the global subscriber.
///
/// With `log_file`, events are appended to that file (its directory is
/// created if needed); if it cannot be opened, logging falls back to stderr.
/// Calling this more than once keeps the first subscriber.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) {
    let filter = env_filter(verbose);

    let file = log_file.and_then(|path| {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(file),
            Err(err) => {
                eprintln!("Failed to open log file {}: {}", path.display(), err);
                None
            }
        }
    });

    let result = match file {
        Some(file) => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        None => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    };

    if let Err(err) = result {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}
