//! evtmkr - frame-accurate event marking for video review

mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use evtmkr::logging::init_logging;
use evtmkr::Config;

#[derive(Parser)]
#[command(name = "evtmkr")]
#[command(about = "Mark events on video frames from the terminal")]
#[command(version)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Review a video and mark events on its frames
    Review {
        /// Video file to review
        video: PathBuf,

        /// Length of the video in milliseconds
        #[arg(short, long, value_name = "MS")]
        duration: u64,

        /// Load this event file instead of searching for one
        #[arg(short, long, value_name = "FILE")]
        events: Option<PathBuf>,

        /// Log file for the session [default: <data dir>/evtmkr/evtmkr.log]
        #[arg(long, value_name = "FILE")]
        log_file: Option<PathBuf>,
    },

    /// Inspect event files
    #[command(subcommand)]
    Events(EventsCommands),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum EventsCommands {
    /// List the markers in an event file
    Show {
        /// Event file to show
        file: PathBuf,

        /// Frame rate for timestamps [default: playback.fps]
        #[arg(long)]
        fps: Option<f64>,
    },

    /// Print where the events for a video are saved
    Path {
        /// Video file
        video: PathBuf,
    },

    /// Check that an event file can be read
    Check {
        /// Event file to check
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a config file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(not(tarpaulin_include))]
fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_file = cli.config.as_deref();

    match cli.command {
        Commands::Review {
            video,
            duration,
            events,
            log_file,
        } => {
            let log_file = log_file.unwrap_or_else(Config::default_log_path);
            init_logging(cli.verbose, Some(&log_file));
            let config = commands::load_config(config_file)?;
            commands::review::handle_review(config, &video, duration, events.as_deref())
        }
        Commands::Events(cmd) => {
            init_logging(cli.verbose, None);
            let config = commands::load_config(config_file)?;
            match cmd {
                EventsCommands::Show { file, fps } => {
                    commands::events::handle_show(&config, &file, fps)
                }
                EventsCommands::Path { video } => commands::events::handle_path(&config, &video),
                EventsCommands::Check { file } => commands::events::handle_check(&file),
            }
        }
        Commands::Config(cmd) => {
            init_logging(cli.verbose, None);
            match cmd {
                ConfigCommands::Show => commands::config::handle_show(config_file),
                ConfigCommands::Path => commands::config::handle_path(config_file),
                ConfigCommands::Init { force } => {
                    commands::config::handle_init(config_file, force)
                }
            }
        }
        Commands::Completions { shell } => {
            commands::completions::handle_completions(shell, Cli::command());
            Ok(())
        }
    }
}
