//! vidloop CLI - loop-mode playback demo
//!
//! Features:
//! - Real-time playback of a simulated session with native or manual looping
//! - Deterministic replay of user actions (toggle loop, play/pause, faults)
//! - Player property inspection
//! - Lifecycle event log in text, table or JSON form

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vidloop_core::{LoopMode, PlayerConfig};

mod commands;
mod output;

use output::OutputFormat;

/// Media length used by the simulated engine, in seconds
const DEFAULT_MEDIA_DURATION: &str = "15";

/// vidloop CLI - video loop-mode playground
#[derive(Parser)]
#[command(name = "vidloop")]
#[command(author = "Purple Squirrel Media")]
#[command(version)]
#[command(about = "Drive a video playback session and log its lifecycle events", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json, table)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// JSON player configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a simulated session in real time
    Play {
        /// Media URL
        #[arg(short, long)]
        source: Option<String>,

        /// Loop mode at startup (native, manual)
        #[arg(short, long)]
        mode: Option<LoopMode>,

        /// Stop after this many end-of-media events (0 = until Ctrl-C)
        #[arg(short, long, default_value = "3")]
        loops: usize,

        /// Simulated media length in seconds
        #[arg(short, long, default_value = DEFAULT_MEDIA_DURATION)]
        duration: f64,

        /// Tick interval in milliseconds
        #[arg(short, long, default_value = "100")]
        tick_ms: u64,
    },

    /// Replay actions against a session
    ///
    /// Actions: toggle-loop, play, pause, toggle-play, advance:<secs>, end,
    /// fail:<msg>, volume:<0-1>, mute, unmute, rate:<r>, source:<url>
    Script {
        /// Actions in order
        #[arg(required = true)]
        actions: Vec<String>,

        /// Loop mode at startup (native, manual)
        #[arg(short, long)]
        mode: Option<LoopMode>,

        /// Simulated media length in seconds
        #[arg(short, long, default_value = DEFAULT_MEDIA_DURATION)]
        duration: f64,
    },

    /// Show the properties of a freshly loaded player
    Inspect {
        /// Media URL
        #[arg(short, long)]
        source: Option<String>,

        /// Simulated media length in seconds
        #[arg(short, long, default_value = DEFAULT_MEDIA_DURATION)]
        duration: f64,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<PlayerConfig> {
    match path {
        Some(path) => Ok(PlayerConfig::from_json_file(path)?),
        None => Ok(PlayerConfig::default()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    vidloop_core::init();

    let format = OutputFormat::from(cli.format.as_str());
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Play { source, mode, loops, duration, tick_ms } => {
            if let Some(source) = source {
                config.source = source;
            }
            if let Some(mode) = mode {
                config.initial_mode = mode;
            }
            commands::play(&config, duration, loops, tick_ms, format).await?;
        }
        Commands::Script { actions, mode, duration } => {
            if let Some(mode) = mode {
                config.initial_mode = mode;
            }
            commands::script(&config, duration, &actions, format)?;
        }
        Commands::Inspect { source, duration } => {
            if let Some(source) = source {
                config.source = source;
            }
            commands::inspect(&config, duration, format)?;
        }
    }

    Ok(())
}
