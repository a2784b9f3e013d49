//! Reelkit CLI - Video API client and interaction replayer
//!
//! Features:
//! - Video details lookup
//! - Video actions (like, save, report, ...)
//! - Watch-time reports
//! - Deterministic replay of recorded touch traces

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;
mod replay;

/// Reelkit CLI - Video player interaction toolkit
#[derive(Parser)]
#[command(name = "reelkit")]
#[command(author = "Reelkit Developers")]
#[command(version)]
#[command(about = "Video API client and player interaction replayer", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text")]
    format: String,

    /// Settings file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch video details
    Details {
        /// Video ID
        video_id: String,
    },

    /// Perform a video action
    Action {
        /// Video ID
        video_id: String,

        /// Action (like, unlike, dislike, undislike, save, delete, report, share)
        action: String,

        /// Reason sent with a report
        #[arg(short, long)]
        reason: Option<String>,
    },

    /// Send a watch-time report
    Track {
        /// Video ID
        video_id: String,

        /// Cumulative watched seconds
        #[arg(short, long)]
        seconds: u64,

        /// Video type (reel, channel, post, story)
        #[arg(short = 't', long, default_value = "channel")]
        video_type: String,

        /// Media duration, used for the completion rate
        #[arg(short, long, default_value = "0")]
        duration_ms: u64,
    },

    /// Replay a recorded event trace against a simulated engine
    Replay {
        /// Trace file (JSON)
        trace: PathBuf,

        /// Simulated media duration
        #[arg(short, long, default_value = "120000")]
        duration_ms: u64,

        /// Engine status callback period
        #[arg(short, long, default_value = "250")]
        step_ms: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();

    reelkit_core::init();
    let settings = reelkit_core::Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Details { video_id } => {
            commands::details(&settings, &video_id, &cli.format).await?;
        }
        Commands::Action { video_id, action, reason } => {
            commands::action(&settings, &video_id, &action, reason, &cli.format).await?;
        }
        Commands::Track { video_id, seconds, video_type, duration_ms } => {
            commands::track(&settings, &video_id, seconds, &video_type, duration_ms, &cli.format)
                .await?;
        }
        Commands::Replay { trace, duration_ms, step_ms } => {
            commands::replay(&settings, &trace, duration_ms, step_ms, &cli.format)?;
        }
    }

    Ok(())
}
