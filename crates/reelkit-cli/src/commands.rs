//! CLI command implementations

use anyhow::{anyhow, Context};
use reelkit_core::{
    watch_time::completion_rate, ApiClient, Settings, VideoAction, VideoId, VideoType, WatchReport,
};
use std::path::Path;

use crate::output::{self, OutputFormat};
use crate::replay::{self, Trace};

/// Fetch and print video details
pub async fn details(settings: &Settings, video_id: &str, format: &str) -> anyhow::Result<()> {
    let client = ApiClient::new(&settings.api)?;
    let details = client
        .video_details(&VideoId::new(video_id))
        .await
        .with_context(|| format!("Failed to fetch details for {}", video_id))?;

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", output::to_json(&details)),
        OutputFormat::Text => print!("{}", output::details_text(&details)),
    }
    Ok(())
}

/// Perform a video action
pub async fn action(
    settings: &Settings,
    video_id: &str,
    action: &str,
    reason: Option<String>,
    format: &str,
) -> anyhow::Result<()> {
    let action = VideoAction::from_str(action).ok_or_else(|| {
        let known: Vec<&str> = VideoAction::ALL.iter().map(|a| a.path()).collect();
        anyhow!("Unknown action '{}' (expected one of: {})", action, known.join(", "))
    })?;

    let client = ApiClient::new(&settings.api)?;
    let outcome = client
        .perform_action(&VideoId::new(video_id), action, reason)
        .await
        .map_err(|e| anyhow!("{} failed: {}", action, e.user_message()))?;

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", output::to_json(&outcome)),
        OutputFormat::Text => print!("{}", output::outcome_text(action.path(), &outcome)),
    }
    Ok(())
}

/// Send one cumulative watch-time report
pub async fn track(
    settings: &Settings,
    video_id: &str,
    seconds: u64,
    video_type: &str,
    duration_ms: u64,
    format: &str,
) -> anyhow::Result<()> {
    let video_type = VideoType::from_str(video_type)
        .ok_or_else(|| anyhow!("Unknown video type '{}'", video_type))?;

    let report = WatchReport {
        video_id: VideoId::new(video_id),
        video_type,
        watch_duration: seconds,
        completion_rate: completion_rate(seconds.saturating_mul(1000), duration_ms),
    };

    let client = ApiClient::new(&settings.api)?;
    client
        .track_watch(&report)
        .await
        .context("Watch-time report rejected")?;

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", output::to_json(&report)),
        OutputFormat::Text => println!(
            "Reported {}s on {} ({:.2}% complete)",
            report.watch_duration, report.video_id, report.completion_rate
        ),
    }
    Ok(())
}

/// Replay a trace file against a simulated engine
pub fn replay(
    settings: &Settings,
    path: &Path,
    duration_ms: u64,
    step_ms: u64,
    format: &str,
) -> anyhow::Result<()> {
    let trace = Trace::load(path)?;
    let report = replay::run(&trace, settings.player.clone(), duration_ms, step_ms)?;

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", output::to_json(&report)),
        OutputFormat::Text => print!("{}", output::replay_text(&report)),
    }
    Ok(())
}
