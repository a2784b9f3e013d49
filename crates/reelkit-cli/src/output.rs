//! Output formatting for CLI

use console::style;
use reelkit_core::{ActionOutcome, VideoDetails};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::replay::ReplayReport;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

/// Pretty JSON, falling back to an empty object
pub fn to_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
}

pub fn details_text(details: &VideoDetails) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", style(&details.title).bold()));
    out.push_str(&format!("  ID: {}\n", details.id));
    out.push_str(&format!("  Type: {}\n", details.video_type));
    out.push_str(&format!(
        "  Duration: {}\n",
        reelkit_core::format_time(details.duration_millis)
    ));
    out.push_str(&format!("  Media: {}\n", details.media_url));
    out.push_str(&format!(
        "  Likes: {}{}\n",
        details.likes_count,
        if details.is_liked { " (liked)" } else { "" }
    ));
    out.push_str(&format!(
        "  Dislikes: {}{}\n",
        details.dislikes_count,
        if details.is_disliked { " (disliked)" } else { "" }
    ));
    out.push_str(&format!("  Saved: {}\n", details.is_saved));
    out.push_str(&format!("  Subscribed: {}\n", details.is_subscribed));
    if let Some(created) = details.created_at {
        out.push_str(&format!("  Created: {}\n", created.to_rfc3339()));
    }
    out
}

pub fn outcome_text(action: &str, outcome: &ActionOutcome) -> String {
    let mut out = format!("{} {}\n", style("✓").green(), action);
    if let Some(flag) = outcome.flag {
        out.push_str(&format!("  Flag: {}\n", flag));
    }
    if let Some(count) = outcome.count {
        out.push_str(&format!("  Count: {}\n", count));
    }
    if let Some(ref message) = outcome.message {
        out.push_str(&format!("  Message: {}\n", message));
    }
    out
}

#[derive(Tabled)]
struct CommandRow {
    #[tabled(rename = "At")]
    at: String,
    #[tabled(rename = "Command")]
    command: String,
}

pub fn replay_text(report: &ReplayReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", style("Engine commands").bold()));
    if report.commands.is_empty() {
        out.push_str("  (none)\n");
    } else {
        let rows = report.commands.iter().map(|logged| CommandRow {
            at: format!("{} ms", logged.at_ms),
            command: logged.command.to_string(),
        });
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        out.push_str(&format!("{}\n", table));
    }

    let view = &report.view;
    out.push_str(&format!("\n{}\n", style("Final view").bold()));
    out.push_str(&format!("  Phase: {}\n", view.phase));
    out.push_str(&format!(
        "  Position: {} / {} ({:.1}%)\n",
        view.position_label,
        view.duration_label,
        view.progress * 100.0
    ));
    out.push_str(&format!("  Playing: {}\n", view.is_playing));
    out.push_str(&format!("  Dragging: {}\n", view.is_dragging));
    out.push_str(&format!("  Controls visible: {}\n", view.controls_visible));
    out.push_str(&format!("  Fullscreen: {}\n", view.fullscreen));
    if let Some(direction) = view.seek_feedback {
        out.push_str(&format!("  Skip feedback: {:?}\n", direction));
    }
    out.push_str(&format!("  Watched: {}s\n", report.watched_secs));
    out
}
