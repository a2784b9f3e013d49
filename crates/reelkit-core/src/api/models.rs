//! Request and response bodies of the video REST API

use crate::types::{VideoId, VideoType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Response envelope shared by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

fn default_success() -> bool {
    true
}

/// Video metadata from `GET /videos/details`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDetails {
    pub id: VideoId,
    pub title: String,
    #[serde(default)]
    pub video_type: VideoType,
    /// Duration in milliseconds, 0 if the backend does not know it
    #[serde(default)]
    pub duration_millis: u64,
    pub media_url: Url,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub is_disliked: bool,
    #[serde(default)]
    pub is_saved: bool,
    #[serde(default)]
    pub is_subscribed: bool,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub dislikes_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Mutations exposed under `POST /videos/action/{action}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoAction {
    Like,
    Unlike,
    Dislike,
    Undislike,
    Save,
    Delete,
    Report,
    Share,
}

impl VideoAction {
    pub const ALL: [VideoAction; 8] = [
        VideoAction::Like,
        VideoAction::Unlike,
        VideoAction::Dislike,
        VideoAction::Undislike,
        VideoAction::Save,
        VideoAction::Delete,
        VideoAction::Report,
        VideoAction::Share,
    ];

    /// Path segment of the action endpoint
    pub fn path(&self) -> &'static str {
        match self {
            VideoAction::Like => "like",
            VideoAction::Unlike => "unlike",
            VideoAction::Dislike => "dislike",
            VideoAction::Undislike => "undislike",
            VideoAction::Save => "save",
            VideoAction::Delete => "delete",
            VideoAction::Report => "report",
            VideoAction::Share => "share",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.path().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for VideoAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Body of an action request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub video_id: VideoId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Small flag/count payload returned by an action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionOutcome {
    /// New value of the toggled flag, when the server reports it
    pub flag: Option<bool>,
    /// New counter value, when the server reports it
    pub count: Option<u64>,
    pub message: Option<String>,
}
