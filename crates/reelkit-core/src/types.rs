//! Core types for Reelkit

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player screen instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Backend identifier of a video
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of video surface the player was opened from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoType {
    /// Short-form vertical video
    Reel,
    /// Long-form channel upload
    #[default]
    Channel,
    /// Video attached to a feed post
    Post,
    /// Story segment
    Story,
}

impl VideoType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "reel" | "reels" => Some(VideoType::Reel),
            "channel" | "video" => Some(VideoType::Channel),
            "post" => Some(VideoType::Post),
            "story" => Some(VideoType::Story),
            _ => None,
        }
    }
}

impl std::fmt::Display for VideoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoType::Reel => write!(f, "reel"),
            VideoType::Channel => write!(f, "channel"),
            VideoType::Post => write!(f, "post"),
            VideoType::Story => write!(f, "story"),
        }
    }
}

/// Status snapshot delivered by the media engine.
///
/// Owned by the engine. The controller only changes it indirectly through
/// play, pause and set-status commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackStatus {
    /// Current position in milliseconds
    pub position_millis: u64,
    /// Media duration in milliseconds, 0 while unknown
    pub duration_millis: u64,
    /// Engine is currently playing
    pub is_playing: bool,
    /// Playback reached the end during this update
    pub did_just_finish: bool,
    /// Media source finished loading
    pub is_loaded: bool,
    /// Decode or load failure reported by the engine
    pub error: Option<String>,
}

impl PlaybackStatus {
    /// A loaded status at the given position
    pub fn loaded(position_millis: u64, duration_millis: u64, is_playing: bool) -> Self {
        Self {
            position_millis,
            duration_millis,
            is_playing,
            did_just_finish: false,
            is_loaded: true,
            error: None,
        }
    }
}

/// Combined position and play-state command for the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub position_millis: u64,
    pub should_play: bool,
}

/// Playback phases of a single player screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    /// Nothing loaded yet
    Idle,
    /// Engine reports playing
    Playing,
    /// Engine reports paused
    Paused,
    /// User is dragging the progress bar
    Seeking,
    /// Playback reached the end of the media
    Finished,
}

impl PlaybackPhase {
    /// Check if transition to target phase is valid
    pub fn can_transition_to(&self, target: PlaybackPhase) -> bool {
        use PlaybackPhase::*;
        matches!(
            (self, target),
            // From Idle
            (Idle, Playing) | (Idle, Paused) | (Idle, Finished) |
            // From Playing
            (Playing, Paused) | (Playing, Seeking) | (Playing, Finished) |
            // From Paused
            (Paused, Playing) | (Paused, Seeking) | (Paused, Finished) |
            // From Seeking
            (Seeking, Playing) | (Seeking, Paused) |
            // From Finished
            (Finished, Playing) | (Finished, Paused) | (Finished, Seeking)
        )
    }
}

impl std::fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackPhase::Idle => write!(f, "idle"),
            PlaybackPhase::Playing => write!(f, "playing"),
            PlaybackPhase::Paused => write!(f, "paused"),
            PlaybackPhase::Seeking => write!(f, "seeking"),
            PlaybackPhase::Finished => write!(f, "finished"),
        }
    }
}

/// Direction of a double-tap skip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipDirection {
    Rewind,
    Forward,
}

/// Player interaction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Two taps closer than this are a double tap (milliseconds)
    pub double_tap_window_ms: u64,
    /// Skip step for double taps (milliseconds)
    pub skip_step_ms: u64,
    /// Double taps left of this fraction of the width rewind
    pub rewind_zone: f64,
    /// Double taps right of this fraction of the width skip forward
    pub forward_zone: f64,
    /// How long the skip feedback icon stays up (milliseconds)
    pub seek_feedback_ms: u64,
    /// How long a toast stays up (milliseconds)
    pub toast_duration_ms: u64,
    /// Watch-time reporting interval (seconds)
    pub watch_report_interval_secs: u64,
    /// Start playing once the media is loaded
    pub autoplay: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            double_tap_window_ms: 300,
            skip_step_ms: 10_000,
            rewind_zone: 0.4,
            forward_zone: 0.6,
            seek_feedback_ms: 800,
            toast_duration_ms: 3_000,
            watch_report_interval_secs: 5,
            autoplay: true,
        }
    }
}
