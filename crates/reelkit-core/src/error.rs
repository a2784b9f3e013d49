//! Error types for Reelkit Core

use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fallback shown to the user when the server gave no message
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    // Engine errors
    #[error("Media engine not ready")]
    EngineNotReady,

    #[error("Media engine error: {0}")]
    Engine(String),

    // Playback errors
    #[error("Invalid playback state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    // API errors
    #[error("API request failed ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Api { status: u16, message: Option<String> },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an API error from a status code and optional server message
    pub fn api(status: u16, message: Option<String>) -> Self {
        Error::Api {
            status,
            message: message.filter(|m| !m.trim().is_empty()),
        }
    }

    /// Returns true if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::EngineNotReady | Error::Network(_) => true,
            Error::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns the error code for logs and telemetry
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::EngineNotReady => "ENGINE_NOT_READY",
            Error::Engine(_) => "ENGINE",
            Error::InvalidStateTransition { .. } => "INVALID_STATE",
            Error::Api { .. } => "API",
            Error::Network(_) => "NETWORK",
            Error::Decode(_) => "DECODE",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Internal(_) => "INTERNAL",
            Error::Io(_) => "IO",
        }
    }

    /// Message suitable for a transient toast.
    ///
    /// Uses the server-provided message when there is one.
    pub fn user_message(&self) -> String {
        match self {
            Error::Api {
                message: Some(message),
                ..
            } => message.clone(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}
