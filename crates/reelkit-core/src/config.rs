//! Settings loading
//!
//! Settings come from an optional JSON file, then environment overrides:
//! `REELKIT_API_URL` and `REELKIT_API_TOKEN`.

use crate::types::PlayerConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const ENV_API_URL: &str = "REELKIT_API_URL";
pub const ENV_API_TOKEN: &str = "REELKIT_API_TOKEN";

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL the endpoint paths are joined to
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Bearer token, if the user is signed in
    pub auth_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/".to_string(),
            request_timeout_ms: 10_000,
            auth_token: None,
        }
    }
}

/// Everything a player screen needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub player: PlayerConfig,
    pub api: ApiConfig,
}

impl Settings {
    /// Load from a JSON file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => {
                debug!(path = %path.display(), "Loading settings");
                Self::from_json(&std::fs::read_to_string(path)?)?
            }
            None => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply overrides from a key lookup (the process environment in `load`)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
            self.api.base_url = url;
        }
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|v| !v.is_empty()) {
            self.api.auth_token = Some(token);
        }
    }

    pub fn validate(&self) -> Result<()> {
        let player = &self.player;
        if player.double_tap_window_ms == 0 {
            return Err(Error::InvalidConfig("double_tap_window_ms must be positive".into()));
        }
        if !(0.0..=1.0).contains(&player.rewind_zone)
            || !(0.0..=1.0).contains(&player.forward_zone)
            || player.rewind_zone > player.forward_zone
        {
            return Err(Error::InvalidConfig(format!(
                "skip zones must satisfy 0 <= rewind ({}) <= forward ({}) <= 1",
                player.rewind_zone, player.forward_zone
            )));
        }
        if player.watch_report_interval_secs == 0 {
            return Err(Error::InvalidConfig(
                "watch_report_interval_secs must be positive".into(),
            ));
        }
        if self.api.request_timeout_ms == 0 {
            return Err(Error::InvalidConfig("request_timeout_ms must be positive".into()));
        }
        Ok(())
    }
}
