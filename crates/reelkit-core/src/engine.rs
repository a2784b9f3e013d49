//! Media engine boundary
//!
//! The platform media element is driven through imperative commands and
//! reports back through status callbacks. `SimulatedEngine` is a
//! deterministic stand-in used by the CLI replay tool and tests.

use crate::types::{PlaybackStatus, StatusUpdate};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Imperative command for the media engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EngineCommand {
    Play,
    Pause,
    SetStatus(StatusUpdate),
}

impl std::fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineCommand::Play => write!(f, "play"),
            EngineCommand::Pause => write!(f, "pause"),
            EngineCommand::SetStatus(update) => write!(
                f,
                "set_status {} {}",
                crate::format::format_time(update.position_millis),
                if update.should_play { "playing" } else { "paused" }
            ),
        }
    }
}

/// Platform media element
pub trait MediaEngine: Send {
    /// True once the media source has loaded
    fn is_loaded(&self) -> bool;

    fn play(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    /// Set position and play state in one call
    fn set_status(&mut self, update: StatusUpdate) -> Result<()>;
}

/// Send a command to the engine.
///
/// Commands issued before the media is loaded are dropped. Other engine
/// failures are logged and not surfaced.
pub fn dispatch<E: MediaEngine + ?Sized>(engine: &mut E, command: EngineCommand) -> bool {
    if !engine.is_loaded() {
        debug!(?command, "Engine not ready, command dropped");
        return false;
    }

    let result = match command {
        EngineCommand::Play => engine.play(),
        EngineCommand::Pause => engine.pause(),
        EngineCommand::SetStatus(update) => engine.set_status(update),
    };

    match result {
        Ok(()) => true,
        Err(Error::EngineNotReady) => {
            debug!(?command, "Engine not ready, command dropped");
            false
        }
        Err(e) => {
            warn!(?command, error = %e, code = e.error_code(), "Engine command failed");
            false
        }
    }
}

/// In-memory engine that plays back time instead of media
#[derive(Debug, Clone, Default)]
pub struct SimulatedEngine {
    loaded: bool,
    position_millis: u64,
    duration_millis: u64,
    playing: bool,
    finished_pending: bool,
    commands: Vec<EngineCommand>,
}

impl SimulatedEngine {
    /// Engine with media of the given duration already loaded
    pub fn loaded(duration_millis: u64) -> Self {
        Self {
            loaded: true,
            duration_millis,
            ..Default::default()
        }
    }

    /// Engine that has not finished loading
    pub fn unloaded(duration_millis: u64) -> Self {
        Self {
            loaded: false,
            duration_millis,
            ..Default::default()
        }
    }

    pub fn finish_loading(&mut self) {
        self.loaded = true;
    }

    /// Every command accepted so far, in order
    pub fn commands(&self) -> &[EngineCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Current status as the platform callback would report it
    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            position_millis: self.position_millis,
            duration_millis: if self.loaded { self.duration_millis } else { 0 },
            is_playing: self.playing,
            did_just_finish: self.finished_pending,
            is_loaded: self.loaded,
            error: None,
        }
    }

    /// Advance the media clock and return the resulting status callback
    pub fn advance(&mut self, elapsed_millis: u64) -> PlaybackStatus {
        self.finished_pending = false;

        if self.loaded && self.playing {
            self.position_millis = (self.position_millis + elapsed_millis).min(self.duration_millis);
            if self.position_millis >= self.duration_millis {
                self.playing = false;
                self.finished_pending = true;
            }
        }

        self.status()
    }
}

impl MediaEngine for SimulatedEngine {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn play(&mut self) -> Result<()> {
        if !self.loaded {
            return Err(Error::EngineNotReady);
        }
        self.commands.push(EngineCommand::Play);
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        if !self.loaded {
            return Err(Error::EngineNotReady);
        }
        self.commands.push(EngineCommand::Pause);
        self.playing = false;
        Ok(())
    }

    fn set_status(&mut self, update: StatusUpdate) -> Result<()> {
        if !self.loaded {
            return Err(Error::EngineNotReady);
        }
        self.commands.push(EngineCommand::SetStatus(update));
        self.position_millis = update.position_millis.min(self.duration_millis);
        self.playing = update.should_play;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_drops_before_load() {
        let mut engine = SimulatedEngine::unloaded(10_000);
        assert!(!dispatch(&mut engine, EngineCommand::Play));
        assert!(engine.commands().is_empty());

        engine.finish_loading();
        assert!(dispatch(&mut engine, EngineCommand::Play));
        assert_eq!(engine.commands(), &[EngineCommand::Play]);
    }

    #[test]
    fn test_simulated_playback_finishes() {
        let mut engine = SimulatedEngine::loaded(1_000);
        engine.play().unwrap();

        let status = engine.advance(600);
        assert_eq!(status.position_millis, 600);
        assert!(status.is_playing);

        let status = engine.advance(600);
        assert_eq!(status.position_millis, 1_000);
        assert!(!status.is_playing);
        assert!(status.did_just_finish);

        // The finish flag is reported once
        assert!(!engine.advance(100).did_just_finish);
    }

    #[test]
    fn test_set_status_clamps_to_duration() {
        let mut engine = SimulatedEngine::loaded(5_000);
        engine
            .set_status(StatusUpdate { position_millis: 9_000, should_play: false })
            .unwrap();
        assert_eq!(engine.status().position_millis, 5_000);
        assert!(!engine.status().is_playing);
    }

    #[test]
    fn test_command_display() {
        let seek = EngineCommand::SetStatus(StatusUpdate { position_millis: 60_000, should_play: true });
        assert_eq!(seek.to_string(), "set_status 01:00 playing");
        assert_eq!(EngineCommand::Pause.to_string(), "pause");
    }
}
