//! Playback state reconciliation
//!
//! Merges asynchronous engine status callbacks with locally initiated drag
//! state. The engine is authoritative for position and play state; while a
//! drag is active the phase stays `Seeking` and display comes from the seek
//! coordinator instead.

use crate::types::{PlaybackPhase, PlaybackStatus};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Named inputs of the playback state machine
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Status callback from the media engine
    EngineStatus(PlaybackStatus),
    /// User started dragging the progress bar
    DragStarted,
    /// Drag committed; `resume` is the play state captured at drag start
    DragEnded { resume: bool },
}

/// What a transition changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reconciled {
    /// Something visible changed and a re-render is due
    pub changed: bool,
    /// Engine reported the end of the media in this update
    pub finished: bool,
}

/// Live playback state as last reported by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackMachine {
    phase: PlaybackPhase,
    position_millis: u64,
    duration_millis: u64,
    is_playing: bool,
    is_loaded: bool,
}

impl Default for PlaybackMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackMachine {
    pub fn new() -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            position_millis: 0,
            duration_millis: 0,
            is_playing: false,
            is_loaded: false,
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn position_millis(&self) -> u64 {
        self.position_millis
    }

    pub fn duration_millis(&self) -> u64 {
        self.duration_millis
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    /// Live state in engine status form
    pub fn live_status(&self) -> PlaybackStatus {
        PlaybackStatus {
            position_millis: self.position_millis,
            duration_millis: self.duration_millis,
            is_playing: self.is_playing,
            did_just_finish: false,
            is_loaded: self.is_loaded,
            error: None,
        }
    }

    /// Apply a transition.
    ///
    /// Invalid phase transitions are rejected and leave the state untouched.
    pub fn apply(&mut self, transition: Transition) -> Result<Reconciled> {
        match transition {
            Transition::EngineStatus(status) => Ok(self.on_engine_status(status)),
            Transition::DragStarted => {
                self.set_phase(PlaybackPhase::Seeking)?;
                Ok(Reconciled {
                    changed: true,
                    finished: false,
                })
            }
            Transition::DragEnded { resume } => {
                let target = if resume {
                    PlaybackPhase::Playing
                } else {
                    PlaybackPhase::Paused
                };
                self.set_phase(target)?;
                Ok(Reconciled {
                    changed: true,
                    finished: false,
                })
            }
        }
    }

    fn on_engine_status(&mut self, status: PlaybackStatus) -> Reconciled {
        let mut outcome = Reconciled::default();

        if let Some(ref error) = status.error {
            warn!(error = %error, position = status.position_millis, "Media engine reported an error");
        }

        if status.is_loaded != self.is_loaded {
            self.is_loaded = status.is_loaded;
            outcome.changed = true;
        }

        // Duration is fixed for a media source
        if self.duration_millis == 0 && status.duration_millis > 0 {
            self.duration_millis = status.duration_millis;
            outcome.changed = true;
        }

        if status.position_millis != self.position_millis {
            self.position_millis = status.position_millis;
            outcome.changed = true;
        }

        if status.did_just_finish {
            if self.is_playing {
                self.is_playing = false;
                outcome.changed = true;
            }
            outcome.finished = true;
            if self.phase != PlaybackPhase::Seeking && self.phase != PlaybackPhase::Finished {
                self.force_phase(PlaybackPhase::Finished);
                outcome.changed = true;
            }
            return outcome;
        }

        if status.is_playing != self.is_playing {
            self.is_playing = status.is_playing;
            outcome.changed = true;
        }

        if let Some(target) = self.phase_from_engine() {
            if target != self.phase && self.set_phase(target).is_ok() {
                outcome.changed = true;
            }
        }

        outcome
    }

    /// Phase implied by the engine, None when local state wins
    fn phase_from_engine(&self) -> Option<PlaybackPhase> {
        match self.phase {
            PlaybackPhase::Seeking => None,
            _ if !self.is_loaded => None,
            PlaybackPhase::Finished if !self.is_playing && self.is_at_end() => None,
            _ if self.is_playing => Some(PlaybackPhase::Playing),
            _ => Some(PlaybackPhase::Paused),
        }
    }

    /// Position has reached the end of the media
    fn is_at_end(&self) -> bool {
        self.duration_millis == 0 || self.position_millis >= self.duration_millis
    }

    fn set_phase(&mut self, target: PlaybackPhase) -> Result<()> {
        if !self.phase.can_transition_to(target) {
            return Err(Error::InvalidStateTransition {
                from: self.phase.to_string(),
                to: target.to_string(),
            });
        }
        self.force_phase(target);
        Ok(())
    }

    fn force_phase(&mut self, target: PlaybackPhase) {
        info!(from = %self.phase, to = %target, "Playback phase transition");
        self.phase = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(position: u64, playing: bool) -> Transition {
        Transition::EngineStatus(PlaybackStatus::loaded(position, 120_000, playing))
    }

    #[test]
    fn test_load_moves_out_of_idle() {
        let mut m = PlaybackMachine::new();
        let out = m.apply(status(0, true)).unwrap();
        assert!(out.changed);
        assert_eq!(m.phase(), PlaybackPhase::Playing);
        assert_eq!(m.duration_millis(), 120_000);

        let mut m = PlaybackMachine::new();
        m.apply(status(0, false)).unwrap();
        assert_eq!(m.phase(), PlaybackPhase::Paused);
    }

    #[test]
    fn test_unloaded_status_stays_idle() {
        let mut m = PlaybackMachine::new();
        m.apply(Transition::EngineStatus(PlaybackStatus::default())).unwrap();
        assert_eq!(m.phase(), PlaybackPhase::Idle);
    }

    #[test]
    fn test_duration_captured_once() {
        let mut m = PlaybackMachine::new();
        m.apply(status(0, true)).unwrap();
        m.apply(Transition::EngineStatus(PlaybackStatus::loaded(100, 90_000, true)))
            .unwrap();
        assert_eq!(m.duration_millis(), 120_000);
    }

    #[test]
    fn test_identical_status_is_not_a_change() {
        let mut m = PlaybackMachine::new();
        m.apply(status(500, true)).unwrap();
        let out = m.apply(status(500, true)).unwrap();
        assert!(!out.changed);
    }

    #[test]
    fn test_engine_wins_outside_drag() {
        let mut m = PlaybackMachine::new();
        m.apply(status(0, true)).unwrap();
        m.apply(status(250, false)).unwrap();
        assert_eq!(m.phase(), PlaybackPhase::Paused);
        assert!(!m.is_playing());
        m.apply(status(250, true)).unwrap();
        assert_eq!(m.phase(), PlaybackPhase::Playing);
    }

    #[test]
    fn test_drag_holds_seeking_phase() {
        let mut m = PlaybackMachine::new();
        m.apply(status(0, true)).unwrap();
        m.apply(Transition::DragStarted).unwrap();

        // Pause confirmation arrives mid-drag
        m.apply(status(1_000, false)).unwrap();
        assert_eq!(m.phase(), PlaybackPhase::Seeking);
        assert_eq!(m.position_millis(), 1_000);

        m.apply(Transition::DragEnded { resume: true }).unwrap();
        assert_eq!(m.phase(), PlaybackPhase::Playing);
    }

    #[test]
    fn test_finish_forces_paused_flag() {
        let mut m = PlaybackMachine::new();
        m.apply(status(119_000, true)).unwrap();
        let out = m
            .apply(Transition::EngineStatus(PlaybackStatus {
                did_just_finish: true,
                is_playing: true,
                ..PlaybackStatus::loaded(120_000, 120_000, true)
            }))
            .unwrap();
        assert!(out.finished);
        assert!(!m.is_playing());
        assert_eq!(m.phase(), PlaybackPhase::Finished);

        // Paused callbacks after the end keep the finished phase
        m.apply(status(120_000, false)).unwrap();
        assert_eq!(m.phase(), PlaybackPhase::Finished);

        // Replay confirmed by the engine
        m.apply(status(0, true)).unwrap();
        assert_eq!(m.phase(), PlaybackPhase::Playing);
    }

    #[test]
    fn test_seek_back_from_end_leaves_finished() {
        let mut m = PlaybackMachine::new();
        m.apply(status(119_000, true)).unwrap();
        m.apply(Transition::EngineStatus(PlaybackStatus {
            did_just_finish: true,
            ..PlaybackStatus::loaded(120_000, 120_000, false)
        }))
        .unwrap();
        assert_eq!(m.phase(), PlaybackPhase::Finished);

        let out = m.apply(status(110_000, false)).unwrap();
        assert!(out.changed);
        assert_eq!(m.phase(), PlaybackPhase::Paused);
        assert_eq!(m.position_millis(), 110_000);
    }

    #[test]
    fn test_drag_from_idle_rejected() {
        let mut m = PlaybackMachine::new();
        let err = m.apply(Transition::DragStarted).unwrap_err();
        assert!(matches!(err, Error::InvalidStateTransition { .. }));
        assert_eq!(m.phase(), PlaybackPhase::Idle);
    }
}
