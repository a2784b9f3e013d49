//! Drag-to-seek coordination
//!
//! The engine is paused for the length of a drag and only sees one seek, on
//! release. Move events update the pending target locally.

use crate::engine::EngineCommand;
use crate::types::{PlaybackStatus, StatusUpdate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Drag state owned by the coordinator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeekState {
    pub is_dragging: bool,
    pub pending_position_millis: u64,
    pub was_playing_before_drag: bool,
}

/// Buffers a seek target during a drag and commits it once
#[derive(Debug, Clone, Default)]
pub struct SeekCoordinator {
    state: SeekState,
}

impl SeekCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SeekState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_dragging
    }

    /// Pending target while dragging
    pub fn pending_position(&self) -> Option<u64> {
        self.state
            .is_dragging
            .then_some(self.state.pending_position_millis)
    }

    /// Begin a drag from the live engine status.
    ///
    /// Returns a pause command when the engine was playing. The caller must
    /// not flip its local playing flag; the engine callback confirms it.
    pub fn on_drag_start(&mut self, live: &PlaybackStatus) -> Option<EngineCommand> {
        if self.state.is_dragging {
            debug!("Drag start while already dragging, ignored");
            return None;
        }

        self.state = SeekState {
            is_dragging: true,
            pending_position_millis: live.position_millis,
            was_playing_before_drag: live.is_playing,
        };

        live.is_playing.then_some(EngineCommand::Pause)
    }

    /// Move the pending target. Never produces an engine command.
    pub fn on_drag_move(&mut self, local_x: f64, track_width: f64, duration_millis: u64) {
        if !self.state.is_dragging || track_width.is_nan() || track_width <= 0.0 {
            return;
        }

        let pct = (local_x / track_width).clamp(0.0, 1.0);
        self.state.pending_position_millis = (pct * duration_millis as f64).round() as u64;
    }

    /// Release the drag, committing a single combined seek.
    ///
    /// No-op when no drag is active.
    pub fn on_drag_end(&mut self) -> Option<EngineCommand> {
        if !self.state.is_dragging {
            return None;
        }

        let update = StatusUpdate {
            position_millis: self.state.pending_position_millis,
            should_play: self.state.was_playing_before_drag,
        };
        self.state = SeekState::default();

        debug!(
            position = update.position_millis,
            should_play = update.should_play,
            "Drag committed"
        );
        Some(EngineCommand::SetStatus(update))
    }

    /// Drop any drag in progress without committing
    pub fn cancel(&mut self) {
        self.state = SeekState::default();
    }
}
