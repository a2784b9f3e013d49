//! Playback Controller - single owner of one player screen's interaction state
//!
//! Coordinates:
//! - Gesture classification (taps, double taps, drags)
//! - Drag seeking with one commit on release
//! - Engine status reconciliation
//! - Controls visibility, skip feedback icon and toast timers
//!
//! The controller is synchronous and deterministic: every input carries the
//! current time in milliseconds and timers fire from `poll_timers`.

use crate::{
    engine::{dispatch, EngineCommand, MediaEngine},
    format::format_time,
    gesture::{Gesture, GestureInterpreter, RawTouch},
    reconciler::{PlaybackMachine, Transition},
    seek::SeekCoordinator,
    timers::{TimerKind, TimerSet},
    types::*,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Input to the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerEvent {
    /// Raw touch on the surface or progress bar
    Touch(RawTouch),
    /// Engine status callback
    Status(PlaybackStatus),
    /// Play/pause button
    TogglePlayPause,
    /// Fullscreen button
    ToggleFullscreen,
}

/// Snapshot of everything the player screen renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub phase: PlaybackPhase,
    pub is_loaded: bool,
    pub is_playing: bool,
    pub is_dragging: bool,
    /// Pending drag target while dragging, live position otherwise
    pub display_position_millis: u64,
    pub duration_millis: u64,
    /// Display position as a fraction of the duration
    pub progress: f64,
    pub position_label: String,
    pub duration_label: String,
    pub controls_visible: bool,
    pub fullscreen: bool,
    pub seek_feedback: Option<SkipDirection>,
    pub toast: Option<String>,
}

/// Interaction controller for one player screen
pub struct PlaybackController<E: MediaEngine> {
    engine: E,
    config: PlayerConfig,
    gestures: GestureInterpreter,
    seek: SeekCoordinator,
    playback: PlaybackMachine,
    timers: TimerSet,
    controls_visible: bool,
    fullscreen: bool,
    seek_feedback: Option<SkipDirection>,
    toast: Option<String>,
    torn_down: bool,
}

impl<E: MediaEngine> PlaybackController<E> {
    pub fn new(engine: E, config: PlayerConfig) -> Self {
        Self {
            engine,
            gestures: GestureInterpreter::new(&config),
            config,
            seek: SeekCoordinator::new(),
            playback: PlaybackMachine::new(),
            timers: TimerSet::new(),
            controls_visible: true,
            fullscreen: false,
            seek_feedback: None,
            toast: None,
            torn_down: false,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn playback(&self) -> &PlaybackMachine {
        &self.playback
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Handle one input at `now_ms`. Returns true if the view changed.
    ///
    /// Timers due at or before `now_ms` fire first.
    pub fn handle(&mut self, event: PlayerEvent, now_ms: u64) -> bool {
        if self.torn_down {
            debug!(?event, "Event after teardown ignored");
            return false;
        }

        let fired = self.poll_timers(now_ms);
        let changed = match event {
            PlayerEvent::Touch(touch) => self.on_touch(touch, now_ms),
            PlayerEvent::Status(status) => self.on_status(status),
            PlayerEvent::TogglePlayPause => self.toggle_play_pause(),
            PlayerEvent::ToggleFullscreen => self.toggle_fullscreen(),
        };
        fired || changed
    }

    /// Classify and act on a raw touch
    pub fn on_touch(&mut self, touch: RawTouch, now_ms: u64) -> bool {
        let Some(gesture) = self.gestures.interpret(touch, now_ms) else {
            return false;
        };

        match gesture {
            Gesture::SingleTap => {
                self.timers.schedule(
                    TimerKind::ControlsToggle,
                    now_ms + self.config.double_tap_window_ms,
                );
                false
            }
            Gesture::DoubleTap { skip } => {
                // No flicker from the first tap's pending toggle
                let cancelled = self.timers.cancel(TimerKind::ControlsToggle);
                debug!(?skip, cancelled, "Double tap");
                match skip {
                    Some(direction) if !self.seek.is_dragging() => self.skip(direction, now_ms),
                    _ => false,
                }
            }
            Gesture::DragStart => self.begin_drag(),
            Gesture::DragMove { x, track_width } => {
                if !self.seek.is_dragging() {
                    return false;
                }
                self.seek
                    .on_drag_move(x, track_width, self.playback.duration_millis());
                true
            }
            Gesture::DragEnd => self.end_drag(),
        }
    }

    fn skip(&mut self, direction: SkipDirection, now_ms: u64) -> bool {
        if !self.playback.is_loaded() {
            debug!(?direction, "Skip before load dropped");
            return false;
        }

        let position = self.playback.position_millis();
        let step = self.config.skip_step_ms;
        let mut target = match direction {
            SkipDirection::Rewind => position.saturating_sub(step),
            SkipDirection::Forward => position.saturating_add(step),
        };
        let duration = self.playback.duration_millis();
        if duration > 0 {
            target = target.min(duration);
        }

        let command = EngineCommand::SetStatus(StatusUpdate {
            position_millis: target,
            should_play: self.playback.is_playing(),
        });
        if !dispatch(&mut self.engine, command) {
            return false;
        }

        self.seek_feedback = Some(direction);
        self.timers
            .schedule(TimerKind::SeekFeedback, now_ms + self.config.seek_feedback_ms);
        true
    }

    fn begin_drag(&mut self) -> bool {
        if !self.playback.is_loaded() {
            debug!("Drag before load dropped");
            return false;
        }
        if self.seek.is_dragging() {
            return false;
        }

        if let Err(e) = self.playback.apply(Transition::DragStarted) {
            warn!(error = %e, "Drag start rejected");
            return false;
        }

        let live = self.playback.live_status();
        if let Some(command) = self.seek.on_drag_start(&live) {
            dispatch(&mut self.engine, command);
        }
        true
    }

    fn end_drag(&mut self) -> bool {
        let Some(command) = self.seek.on_drag_end() else {
            return false;
        };

        let resume = matches!(
            command,
            EngineCommand::SetStatus(StatusUpdate {
                should_play: true,
                ..
            })
        );
        dispatch(&mut self.engine, command);

        if let Err(e) = self.playback.apply(Transition::DragEnded { resume }) {
            warn!(error = %e, "Drag end rejected");
        }
        true
    }

    /// Reconcile an engine status callback
    pub fn on_status(&mut self, status: PlaybackStatus) -> bool {
        let was_loaded = self.playback.is_loaded();
        let outcome = match self.playback.apply(Transition::EngineStatus(status)) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Status update rejected");
                return false;
            }
        };

        if !was_loaded
            && self.playback.is_loaded()
            && self.config.autoplay
            && !self.playback.is_playing()
            && !outcome.finished
        {
            debug!("Media loaded, autoplay");
            dispatch(&mut self.engine, EngineCommand::Play);
        }

        if outcome.finished {
            self.timers.cancel(TimerKind::ControlsToggle);
            self.controls_visible = true;
        }
        outcome.changed || outcome.finished
    }

    /// Play/pause button. Local state waits for the engine to confirm.
    pub fn toggle_play_pause(&mut self) -> bool {
        if self.seek.is_dragging() {
            return false;
        }

        let command = if self.playback.phase() == PlaybackPhase::Finished {
            EngineCommand::SetStatus(StatusUpdate {
                position_millis: 0,
                should_play: true,
            })
        } else if self.playback.is_playing() {
            EngineCommand::Pause
        } else {
            EngineCommand::Play
        };
        dispatch(&mut self.engine, command);
        false
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        self.fullscreen = !self.fullscreen;
        true
    }

    /// Show a transient message, replacing any visible one
    pub fn show_toast(&mut self, message: impl Into<String>, now_ms: u64) {
        if self.torn_down {
            return;
        }
        self.toast = Some(message.into());
        self.timers
            .schedule(TimerKind::ToastDismiss, now_ms + self.config.toast_duration_ms);
    }

    /// Fire every timer due at `now_ms`. Returns true if the view changed.
    pub fn poll_timers(&mut self, now_ms: u64) -> bool {
        let due = self.timers.take_due(now_ms);
        for kind in &due {
            match kind {
                TimerKind::ControlsToggle => self.controls_visible = !self.controls_visible,
                TimerKind::SeekFeedback => self.seek_feedback = None,
                TimerKind::ToastDismiss => self.toast = None,
            }
        }
        !due.is_empty()
    }

    /// Earliest pending timer deadline
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    pub fn timers(&self) -> &TimerSet {
        &self.timers
    }

    /// Watched time accrues only while this is true
    pub fn watch_gate(&self) -> bool {
        self.playback.is_playing() && !self.seek.is_dragging()
    }

    pub fn is_dragging(&self) -> bool {
        self.seek.is_dragging()
    }

    /// Pending drag target while dragging, live position otherwise
    pub fn display_position(&self) -> u64 {
        let position = self
            .seek
            .pending_position()
            .unwrap_or_else(|| self.playback.position_millis());
        match self.playback.duration_millis() {
            0 => position,
            duration => position.min(duration),
        }
    }

    pub fn view(&self) -> ViewState {
        let position = self.display_position();
        let duration = self.playback.duration_millis();
        ViewState {
            phase: self.playback.phase(),
            is_loaded: self.playback.is_loaded(),
            is_playing: self.playback.is_playing(),
            is_dragging: self.seek.is_dragging(),
            display_position_millis: position,
            duration_millis: duration,
            progress: if duration > 0 {
                position as f64 / duration as f64
            } else {
                0.0
            },
            position_label: format_time(position),
            duration_label: format_time(duration),
            controls_visible: self.controls_visible,
            fullscreen: self.fullscreen,
            seek_feedback: self.seek_feedback,
            toast: self.toast.clone(),
        }
    }

    /// Cancel every timer and any drag in progress. Later input is ignored.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.timers.cancel_all();
        self.seek.cancel();
        self.gestures.reset();
        self.torn_down = true;
        debug!("Controller torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SimulatedEngine;
    use crate::gesture::TouchPhase;

    fn loaded_controller(playing: bool) -> PlaybackController<SimulatedEngine> {
        let mut engine = SimulatedEngine::loaded(120_000);
        if playing {
            engine.play().unwrap();
        }
        let status = engine.status();
        engine.clear_commands();

        let config = PlayerConfig {
            autoplay: false,
            ..Default::default()
        };
        let mut controller = PlaybackController::new(engine, config);
        controller.on_status(status);
        controller
    }

    fn tap(x: f64) -> PlayerEvent {
        PlayerEvent::Touch(RawTouch::surface_tap(x, 100.0))
    }

    #[test]
    fn test_drag_scenario_single_commit() {
        let mut c = loaded_controller(true);

        c.handle(PlayerEvent::Touch(RawTouch::progress(TouchPhase::Down, 0.0, 300.0)), 0);
        for i in 1..=10 {
            let x = 15.0 * i as f64;
            c.handle(PlayerEvent::Touch(RawTouch::progress(TouchPhase::Move, x, 300.0)), i * 10);
        }
        assert_eq!(c.engine().commands(), &[EngineCommand::Pause]);
        assert_eq!(c.display_position(), 60_000);

        c.handle(PlayerEvent::Touch(RawTouch::progress(TouchPhase::Up, 150.0, 300.0)), 200);
        assert_eq!(
            c.engine().commands(),
            &[
                EngineCommand::Pause,
                EngineCommand::SetStatus(StatusUpdate {
                    position_millis: 60_000,
                    should_play: true,
                }),
            ]
        );
        assert!(!c.is_dragging());
    }

    #[test]
    fn test_drag_does_not_flip_playing_locally() {
        let mut c = loaded_controller(true);
        c.handle(PlayerEvent::Touch(RawTouch::progress(TouchPhase::Down, 0.0, 300.0)), 0);
        assert!(c.playback().is_playing());
        assert!(!c.watch_gate());
        assert_eq!(c.view().phase, PlaybackPhase::Seeking);
    }

    #[test]
    fn test_double_tap_cancels_controls_toggle() {
        let mut c = loaded_controller(true);
        c.handle(tap(10.0), 1_000);
        c.handle(tap(10.0), 1_299);
        c.poll_timers(5_000);

        assert!(c.view().controls_visible);
        assert_eq!(c.view().seek_feedback, None);
        assert_eq!(c.engine().commands().len(), 1);
    }

    #[test]
    fn test_slow_taps_toggle_twice() {
        let mut c = loaded_controller(false);
        c.handle(tap(50.0), 1_000);
        c.handle(tap(50.0), 1_301);
        assert!(!c.view().controls_visible);

        c.poll_timers(1_601);
        assert!(c.view().controls_visible);
        assert!(c.engine().commands().is_empty());
    }

    #[test]
    fn test_skip_clamps_and_shows_feedback() {
        let mut c = loaded_controller(true);
        c.handle(tap(90.0), 0);
        c.handle(tap(90.0), 100);
        assert_eq!(
            c.engine().commands(),
            &[EngineCommand::SetStatus(StatusUpdate {
                position_millis: 10_000,
                should_play: true,
            })]
        );
        assert_eq!(c.view().seek_feedback, Some(SkipDirection::Forward));

        c.poll_timers(100 + c.config().seek_feedback_ms);
        assert_eq!(c.view().seek_feedback, None);

        // Rewind from zero stays at zero
        let mut c = loaded_controller(false);
        c.handle(tap(5.0), 0);
        c.handle(tap(5.0), 100);
        assert_eq!(
            c.engine().commands(),
            &[EngineCommand::SetStatus(StatusUpdate {
                position_millis: 0,
                should_play: false,
            })]
        );
    }

    #[test]
    fn test_autoplay_on_first_load_only() {
        let mut c = PlaybackController::new(SimulatedEngine::loaded(120_000), PlayerConfig::default());
        c.on_status(PlaybackStatus::loaded(0, 120_000, false));
        assert_eq!(c.engine().commands(), &[EngineCommand::Play]);

        // A later paused status is the user's choice, not a load
        c.on_status(PlaybackStatus::loaded(4_000, 120_000, false));
        assert_eq!(c.engine().commands().len(), 1);
    }

    #[test]
    fn test_skip_before_load_dropped() {
        let engine = SimulatedEngine::unloaded(120_000);
        let mut c = PlaybackController::new(engine, PlayerConfig::default());
        c.handle(tap(90.0), 0);
        assert!(!c.handle(tap(90.0), 100));
        assert!(c.engine().commands().is_empty());
        assert_eq!(c.view().seek_feedback, None);
    }

    #[test]
    fn test_finish_forces_controls_visible() {
        let mut c = loaded_controller(true);
        c.handle(tap(50.0), 0);
        c.poll_timers(300);
        assert!(!c.view().controls_visible);

        c.handle(
            PlayerEvent::Status(PlaybackStatus {
                did_just_finish: true,
                ..PlaybackStatus::loaded(120_000, 120_000, false)
            }),
            1_000,
        );
        let view = c.view();
        assert!(view.controls_visible);
        assert!(!view.is_playing);
        assert_eq!(view.phase, PlaybackPhase::Finished);
    }

    #[test]
    fn test_replay_after_finish() {
        let mut c = loaded_controller(true);
        c.on_status(PlaybackStatus {
            did_just_finish: true,
            ..PlaybackStatus::loaded(120_000, 120_000, false)
        });
        c.engine_mut().clear_commands();

        c.handle(PlayerEvent::TogglePlayPause, 10);
        assert_eq!(
            c.engine().commands(),
            &[EngineCommand::SetStatus(StatusUpdate {
                position_millis: 0,
                should_play: true,
            })]
        );
    }

    #[test]
    fn test_rewind_after_finish_plays_from_new_position() {
        let mut c = loaded_controller(true);
        c.on_status(PlaybackStatus {
            did_just_finish: true,
            ..PlaybackStatus::loaded(120_000, 120_000, false)
        });
        c.handle(tap(5.0), 1_000);
        c.handle(tap(5.0), 1_100);
        assert_eq!(
            c.engine().commands(),
            &[EngineCommand::SetStatus(StatusUpdate {
                position_millis: 110_000,
                should_play: false,
            })]
        );

        let status = c.engine().status();
        c.handle(PlayerEvent::Status(status), 1_200);
        assert_eq!(c.view().phase, PlaybackPhase::Paused);

        c.engine_mut().clear_commands();
        c.handle(PlayerEvent::TogglePlayPause, 1_300);
        assert_eq!(c.engine().commands(), &[EngineCommand::Play]);
    }

    #[test]
    fn test_toast_superseded_and_dismissed() {
        let mut c = loaded_controller(false);
        c.show_toast("first", 0);
        c.show_toast("second", 1_000);
        c.poll_timers(3_500);
        assert_eq!(c.view().toast.as_deref(), Some("second"));
        c.poll_timers(4_000);
        assert_eq!(c.view().toast, None);
    }

    #[test]
    fn test_teardown_cancels_everything() {
        let mut c = loaded_controller(true);
        c.handle(tap(50.0), 0);
        c.show_toast("saved", 0);
        c.handle(PlayerEvent::Touch(RawTouch::progress(TouchPhase::Down, 0.0, 300.0)), 10);

        c.teardown();
        assert_eq!(c.next_deadline(), None);
        assert!(!c.is_dragging());
        assert!(!c.handle(PlayerEvent::ToggleFullscreen, 20));
        assert!(!c.view().fullscreen);
    }

    #[test]
    fn test_display_position_clamped() {
        let mut c = loaded_controller(true);
        c.on_status(PlaybackStatus::loaded(130_000, 120_000, true));
        assert_eq!(c.display_position(), 120_000);
        assert_eq!(c.view().position_label, "02:00");
    }
}
