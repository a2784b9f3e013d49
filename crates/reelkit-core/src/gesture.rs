//! Gesture interpretation
//!
//! Turns raw touches into the gestures the player reacts to:
//! - Progress bar touches become drag start / move / end
//! - Surface taps become single taps or zoned double taps

use crate::types::{PlayerConfig, SkipDirection};
use serde::{Deserialize, Serialize};

/// Element that received the touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchTarget {
    /// The video surface
    Surface,
    /// The seek/progress bar
    ProgressBar,
}

/// Touch lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    Down,
    Move,
    Up,
}

/// Raw touch with a local X coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawTouch {
    pub target: TouchTarget,
    pub phase: TouchPhase,
    /// X coordinate local to the target
    pub x: f64,
    /// Width of the target
    pub width: f64,
}

impl RawTouch {
    pub fn surface_tap(x: f64, width: f64) -> Self {
        Self {
            target: TouchTarget::Surface,
            phase: TouchPhase::Up,
            x,
            width,
        }
    }

    pub fn progress(phase: TouchPhase, x: f64, width: f64) -> Self {
        Self {
            target: TouchTarget::ProgressBar,
            phase,
            x,
            width,
        }
    }
}

/// Classified gesture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gesture", rename_all = "snake_case")]
pub enum Gesture {
    /// Tap that should toggle controls once the double-tap window passes
    SingleTap,
    /// Second tap inside the window; `skip` is None in the dead zone
    DoubleTap { skip: Option<SkipDirection> },
    DragStart,
    DragMove { x: f64, track_width: f64 },
    DragEnd,
}

/// Stateful tap/drag classifier
#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    double_tap_window_ms: u64,
    rewind_zone: f64,
    forward_zone: f64,
    last_tap_ms: Option<u64>,
}

impl GestureInterpreter {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            double_tap_window_ms: config.double_tap_window_ms,
            rewind_zone: config.rewind_zone,
            forward_zone: config.forward_zone,
            last_tap_ms: None,
        }
    }

    /// Classify a raw touch received at `now_ms`
    pub fn interpret(&mut self, touch: RawTouch, now_ms: u64) -> Option<Gesture> {
        match (touch.target, touch.phase) {
            (TouchTarget::ProgressBar, TouchPhase::Down) => Some(Gesture::DragStart),
            (TouchTarget::ProgressBar, TouchPhase::Move) => Some(Gesture::DragMove {
                x: touch.x,
                track_width: touch.width,
            }),
            (TouchTarget::ProgressBar, TouchPhase::Up) => Some(Gesture::DragEnd),
            (TouchTarget::Surface, TouchPhase::Up) => Some(self.tap(touch.x, touch.width, now_ms)),
            (TouchTarget::Surface, _) => None,
        }
    }

    fn tap(&mut self, x: f64, width: f64, now_ms: u64) -> Gesture {
        let is_double = self
            .last_tap_ms
            .map(|last| now_ms.saturating_sub(last) < self.double_tap_window_ms)
            .unwrap_or(false);

        if is_double {
            // A third tap starts a fresh sequence
            self.last_tap_ms = None;
            Gesture::DoubleTap {
                skip: self.zone(x, width),
            }
        } else {
            self.last_tap_ms = Some(now_ms);
            Gesture::SingleTap
        }
    }

    /// Skip direction for a double tap at `x`, None in the dead zone
    pub fn zone(&self, x: f64, width: f64) -> Option<SkipDirection> {
        if width.is_nan() || width <= 0.0 {
            return None;
        }
        if x < self.rewind_zone * width {
            Some(SkipDirection::Rewind)
        } else if x > self.forward_zone * width {
            Some(SkipDirection::Forward)
        } else {
            None
        }
    }

    /// Forget any pending tap sequence
    pub fn reset(&mut self) {
        self.last_tap_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpreter() -> GestureInterpreter {
        GestureInterpreter::new(&PlayerConfig::default())
    }

    #[test]
    fn test_first_tap_is_single() {
        let mut g = interpreter();
        assert_eq!(g.interpret(RawTouch::surface_tap(10.0, 100.0), 50), Some(Gesture::SingleTap));
    }

    #[test]
    fn test_double_tap_window() {
        let mut g = interpreter();
        g.interpret(RawTouch::surface_tap(10.0, 100.0), 1_000);
        assert_eq!(
            g.interpret(RawTouch::surface_tap(10.0, 100.0), 1_299),
            Some(Gesture::DoubleTap { skip: Some(SkipDirection::Rewind) })
        );

        let mut g = interpreter();
        g.interpret(RawTouch::surface_tap(10.0, 100.0), 1_000);
        assert_eq!(g.interpret(RawTouch::surface_tap(10.0, 100.0), 1_300), Some(Gesture::SingleTap));
    }

    #[test]
    fn test_third_tap_starts_new_sequence() {
        let mut g = interpreter();
        g.interpret(RawTouch::surface_tap(90.0, 100.0), 1_000);
        assert!(matches!(
            g.interpret(RawTouch::surface_tap(90.0, 100.0), 1_100),
            Some(Gesture::DoubleTap { .. })
        ));
        assert_eq!(g.interpret(RawTouch::surface_tap(90.0, 100.0), 1_200), Some(Gesture::SingleTap));
    }

    #[test]
    fn test_zone_boundaries() {
        let g = interpreter();
        assert_eq!(g.zone(39.0, 100.0), Some(SkipDirection::Rewind));
        assert_eq!(g.zone(40.0, 100.0), None);
        assert_eq!(g.zone(41.0, 100.0), None);
        assert_eq!(g.zone(59.0, 100.0), None);
        assert_eq!(g.zone(60.0, 100.0), None);
        assert_eq!(g.zone(61.0, 100.0), Some(SkipDirection::Forward));
        assert_eq!(g.zone(10.0, 0.0), None);
    }

    #[test]
    fn test_progress_bar_touches() {
        let mut g = interpreter();
        assert_eq!(
            g.interpret(RawTouch::progress(TouchPhase::Down, 0.0, 300.0), 0),
            Some(Gesture::DragStart)
        );
        assert_eq!(
            g.interpret(RawTouch::progress(TouchPhase::Move, 150.0, 300.0), 10),
            Some(Gesture::DragMove { x: 150.0, track_width: 300.0 })
        );
        assert_eq!(
            g.interpret(RawTouch::progress(TouchPhase::Up, 150.0, 300.0), 20),
            Some(Gesture::DragEnd)
        );
        // Surface down/move events are not gestures on their own
        let down = RawTouch {
            target: TouchTarget::Surface,
            phase: TouchPhase::Down,
            x: 5.0,
            width: 100.0,
        };
        assert_eq!(g.interpret(down, 30), None);
    }
}
