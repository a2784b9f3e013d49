//! Owned single-shot timers
//!
//! Each timer kind has at most one pending deadline. Scheduling a kind that is
//! already armed replaces it, and `cancel_all` is the only teardown needed.

use serde::{Deserialize, Serialize};

/// The cancellable timers a player screen owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Deferred controls toggle after a single tap
    ControlsToggle,
    /// Hides the double-tap skip icon
    SeekFeedback,
    /// Dismisses the toast message
    ToastDismiss,
}

impl TimerKind {
    pub const ALL: [TimerKind; 3] = [
        TimerKind::ControlsToggle,
        TimerKind::SeekFeedback,
        TimerKind::ToastDismiss,
    ];

    fn slot(self) -> usize {
        match self {
            TimerKind::ControlsToggle => 0,
            TimerKind::SeekFeedback => 1,
            TimerKind::ToastDismiss => 2,
        }
    }
}

/// Deadlines in milliseconds on the controller's clock
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerSet {
    deadlines: [Option<u64>; 3],
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `kind` to fire at `due_at_ms`, superseding any pending one
    pub fn schedule(&mut self, kind: TimerKind, due_at_ms: u64) {
        self.deadlines[kind.slot()] = Some(due_at_ms);
    }

    /// Returns true if the timer was pending
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        self.deadlines[kind.slot()].take().is_some()
    }

    pub fn cancel_all(&mut self) {
        self.deadlines = [None; 3];
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.deadlines[kind.slot()].is_some()
    }

    pub fn deadline(&self, kind: TimerKind) -> Option<u64> {
        self.deadlines[kind.slot()]
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<u64> {
        self.deadlines.iter().flatten().min().copied()
    }

    /// Disarm and return every timer due at `now_ms`, earliest first
    pub fn take_due(&mut self, now_ms: u64) -> Vec<TimerKind> {
        let mut due: Vec<(u64, TimerKind)> = TimerKind::ALL
            .iter()
            .filter_map(|&kind| match self.deadlines[kind.slot()] {
                Some(at) if at <= now_ms => Some((at, kind)),
                _ => None,
            })
            .collect();
        due.sort_by_key(|(at, _)| *at);

        for (_, kind) in &due {
            self.deadlines[kind.slot()] = None;
        }
        due.into_iter().map(|(_, kind)| kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_supersedes() {
        let mut timers = TimerSet::new();
        timers.schedule(TimerKind::ToastDismiss, 1_000);
        timers.schedule(TimerKind::ToastDismiss, 4_000);
        assert_eq!(timers.take_due(2_000), vec![]);
        assert_eq!(timers.take_due(4_000), vec![TimerKind::ToastDismiss]);
        assert!(!timers.is_armed(TimerKind::ToastDismiss));
    }

    #[test]
    fn test_take_due_in_deadline_order() {
        let mut timers = TimerSet::new();
        timers.schedule(TimerKind::ToastDismiss, 300);
        timers.schedule(TimerKind::ControlsToggle, 500);
        timers.schedule(TimerKind::SeekFeedback, 100);
        assert_eq!(timers.next_deadline(), Some(100));
        assert_eq!(
            timers.take_due(400),
            vec![TimerKind::SeekFeedback, TimerKind::ToastDismiss]
        );
        assert_eq!(timers.next_deadline(), Some(500));
    }

    #[test]
    fn test_cancel_all() {
        let mut timers = TimerSet::new();
        for kind in TimerKind::ALL {
            timers.schedule(kind, 10);
        }
        timers.cancel_all();
        assert_eq!(timers.next_deadline(), None);
        assert!(timers.take_due(u64::MAX).is_empty());
        assert!(!timers.cancel(TimerKind::SeekFeedback));
    }
}
