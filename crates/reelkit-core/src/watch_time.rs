//! Watch-time accumulation and reporting
//!
//! Watched time only accrues while the video plays and no drag is active.
//! Reports always carry the absolute cumulative total for the screen
//! instance, never a delta, so a lost report is covered by the next one.

use crate::types::{VideoId, VideoType};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body of a watch-time report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchReport {
    pub video_id: VideoId,
    pub video_type: VideoType,
    /// Cumulative watched seconds for this mount
    pub watch_duration: u64,
    /// Percentage of the media watched, 0-100
    pub completion_rate: f64,
}

/// Sink for watch-time reports
#[async_trait]
pub trait WatchReporter: Send + Sync {
    async fn report_watch(&self, report: &WatchReport) -> Result<()>;
}

/// Integrates watched time and decides when to report it
#[derive(Debug, Clone)]
pub struct WatchTimeTracker {
    video_id: VideoId,
    video_type: VideoType,
    duration_millis: u64,
    watched_millis: u64,
    reported_millis: u64,
    last_observed_ms: Option<u64>,
    active: bool,
}

impl WatchTimeTracker {
    pub fn new(video_id: VideoId, video_type: VideoType) -> Self {
        Self {
            video_id,
            video_type,
            duration_millis: 0,
            watched_millis: 0,
            reported_millis: 0,
            last_observed_ms: None,
            active: false,
        }
    }

    /// Media duration used for the completion rate
    pub fn set_duration(&mut self, duration_millis: u64) {
        self.duration_millis = duration_millis;
    }

    /// Record the gate state at `now_ms`.
    ///
    /// Time since the previous observation counts only if the gate was open
    /// for that span.
    pub fn observe(&mut self, now_ms: u64, active: bool) {
        if let Some(last) = self.last_observed_ms {
            if self.active {
                self.watched_millis += now_ms.saturating_sub(last);
            }
        }
        self.last_observed_ms = Some(now_ms);
        self.active = active;
    }

    pub fn watched_millis(&self) -> u64 {
        self.watched_millis
    }

    /// Whole seconds watched
    pub fn watched_secs(&self) -> u64 {
        self.watched_millis / 1000
    }

    /// Interval tick: report the running total if a whole second was added
    pub fn on_interval(&mut self, now_ms: u64) -> Option<WatchReport> {
        let active = self.active;
        self.observe(now_ms, active);

        let secs = self.watched_secs();
        if secs == 0 || secs * 1000 <= self.reported_millis {
            return None;
        }
        self.reported_millis = secs * 1000;
        Some(self.report(secs))
    }

    /// Final report on teardown, if anything is unreported.
    ///
    /// Partial seconds round up so the last window is not lost.
    pub fn flush(&mut self, now_ms: u64) -> Option<WatchReport> {
        self.observe(now_ms, false);

        if self.watched_millis <= self.reported_millis {
            return None;
        }
        self.reported_millis = self.watched_millis;
        let secs = self.watched_millis.div_ceil(1000);
        Some(self.report(secs))
    }

    fn report(&self, secs: u64) -> WatchReport {
        WatchReport {
            video_id: self.video_id.clone(),
            video_type: self.video_type,
            watch_duration: secs,
            completion_rate: completion_rate(secs * 1000, self.duration_millis),
        }
    }
}

/// Percentage of `duration_millis` covered by `watched_millis`, two decimals
pub fn completion_rate(watched_millis: u64, duration_millis: u64) -> f64 {
    if duration_millis == 0 {
        return 0.0;
    }
    let pct = (watched_millis as f64 / duration_millis as f64 * 100.0).min(100.0);
    (pct * 100.0).round() / 100.0
}
