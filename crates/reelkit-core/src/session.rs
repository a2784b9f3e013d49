//! Player Session - async runtime for one mounted player screen
//!
//! Coordinates:
//! - Input events and engine status callbacks
//! - Controller timers (controls toggle, skip feedback, toast)
//! - The periodic watch-time report
//! - Optimistic reaction updates and their rollback
//!
//! Everything runs on one task, so handlers never interleave. Network calls
//! are spawned and their results come back as messages.

use crate::{
    api::{ActionOutcome, VideoAction, VideoActions, VideoDetails},
    controller::{PlaybackController, PlayerEvent, ViewState},
    engine::MediaEngine,
    optimistic::{Mutation, ReactionChange, ReactionKind, Reactions},
    types::*,
    watch_time::{WatchReport, WatchReporter, WatchTimeTracker},
    Error, Result,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, instrument};

const INPUT_CAPACITY: usize = 256;

/// Message from the screen to its session
#[derive(Debug, Clone)]
pub enum PlayerInput {
    /// Touch, engine status or button press
    Event(PlayerEvent),
    /// Reaction button pressed
    React(ReactionKind),
    /// Non-reaction action (share, report, delete)
    Act {
        action: VideoAction,
        reason: Option<String>,
    },
    /// Screen is going away
    Unmount,
}

/// Everything the screen renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub player: ViewState,
    pub reactions: Reactions,
    pub watched_secs: u64,
}

/// Result of a finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchSummary {
    pub session_id: SessionId,
    pub video_id: VideoId,
    pub watched_secs: u64,
    pub reports_sent: u32,
    pub ended_at: DateTime<Utc>,
}

/// Completed network call, delivered back to the session task
enum Settled {
    Reaction {
        change: ReactionChange,
        result: Result<ActionOutcome>,
    },
    Action {
        action: VideoAction,
        result: Result<ActionOutcome>,
    },
}

/// Handle held by the screen
pub struct PlayerHandle {
    session_id: SessionId,
    inputs: mpsc::Sender<PlayerInput>,
    view: watch::Receiver<SessionView>,
    task: JoinHandle<WatchSummary>,
}

impl PlayerHandle {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Forward an input to the session
    pub async fn send(&self, input: PlayerInput) -> Result<()> {
        self.inputs
            .send(input)
            .await
            .map_err(|_| Error::Internal("player session has stopped".into()))
    }

    pub async fn event(&self, event: PlayerEvent) -> Result<()> {
        self.send(PlayerInput::Event(event)).await
    }

    pub async fn react(&self, kind: ReactionKind) -> Result<()> {
        self.send(PlayerInput::React(kind)).await
    }

    /// Latest published view
    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    /// Subscribe to view changes
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.clone()
    }

    /// Sender for platform callbacks (engine status) to push into
    pub fn sender(&self) -> mpsc::Sender<PlayerInput> {
        self.inputs.clone()
    }

    /// Tear the session down and wait for the final watch report
    pub async fn unmount(self) -> Result<WatchSummary> {
        // A closed channel means the session already stopped
        let _ = self.inputs.send(PlayerInput::Unmount).await;
        drop(self.inputs);
        self.task
            .await
            .map_err(|e| Error::Internal(format!("player session failed: {}", e)))
    }
}

/// Player session owning one controller
pub struct PlayerSession<E: MediaEngine + 'static> {
    id: SessionId,
    video_id: VideoId,
    controller: PlaybackController<E>,
    tracker: WatchTimeTracker,
    reactions: Reactions,
    reporter: Arc<dyn WatchReporter>,
    actions: Arc<dyn VideoActions>,
    inputs: mpsc::Receiver<PlayerInput>,
    settled_tx: mpsc::UnboundedSender<Settled>,
    settled_rx: mpsc::UnboundedReceiver<Settled>,
    view_tx: watch::Sender<SessionView>,
    origin: Instant,
    reports_sent: u32,
    flushed: bool,
}

impl<E: MediaEngine + 'static> PlayerSession<E> {
    /// Mount a player for `video` and start its task
    pub fn spawn(
        controller: PlaybackController<E>,
        video: &VideoDetails,
        reporter: Arc<dyn WatchReporter>,
        actions: Arc<dyn VideoActions>,
    ) -> PlayerHandle {
        let (inputs_tx, inputs) = mpsc::channel(INPUT_CAPACITY);
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();

        let mut tracker = WatchTimeTracker::new(video.id.clone(), video.video_type);
        tracker.set_duration(video.duration_millis);
        tracker.observe(0, false);

        let reactions = Reactions::from(video);
        let (view_tx, view) = watch::channel(SessionView {
            player: controller.view(),
            reactions: reactions.clone(),
            watched_secs: 0,
        });

        let session = Self {
            id: SessionId::new(),
            video_id: video.id.clone(),
            controller,
            tracker,
            reactions,
            reporter,
            actions,
            inputs,
            settled_tx,
            settled_rx,
            view_tx,
            origin: Instant::now(),
            reports_sent: 0,
            flushed: false,
        };
        let session_id = session.id;

        info!(session_id = %session_id, video_id = %video.id, "Player mounted");
        let task = tokio::spawn(session.run());

        PlayerHandle {
            session_id,
            inputs: inputs_tx,
            view,
            task,
        }
    }

    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    async fn run(mut self) -> WatchSummary {
        let period = Duration::from_secs(self.controller.config().watch_report_interval_secs);
        let mut watch_tick = tokio::time::interval_at(self.origin + period, period);
        watch_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let deadline = self
                .controller
                .next_deadline()
                .map(|ms| self.origin + Duration::from_millis(ms));

            tokio::select! {
                input = self.inputs.recv() => match input {
                    Some(PlayerInput::Unmount) | None => break,
                    Some(input) => self.on_input(input),
                },
                Some(settled) = self.settled_rx.recv() => self.on_settled(settled),
                _ = sleep_until(deadline) => {
                    let now = self.now_ms();
                    if self.controller.poll_timers(now) {
                        self.publish();
                    }
                }
                _ = watch_tick.tick() => self.on_watch_tick(),
            }
        }

        self.shutdown().await
    }

    fn on_input(&mut self, input: PlayerInput) {
        let now = self.now_ms();
        match input {
            PlayerInput::Event(event) => {
                let changed = self.controller.handle(event, now);
                let duration = self.controller.playback().duration_millis();
                if duration > 0 {
                    self.tracker.set_duration(duration);
                }
                self.tracker.observe(now, self.controller.watch_gate());
                if changed {
                    self.publish();
                }
            }
            PlayerInput::React(kind) => {
                let change = ReactionChange::new(kind, &self.reactions);
                change.apply(&mut self.reactions);
                self.publish();

                let actions = Arc::clone(&self.actions);
                let settled = self.settled_tx.clone();
                let video_id = self.video_id.clone();
                tokio::spawn(async move {
                    let result = actions.perform(&video_id, change.action(), None).await;
                    let _ = settled.send(Settled::Reaction { change, result });
                });
            }
            PlayerInput::Act { action, reason } => {
                let actions = Arc::clone(&self.actions);
                let settled = self.settled_tx.clone();
                let video_id = self.video_id.clone();
                tokio::spawn(async move {
                    let result = actions.perform(&video_id, action, reason).await;
                    let _ = settled.send(Settled::Action { action, result });
                });
            }
            PlayerInput::Unmount => {}
        }
    }

    fn on_settled(&mut self, settled: Settled) {
        let now = self.now_ms();
        match settled {
            Settled::Reaction { change, result } => match result {
                Ok(outcome) => self.reactions.confirm(change.action(), &outcome),
                Err(e) => {
                    debug!(action = %change.action(), error = %e, "Reaction failed, reverting");
                    change.revert(&mut self.reactions);
                    self.controller.show_toast(e.user_message(), now);
                }
            },
            Settled::Action { action, result } => match result {
                Ok(ActionOutcome {
                    message: Some(message),
                    ..
                }) => self.controller.show_toast(message, now),
                Ok(_) => debug!(action = %action, "Action completed"),
                Err(e) => {
                    debug!(action = %action, error = %e, "Action failed");
                    self.controller.show_toast(e.user_message(), now);
                }
            },
        }
        self.publish();
    }

    fn on_watch_tick(&mut self) {
        let now = self.now_ms();
        self.tracker.observe(now, self.controller.watch_gate());

        if let Some(report) = self.tracker.on_interval(now) {
            self.reports_sent += 1;
            let reporter = Arc::clone(&self.reporter);
            tokio::spawn(async move {
                send_report(reporter.as_ref(), &report).await;
            });
            self.publish();
        }
    }

    #[instrument(skip(self), fields(session_id = %self.id))]
    async fn shutdown(&mut self) -> WatchSummary {
        let now = self.now_ms();
        self.tracker.observe(now, self.controller.watch_gate());
        self.controller.teardown();

        if let Some(report) = self.tracker.flush(now) {
            self.reports_sent += 1;
            send_report(self.reporter.as_ref(), &report).await;
        }
        self.flushed = true;
        self.publish();

        info!(
            video_id = %self.video_id,
            watched_secs = self.tracker.watched_secs(),
            reports = self.reports_sent,
            "Player unmounted"
        );

        WatchSummary {
            session_id: self.id,
            video_id: self.video_id.clone(),
            watched_secs: self.tracker.watched_secs(),
            reports_sent: self.reports_sent,
            ended_at: Utc::now(),
        }
    }

    fn publish(&self) {
        self.view_tx.send_replace(SessionView {
            player: self.controller.view(),
            reactions: self.reactions.clone(),
            watched_secs: self.tracker.watched_secs(),
        });
    }
}

impl<E: MediaEngine + 'static> Drop for PlayerSession<E> {
    fn drop(&mut self) {
        if self.flushed {
            return;
        }

        // Task was aborted before unmount; send what we have without waiting
        self.controller.teardown();
        let now = self.now_ms();
        if let Some(report) = self.tracker.flush(now) {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                let reporter = Arc::clone(&self.reporter);
                handle.spawn(async move {
                    send_report(reporter.as_ref(), &report).await;
                });
            }
        }
    }
}

/// Watch-time telemetry is best effort
async fn send_report(reporter: &dyn WatchReporter, report: &WatchReport) {
    match reporter.report_watch(report).await {
        Ok(()) => debug!(seconds = report.watch_duration, "Watch time reported"),
        Err(e) => debug!(error = %e, code = e.error_code(), "Watch time report dropped"),
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
