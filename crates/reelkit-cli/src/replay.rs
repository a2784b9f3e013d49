//! Trace replay
//!
//! Feeds a recorded list of timestamped player events through a controller
//! over a `SimulatedEngine`. Between events the engine clock advances in
//! fixed steps and each step is delivered as a status callback, the way the
//! platform player reports progress.

use anyhow::{bail, Context};
use reelkit_core::{
    EngineCommand, MediaEngine, PlaybackController, PlayerConfig, PlayerEvent, SimulatedEngine,
    VideoId, VideoType, ViewState, WatchTimeTracker,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Recorded session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trace {
    /// Start with the engine already playing
    #[serde(default)]
    pub start_playing: bool,
    pub steps: Vec<TraceStep>,
}

/// One event and when it happened
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStep {
    pub at_ms: u64,
    pub event: PlayerEvent,
}

/// Engine command and the time it was issued
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedCommand {
    pub at_ms: u64,
    pub command: EngineCommand,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayReport {
    pub commands: Vec<LoggedCommand>,
    pub view: ViewState,
    pub watched_secs: u64,
}

impl Trace {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read trace {}", path.display()))?;
        let trace = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid trace {}", path.display()))?;
        Ok(trace)
    }
}

struct Replayer {
    controller: PlaybackController<SimulatedEngine>,
    tracker: WatchTimeTracker,
    log: Vec<LoggedCommand>,
    seen: usize,
    now: u64,
}

impl Replayer {
    fn handle(&mut self, event: PlayerEvent, at_ms: u64) {
        self.now = at_ms;
        self.controller.handle(event, at_ms);
        self.tracker.observe(at_ms, self.controller.watch_gate());

        let commands = self.controller.engine().commands();
        for command in &commands[self.seen..] {
            debug!(at_ms, %command, "Engine command");
            self.log.push(LoggedCommand {
                at_ms,
                command: *command,
            });
        }
        self.seen = commands.len();
    }

    /// Advance the engine clock to `target`, one status callback per step
    fn advance_to(&mut self, target: u64, step_ms: u64) {
        while self.now < target {
            let elapsed = step_ms.min(target - self.now);
            let status = self.controller.engine_mut().advance(elapsed);
            let at = self.now + elapsed;
            self.handle(PlayerEvent::Status(status), at);
        }
    }
}

/// Run `trace` and collect the command log and final view
pub fn run(
    trace: &Trace,
    config: PlayerConfig,
    duration_ms: u64,
    step_ms: u64,
) -> anyhow::Result<ReplayReport> {
    if step_ms == 0 {
        bail!("step must be greater than zero");
    }
    if let Some(pair) = trace.steps.windows(2).find(|w| w[1].at_ms < w[0].at_ms) {
        bail!(
            "trace steps out of order: {} ms after {} ms",
            pair[1].at_ms,
            pair[0].at_ms
        );
    }

    let mut engine = SimulatedEngine::loaded(duration_ms);
    if trace.start_playing {
        engine.play()?;
    }
    let status = engine.status();
    engine.clear_commands();

    let mut tracker = WatchTimeTracker::new(VideoId::new("replay"), VideoType::Channel);
    tracker.set_duration(duration_ms);

    let mut replayer = Replayer {
        controller: PlaybackController::new(engine, config),
        tracker,
        log: Vec::new(),
        seen: 0,
        now: 0,
    };
    replayer.tracker.observe(0, false);
    replayer.handle(PlayerEvent::Status(status), 0);

    for step in &trace.steps {
        replayer.advance_to(step.at_ms, step_ms);
        replayer.handle(step.event.clone(), step.at_ms);
    }

    let end = replayer.now;
    replayer.controller.poll_timers(end);
    let view = replayer.controller.view();
    let watched_secs = replayer
        .tracker
        .flush(end)
        .map(|report| report.watch_duration)
        .unwrap_or(0);
    replayer.controller.teardown();

    info!(
        steps = trace.steps.len(),
        commands = replayer.log.len(),
        watched_secs,
        "Replay finished"
    );

    Ok(ReplayReport {
        commands: replayer.log,
        view,
        watched_secs,
    })
}
