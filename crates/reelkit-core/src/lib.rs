//! Reelkit Core - Playback interaction library for Reelkit
//!
//! This crate provides the interaction core of a mobile video player screen:
//! - Tap, double-tap and drag classification
//! - Drag seeking with a single commit on release
//! - Reconciliation of engine status callbacks with local state
//! - Watch-time telemetry with a guaranteed final flush
//! - REST client and optimistic reaction updates
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Reelkit Core                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │   Gesture    │  │     Seek     │  │   Playback   │           │
//! │  │ Interpreter  │  │ Coordinator  │  │  Reconciler  │           │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘           │
//! │         │                 │                 │                   │
//! │         └─────────────────┼─────────────────┘                   │
//! │                           │                                     │
//! │                    ┌──────┴──────┐        ┌──────────────┐      │
//! │                    │  Playback   │───────▶│ Media Engine │      │
//! │                    │ Controller  │        └──────────────┘      │
//! │                    └──────┬──────┘                              │
//! │                           │                                     │
//! │  ┌──────────────┐  ┌──────┴──────┐  ┌──────────────┐            │
//! │  │  Watch-Time  │  │   Player    │  │  API Client  │            │
//! │  │   Tracker    │──│   Session   │──│ + Optimistic │            │
//! │  └──────────────┘  └─────────────┘  └──────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod types;
pub mod format;
pub mod gesture;
pub mod seek;
pub mod reconciler;
pub mod timers;
pub mod engine;
pub mod controller;
pub mod watch_time;
pub mod api;
pub mod optimistic;
pub mod config;
pub mod session;

pub use error::{Error, Result};
pub use types::*;
pub use format::format_time;
pub use gesture::{Gesture, GestureInterpreter, RawTouch, TouchPhase, TouchTarget};
pub use seek::{SeekCoordinator, SeekState};
pub use reconciler::{PlaybackMachine, Reconciled, Transition};
pub use timers::{TimerKind, TimerSet};
pub use engine::{EngineCommand, MediaEngine, SimulatedEngine};
pub use controller::{PlaybackController, PlayerEvent, ViewState};
pub use watch_time::{WatchReport, WatchReporter, WatchTimeTracker};
pub use api::{ActionOutcome, ApiClient, VideoAction, VideoActions, VideoDetails};
pub use optimistic::{run_optimistic, Mutation, ReactionChange, ReactionKind, Reactions};
pub use config::{ApiConfig, Settings};
pub use session::{PlayerHandle, PlayerInput, PlayerSession, SessionView, WatchSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
pub fn init() {
    tracing::info!(version = VERSION, "Reelkit Core initialized");
}
