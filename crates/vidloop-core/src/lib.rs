//! vidloop Core - loop-mode playback control
//!
//! This crate provides the pieces of a single video-playback session:
//! - A loop-mode controller choosing between engine-driven (native) and
//!   application-driven (manual) restarts at end of media
//! - The playback engine contract consumed by the controller
//! - Lifecycle notifications and observers (tracing logger, event recorder)
//! - A deterministic simulated engine for demos and tests
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     PlaybackSession                      │
//! │                                                          │
//! │   toggle_mode / toggle_play_pause        pump()          │
//! │            │                               │             │
//! │     ┌──────┴───────┐   commands    ┌───────┴───────┐     │
//! │     │     Loop     │──────────────▶│   Playback    │     │
//! │     │  Controller  │◀──────────────│    Engine     │     │
//! │     └──────────────┘  end / playing└───────┬───────┘     │
//! │                                            │ events      │
//! │                                   ┌────────┴────────┐    │
//! │                                   │    Observers    │    │
//! │                                   │ logger/recorder │    │
//! │                                   └─────────────────┘    │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod types;
pub mod engine;
pub mod events;
pub mod controller;
pub mod session;
pub mod sim;

pub use error::{Error, Result};
pub use types::*;
pub use engine::{EngineCommand, PlaybackEngine};
pub use events::{EventLogger, EventRecorder, PlayerError, PlayerEvent, PlayerEventRecord, PlayerObserver};
pub use controller::LoopController;
pub use session::PlaybackSession;
pub use sim::SimulatedEngine;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log library initialization
pub fn init() {
    tracing::info!(version = VERSION, "vidloop core initialized");
}
