//! Loop-mode controller
//!
//! Decides who restarts the media at its end. In [`LoopMode::Native`] the
//! engine's own loop flag is armed and end-of-media is ignored; in
//! [`LoopMode::Manual`] the flag is disarmed and the controller answers
//! end-of-media with `seek(0)` followed by `play()`.
//!
//! The controller never stores the engine. Every operation that touches it
//! borrows the engine for the duration of the call.

use crate::engine::PlaybackEngine;
use crate::types::{LoopMode, PlaybackState};
use tracing::{debug, info, warn};

/// Keeps the engine's loop flag consistent with the active [`LoopMode`]
#[derive(Debug, Clone, Default)]
pub struct LoopController {
    state: PlaybackState,
}

impl LoopController {
    /// Create a controller in `mode` and arm the engine accordingly
    pub fn new(mode: LoopMode, engine: &mut dyn PlaybackEngine) -> Self {
        let mut controller = Self {
            state: PlaybackState {
                mode,
                is_playing: engine.playing(),
            },
        };
        controller.set_mode(mode, engine);
        controller
    }

    pub fn mode(&self) -> LoopMode {
        self.state.mode
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Switch strategy. The engine flag is resynchronised immediately, even
    /// mid-playback.
    pub fn set_mode(&mut self, mode: LoopMode, engine: &mut dyn PlaybackEngine) {
        engine.set_loop(mode.engine_loop_flag());
        if self.state.mode != mode {
            info!(from = %self.state.mode, to = %mode, "Loop mode changed");
        }
        self.state.mode = mode;
    }

    /// Flip between native and manual looping. Returns the new mode.
    pub fn toggle_mode(&mut self, engine: &mut dyn PlaybackEngine) -> LoopMode {
        let mode = self.state.mode.toggled();
        self.set_mode(mode, engine);
        mode
    }

    /// Pause when playing, play otherwise
    pub fn toggle_play_pause(&mut self, engine: &mut dyn PlaybackEngine) {
        if self.state.is_playing {
            engine.pause();
        } else {
            engine.play();
        }
    }

    /// React to the engine reaching the end of the media
    pub fn on_end_of_media(&mut self, engine: &mut dyn PlaybackEngine) {
        let expected = self.state.mode.engine_loop_flag();
        if engine.loop_enabled() != expected {
            // Mode is authoritative; something reset the engine flag behind our back.
            warn!(
                mode = %self.state.mode,
                engine_loop = engine.loop_enabled(),
                "Engine loop flag out of sync, resetting"
            );
            engine.set_loop(expected);
        }

        match self.state.mode {
            LoopMode::Manual => {
                debug!("Manual loop: restarting from the beginning");
                engine.seek(0.0);
                engine.play();
            }
            LoopMode::Native => {
                debug!("Native loop: engine restarts on its own");
            }
        }
    }

    /// Mirror the engine's playing state
    pub fn on_playing_changed(&mut self, is_playing: bool) {
        self.state.is_playing = is_playing;
    }
}
