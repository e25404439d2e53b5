//! Playback engine contract
//!
//! The engine owns decode and render state. vidloop only issues commands to it
//! and reads its properties; notifications flow back through
//! [`PlaybackEngine::drain_events`].

use crate::events::PlayerEvent;
use crate::types::{PlayerSnapshot, PlayerStatus, VideoSource};
use serde::{Deserialize, Serialize};

/// A mutating call issued to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EngineCommand {
    SetLoop { enabled: bool },
    Play,
    Pause,
    Seek { time: f64 },
    SetVolume { volume: f64 },
    SetMuted { muted: bool },
    SetPlaybackRate { rate: f64 },
    ReplaceSource { source: VideoSource },
}

impl std::fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineCommand::SetLoop { enabled } => write!(f, "set_loop({})", enabled),
            EngineCommand::Play => write!(f, "play()"),
            EngineCommand::Pause => write!(f, "pause()"),
            EngineCommand::Seek { time } => write!(f, "seek({})", time),
            EngineCommand::SetVolume { volume } => write!(f, "set_volume({})", volume),
            EngineCommand::SetMuted { muted } => write!(f, "set_muted({})", muted),
            EngineCommand::SetPlaybackRate { rate } => write!(f, "set_playback_rate({})", rate),
            EngineCommand::ReplaceSource { source } => write!(f, "replace_source({})", source),
        }
    }
}

/// Media player backend driven by a playback session.
///
/// Commands are fire-and-forget: failures are reported by the engine through
/// a [`PlayerEvent::StatusChanged`] carrying an error, never as a return value.
pub trait PlaybackEngine {
    // Commands

    fn set_loop(&mut self, enabled: bool);
    fn play(&mut self);
    fn pause(&mut self);
    /// Seek to `time` seconds from the start of the media
    fn seek(&mut self, time: f64);
    fn set_volume(&mut self, volume: f64);
    fn set_muted(&mut self, muted: bool);
    fn set_playback_rate(&mut self, rate: f64);
    fn replace_source(&mut self, source: VideoSource);

    // Properties

    fn loop_enabled(&self) -> bool;
    fn playing(&self) -> bool;
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn is_live(&self) -> bool;
    fn muted(&self) -> bool;
    fn volume(&self) -> f64;
    fn playback_rate(&self) -> f64;
    fn status(&self) -> PlayerStatus;
    fn source(&self) -> Option<&VideoSource>;

    /// Take the notifications emitted since the last call, oldest first
    fn drain_events(&mut self) -> Vec<PlayerEvent>;

    /// Capture every property at once
    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            current_time: self.current_time(),
            duration: self.duration(),
            is_live: self.is_live(),
            loop_enabled: self.loop_enabled(),
            muted: self.muted(),
            playback_rate: self.playback_rate(),
            playing: self.playing(),
            source: self.source().cloned(),
            status: self.status(),
            volume: self.volume(),
        }
    }
}
