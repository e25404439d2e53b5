//! Simulated playback engine
//!
//! Deterministic, in-memory stand-in for a real decoder. Time only moves when
//! [`SimulatedEngine::advance`] is called, every command is appended to a log,
//! and notifications queue up until drained.

use crate::engine::{EngineCommand, PlaybackEngine};
use crate::events::{PlayerError, PlayerEvent};
use crate::types::{PlayerStatus, VideoSource};
use tracing::{debug, warn};

/// Upper bound on end-of-media notifications queued by one `advance` call
pub const MAX_LOOP_EVENTS_PER_ADVANCE: usize = 64;

/// In-memory [`PlaybackEngine`]
#[derive(Debug, Clone)]
pub struct SimulatedEngine {
    loop_enabled: bool,
    playing: bool,
    current_time: f64,
    duration: f64,
    is_live: bool,
    muted: bool,
    volume: f64,
    playback_rate: f64,
    status: PlayerStatus,
    source: Option<VideoSource>,
    events: Vec<PlayerEvent>,
    commands: Vec<EngineCommand>,
}

impl SimulatedEngine {
    /// Create an idle engine whose media lasts `duration` seconds once loaded
    pub fn new(duration: f64) -> Self {
        Self {
            loop_enabled: false,
            playing: false,
            current_time: 0.0,
            duration: if duration.is_finite() { duration.max(0.0) } else { 0.0 },
            is_live: false,
            muted: false,
            volume: 1.0,
            playback_rate: 1.0,
            status: PlayerStatus::Idle,
            source: None,
            events: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Mark the media as a live stream
    pub fn live(mut self, is_live: bool) -> Self {
        self.is_live = is_live;
        self
    }

    /// Every command received so far, oldest first
    pub fn commands(&self) -> &[EngineCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Number of notifications waiting to be drained
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Move playback forward by `seconds` of wall time, scaled by the rate.
    ///
    /// A looping engine emits one end-of-media per wrap, capped at
    /// [`MAX_LOOP_EVENTS_PER_ADVANCE`].
    pub fn advance(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            warn!(seconds, "Ignoring non-finite advance");
            return;
        }
        if !self.playing || self.status != PlayerStatus::ReadyToPlay || seconds <= 0.0 {
            return;
        }
        if self.duration <= 0.0 {
            return;
        }

        let position = self.current_time + seconds * self.playback_rate;
        if !position.is_finite() {
            warn!(seconds, rate = self.playback_rate, "Ignoring advance past representable time");
            return;
        }
        if position < self.duration {
            self.current_time = position;
            return;
        }
        if !self.loop_enabled {
            self.finish();
            return;
        }

        let wraps = (position / self.duration).floor();
        self.current_time = position % self.duration;
        let emitted = wraps.min(MAX_LOOP_EVENTS_PER_ADVANCE as f64) as usize;
        if (emitted as f64) < wraps {
            debug!(wraps, emitted, "Collapsed loop notifications");
        }
        for _ in 0..emitted {
            self.events.push(PlayerEvent::EndOfMedia { loop_enabled: true });
        }
    }

    /// Jump straight to the end of the media
    pub fn play_to_end(&mut self) {
        if self.status != PlayerStatus::ReadyToPlay {
            warn!(status = %self.status, "Cannot reach end of media before it is ready");
            return;
        }
        if self.loop_enabled {
            self.current_time = 0.0;
            self.events.push(PlayerEvent::EndOfMedia { loop_enabled: true });
        } else {
            self.finish();
        }
    }

    /// Put the engine into the error state
    pub fn fail(&mut self, message: impl Into<String>) {
        let error = PlayerError::new(message);
        warn!(error = %error, "Simulated engine failure");
        self.set_playing(false);
        self.set_status(PlayerStatus::Error, Some(error));
    }

    fn finish(&mut self) {
        self.current_time = self.duration;
        self.set_playing(false);
        self.events.push(PlayerEvent::EndOfMedia { loop_enabled: false });
    }

    fn set_playing(&mut self, playing: bool) {
        if self.playing != playing {
            let was_playing = self.playing;
            self.playing = playing;
            self.events.push(PlayerEvent::PlayingChanged {
                is_playing: playing,
                was_playing,
            });
        }
    }

    fn set_status(&mut self, status: PlayerStatus, error: Option<PlayerError>) {
        if self.status != status || error.is_some() {
            let old_status = self.status;
            self.status = status;
            self.events.push(PlayerEvent::StatusChanged {
                status,
                old_status,
                error,
            });
        }
    }
}

impl PlaybackEngine for SimulatedEngine {
    fn set_loop(&mut self, enabled: bool) {
        self.commands.push(EngineCommand::SetLoop { enabled });
        self.loop_enabled = enabled;
    }

    fn play(&mut self) {
        self.commands.push(EngineCommand::Play);
        if self.status == PlayerStatus::Error {
            warn!("Ignoring play while in error state");
            return;
        }
        self.set_playing(true);
    }

    fn pause(&mut self) {
        self.commands.push(EngineCommand::Pause);
        self.set_playing(false);
    }

    fn seek(&mut self, time: f64) {
        self.commands.push(EngineCommand::Seek { time });
        self.current_time = time.clamp(0.0, self.duration);
        debug!(time = self.current_time, "Seeked");
    }

    fn set_volume(&mut self, volume: f64) {
        self.commands.push(EngineCommand::SetVolume { volume });
        let volume = volume.clamp(0.0, 1.0);
        if volume != self.volume {
            let old_volume = self.volume;
            self.volume = volume;
            self.events.push(PlayerEvent::VolumeChanged {
                volume,
                old_volume,
                is_muted: self.muted,
            });
        }
    }

    fn set_muted(&mut self, muted: bool) {
        self.commands.push(EngineCommand::SetMuted { muted });
        if muted != self.muted {
            self.muted = muted;
            self.events.push(PlayerEvent::VolumeChanged {
                volume: self.volume,
                old_volume: self.volume,
                is_muted: muted,
            });
        }
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.commands.push(EngineCommand::SetPlaybackRate { rate });
        if !rate.is_finite() || rate <= 0.0 {
            warn!(rate, "Ignoring non-positive or non-finite playback rate");
            return;
        }
        if rate != self.playback_rate {
            let old_rate = self.playback_rate;
            self.playback_rate = rate;
            self.events.push(PlayerEvent::RateChanged { rate, old_rate });
        }
    }

    fn replace_source(&mut self, source: VideoSource) {
        self.commands.push(EngineCommand::ReplaceSource {
            source: source.clone(),
        });
        let previous_source = self.source.replace(source.clone());
        self.events.push(PlayerEvent::SourceChanged {
            source: Some(source),
            previous_source,
        });

        self.current_time = 0.0;
        self.set_status(PlayerStatus::Loading, None);
        self.set_status(PlayerStatus::ReadyToPlay, None);
    }

    fn loop_enabled(&self) -> bool {
        self.loop_enabled
    }

    fn playing(&self) -> bool {
        self.playing
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn duration(&self) -> f64 {
        match self.status {
            PlayerStatus::ReadyToPlay => self.duration,
            _ => 0.0,
        }
    }

    fn is_live(&self) -> bool {
        self.is_live
    }

    fn muted(&self) -> bool {
        self.muted
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    fn status(&self) -> PlayerStatus {
        self.status
    }

    fn source(&self) -> Option<&VideoSource> {
        self.source.as_ref()
    }

    fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.events)
    }
}
