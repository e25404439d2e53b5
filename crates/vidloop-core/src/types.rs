//! Core types for vidloop

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use url::Url;
use uuid::Uuid;

/// Media played when no source is configured
pub const DEFAULT_SOURCE: &str =
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ForBiggerEscapes.mp4";

/// Unique identifier for a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which strategy restarts the media when it reaches its end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    /// The engine restarts on its own; its loop flag is armed
    #[default]
    Native,
    /// The application seeks to zero and plays again on end-of-media
    Manual,
}

impl LoopMode {
    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            LoopMode::Native => LoopMode::Manual,
            LoopMode::Manual => LoopMode::Native,
        }
    }

    /// Value the engine's loop flag must hold while this mode is active
    pub fn engine_loop_flag(self) -> bool {
        self == LoopMode::Native
    }
}

impl std::fmt::Display for LoopMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopMode::Native => write!(f, "native"),
            LoopMode::Manual => write!(f, "manual"),
        }
    }
}

impl FromStr for LoopMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "native" => Ok(LoopMode::Native),
            "manual" => Ok(LoopMode::Manual),
            other => Err(Error::config(format!("unknown loop mode '{}'", other))),
        }
    }
}

/// Engine load status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayerStatus {
    /// No media loaded
    #[default]
    Idle,
    /// Media is being fetched
    Loading,
    /// Enough media is available to play
    ReadyToPlay,
    /// The engine failed to load or play the media
    Error,
}

impl std::fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerStatus::Idle => write!(f, "idle"),
            PlayerStatus::Loading => write!(f, "loading"),
            PlayerStatus::ReadyToPlay => write!(f, "readyToPlay"),
            PlayerStatus::Error => write!(f, "error"),
        }
    }
}

/// A validated media location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoSource(Url);

impl VideoSource {
    /// Parse and validate a media URL. Only http(s) and file URLs are playable.
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input).map_err(|reason| Error::InvalidSource {
            source_str: input.to_string(),
            reason,
        })?;

        match url.scheme() {
            "http" | "https" | "file" => Ok(Self(url)),
            other => Err(Error::UnsupportedScheme(other.to_string())),
        }
    }

    pub fn url(&self) -> &Url {
        &self.0
    }
}

impl Default for VideoSource {
    fn default() -> Self {
        Self(Url::parse(DEFAULT_SOURCE).expect("default source is a valid URL"))
    }
}

impl std::fmt::Display for VideoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Loop-controller state for one playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Active loop strategy
    pub mode: LoopMode,
    /// Last playing state reported by the engine
    pub is_playing: bool,
}

/// Point-in-time view of the engine's properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub current_time: f64,
    pub duration: f64,
    pub is_live: bool,
    #[serde(rename = "loop")]
    pub loop_enabled: bool,
    pub muted: bool,
    pub playback_rate: f64,
    pub playing: bool,
    pub source: Option<VideoSource>,
    pub status: PlayerStatus,
    pub volume: f64,
}

impl PlayerSnapshot {
    /// Property name/value pairs in display order
    pub fn properties(&self) -> Vec<(&'static str, String)> {
        vec![
            ("currentTime", format!("{:.3}", self.current_time)),
            ("duration", format!("{:.3}", self.duration)),
            ("isLive", self.is_live.to_string()),
            ("loop", self.loop_enabled.to_string()),
            ("muted", self.muted.to_string()),
            ("playbackRate", self.playback_rate.to_string()),
            ("playing", self.playing.to_string()),
            (
                "source",
                self.source
                    .as_ref()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "none".to_string()),
            ),
            ("status", self.status.to_string()),
            ("volume", self.volume.to_string()),
        ]
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Media to load when the session starts
    pub source: String,
    /// Loop strategy armed at startup
    pub initial_mode: LoopMode,
    /// Start playing as soon as the session is created
    pub autoplay: bool,
    /// Initial volume (0.0 - 1.0)
    pub volume: f64,
    /// Start muted
    pub muted: bool,
    /// Initial playback rate
    pub playback_rate: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            initial_mode: LoopMode::Native,
            autoplay: false,
            volume: 1.0,
            muted: false,
            playback_rate: 1.0,
        }
    }
}

impl PlayerConfig {
    /// Load configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: PlayerConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and the media source
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(Error::config(format!(
                "volume must be within 0.0..=1.0, got {}",
                self.volume
            )));
        }
        if self.playback_rate.is_nan() || self.playback_rate <= 0.0 {
            return Err(Error::config(format!(
                "playback_rate must be positive, got {}",
                self.playback_rate
            )));
        }
        self.video_source().map(|_| ())
    }

    /// Parsed form of `source`
    pub fn video_source(&self) -> Result<VideoSource> {
        VideoSource::parse(&self.source)
    }
}
