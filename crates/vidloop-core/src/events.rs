//! Player lifecycle notifications
//!
//! Engines queue [`PlayerEvent`]s; the session hands each one to every
//! registered [`PlayerObserver`] through [`PlayerEvent::dispatch`]. Two
//! observers ship with the crate:
//! - [`EventLogger`] writes every notification to `tracing`
//! - [`EventRecorder`] keeps sequenced, timestamped records for later export

use crate::types::{PlayerStatus, SessionId, VideoSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{error, info};
use uuid::Uuid;

/// Error reported by the engine alongside a status change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerError {
    pub message: String,
}

impl PlayerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for PlayerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Notification emitted by a playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlayerEvent {
    /// Playback reached the end of the media
    EndOfMedia {
        /// Engine loop flag at the moment the end was reached
        loop_enabled: bool,
    },

    PlayingChanged {
        is_playing: bool,
        was_playing: bool,
    },

    StatusChanged {
        status: PlayerStatus,
        old_status: PlayerStatus,
        error: Option<PlayerError>,
    },

    VolumeChanged {
        volume: f64,
        old_volume: f64,
        is_muted: bool,
    },

    RateChanged {
        rate: f64,
        old_rate: f64,
    },

    SourceChanged {
        source: Option<VideoSource>,
        previous_source: Option<VideoSource>,
    },
}

impl PlayerEvent {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            PlayerEvent::EndOfMedia { .. } => "end_of_media",
            PlayerEvent::PlayingChanged { .. } => "playing_changed",
            PlayerEvent::StatusChanged { .. } => "status_changed",
            PlayerEvent::VolumeChanged { .. } => "volume_changed",
            PlayerEvent::RateChanged { .. } => "rate_changed",
            PlayerEvent::SourceChanged { .. } => "source_changed",
        }
    }

    /// Invoke the observer method matching this notification
    pub fn dispatch(&self, observer: &mut dyn PlayerObserver) {
        match self {
            PlayerEvent::EndOfMedia { loop_enabled } => observer.on_end_of_media(*loop_enabled),
            PlayerEvent::PlayingChanged {
                is_playing,
                was_playing,
            } => observer.on_playing_changed(*is_playing, *was_playing),
            PlayerEvent::StatusChanged {
                status,
                old_status,
                error,
            } => observer.on_status_changed(*status, *old_status, error.as_ref()),
            PlayerEvent::VolumeChanged {
                volume,
                old_volume,
                is_muted,
            } => observer.on_volume_changed(*volume, *old_volume, *is_muted),
            PlayerEvent::RateChanged { rate, old_rate } => {
                observer.on_rate_changed(*rate, *old_rate)
            }
            PlayerEvent::SourceChanged {
                source,
                previous_source,
            } => observer.on_source_changed(source.as_ref(), previous_source.as_ref()),
        }
    }
}

/// Receiver of player notifications. Every method defaults to a no-op.
pub trait PlayerObserver {
    fn on_end_of_media(&mut self, _loop_enabled: bool) {}

    fn on_playing_changed(&mut self, _is_playing: bool, _was_playing: bool) {}

    fn on_status_changed(
        &mut self,
        _status: PlayerStatus,
        _old_status: PlayerStatus,
        _error: Option<&PlayerError>,
    ) {
    }

    fn on_volume_changed(&mut self, _volume: f64, _old_volume: f64, _is_muted: bool) {}

    fn on_rate_changed(&mut self, _rate: f64, _old_rate: f64) {}

    fn on_source_changed(&mut self, _source: Option<&VideoSource>, _previous: Option<&VideoSource>) {}
}

/// Logs every notification through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct EventLogger;

impl EventLogger {
    pub fn new() -> Self {
        Self
    }
}

fn display_source(source: Option<&VideoSource>) -> String {
    source
        .map(|s| s.to_string())
        .unwrap_or_else(|| "none".to_string())
}

impl PlayerObserver for EventLogger {
    fn on_end_of_media(&mut self, loop_enabled: bool) {
        info!(loop_enabled, "Event: end of media reached");
        if loop_enabled {
            info!("Native loop active, engine will restart the media");
        }
    }

    fn on_playing_changed(&mut self, is_playing: bool, was_playing: bool) {
        info!(is_playing, was_playing, "Event: playing changed");
    }

    fn on_status_changed(
        &mut self,
        status: PlayerStatus,
        old_status: PlayerStatus,
        error: Option<&PlayerError>,
    ) {
        info!(status = %status, old_status = %old_status, "Event: status changed");
        if let Some(err) = error {
            error!(error = %err, "Player error reported with status change");
        }
    }

    fn on_volume_changed(&mut self, volume: f64, old_volume: f64, is_muted: bool) {
        info!(volume, old_volume, is_muted, "Event: volume changed");
    }

    fn on_rate_changed(&mut self, rate: f64, old_rate: f64) {
        info!(rate, old_rate, "Event: playback rate changed");
    }

    fn on_source_changed(&mut self, source: Option<&VideoSource>, previous: Option<&VideoSource>) {
        info!(
            source = %display_source(source),
            previous_source = %display_source(previous),
            "Event: source changed"
        );
    }
}

/// Notification with session metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerEventRecord {
    /// Unique event ID
    pub id: Uuid,
    pub session_id: SessionId,
    pub timestamp: DateTime<Utc>,
    /// Position in the session's notification stream, starting at 1
    pub sequence: u64,
    #[serde(flatten)]
    pub event: PlayerEvent,
}

#[derive(Debug)]
struct RecorderInner {
    session_id: SessionId,
    sequence: u64,
    records: Vec<PlayerEventRecord>,
}

/// Collects notifications in arrival order.
///
/// Clones share one buffer, so a caller can keep a handle while the session
/// owns the boxed observer.
#[derive(Debug, Clone)]
pub struct EventRecorder {
    inner: Rc<RefCell<RecorderInner>>,
}

impl EventRecorder {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            inner: Rc::new(RefCell::new(RecorderInner {
                session_id,
                sequence: 0,
                records: Vec::new(),
            })),
        }
    }

    fn record(&self, event: PlayerEvent) {
        let mut inner = self.inner.borrow_mut();
        inner.sequence += 1;
        let record = PlayerEventRecord {
            id: Uuid::new_v4(),
            session_id: inner.session_id,
            timestamp: Utc::now(),
            sequence: inner.sequence,
            event,
        };
        inner.records.push(record);
    }

    /// Copy of everything recorded so far
    pub fn records(&self) -> Vec<PlayerEventRecord> {
        self.inner.borrow().records.clone()
    }

    /// Recorded events without metadata
    pub fn events(&self) -> Vec<PlayerEvent> {
        self.inner
            .borrow()
            .records
            .iter()
            .map(|r| r.event.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop recorded events. The sequence counter keeps counting.
    pub fn clear(&self) {
        self.inner.borrow_mut().records.clear();
    }

    /// Export as a pretty-printed JSON array
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.inner.borrow().records)
    }
}

impl PlayerObserver for EventRecorder {
    fn on_end_of_media(&mut self, loop_enabled: bool) {
        self.record(PlayerEvent::EndOfMedia { loop_enabled });
    }

    fn on_playing_changed(&mut self, is_playing: bool, was_playing: bool) {
        self.record(PlayerEvent::PlayingChanged {
            is_playing,
            was_playing,
        });
    }

    fn on_status_changed(
        &mut self,
        status: PlayerStatus,
        old_status: PlayerStatus,
        error: Option<&PlayerError>,
    ) {
        self.record(PlayerEvent::StatusChanged {
            status,
            old_status,
            error: error.cloned(),
        });
    }

    fn on_volume_changed(&mut self, volume: f64, old_volume: f64, is_muted: bool) {
        self.record(PlayerEvent::VolumeChanged {
            volume,
            old_volume,
            is_muted,
        });
    }

    fn on_rate_changed(&mut self, rate: f64, old_rate: f64) {
        self.record(PlayerEvent::RateChanged { rate, old_rate });
    }

    fn on_source_changed(&mut self, source: Option<&VideoSource>, previous: Option<&VideoSource>) {
        self.record(PlayerEvent::SourceChanged {
            source: source.cloned(),
            previous_source: previous.cloned(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_reaches_matching_method() {
        let recorder = EventRecorder::new(SessionId::new());
        let mut observer = recorder.clone();

        let events = vec![
            PlayerEvent::PlayingChanged {
                is_playing: true,
                was_playing: false,
            },
            PlayerEvent::RateChanged {
                rate: 2.0,
                old_rate: 1.0,
            },
            PlayerEvent::EndOfMedia { loop_enabled: false },
        ];
        for event in &events {
            event.dispatch(&mut observer);
        }

        assert_eq!(recorder.events(), events);
    }

    #[test]
    fn test_recorder_sequence_survives_clear() {
        let recorder = EventRecorder::new(SessionId::new());
        let mut observer = recorder.clone();

        observer.on_end_of_media(true);
        observer.on_end_of_media(true);
        recorder.clear();
        assert!(recorder.is_empty());

        observer.on_end_of_media(true);
        let records = recorder.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sequence, 3);
    }

    #[test]
    fn test_status_error_recorded_unchanged() {
        let recorder = EventRecorder::new(SessionId::new());
        let mut observer = recorder.clone();
        let err = PlayerError::new("decoder crashed");

        observer.on_status_changed(PlayerStatus::Error, PlayerStatus::ReadyToPlay, Some(&err));

        match &recorder.events()[0] {
            PlayerEvent::StatusChanged { error, status, .. } => {
                assert_eq!(*status, PlayerStatus::Error);
                assert_eq!(error.as_ref(), Some(&err));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_record_json_is_flat() {
        let recorder = EventRecorder::new(SessionId::new());
        let mut observer = recorder.clone();
        observer.on_volume_changed(0.5, 1.0, false);

        let json: serde_json::Value = serde_json::from_str(&recorder.to_json().unwrap()).unwrap();
        assert_eq!(json[0]["event"], "volume_changed");
        assert_eq!(json[0]["volume"], 0.5);
        assert_eq!(json[0]["sequence"], 1);
    }

    #[derive(Clone, Default)]
    struct CaptureWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture_logs(f: impl FnOnce()) -> String {
        let writer = CaptureWriter::default();
        let sink = writer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = writer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_logger_reports_status_error_at_error_level() {
        let logs = capture_logs(|| {
            let mut logger = EventLogger::new();
            logger.on_status_changed(
                PlayerStatus::Error,
                PlayerStatus::Loading,
                Some(&PlayerError::new("404 from origin")),
            );
        });

        let error_line = logs
            .lines()
            .find(|l| l.contains("Player error reported"))
            .expect("error line logged");
        assert!(error_line.contains("ERROR"));
        assert!(error_line.contains("404 from origin"));
        assert!(logs.contains("Event: status changed"));
    }

    #[test]
    fn test_logger_status_without_error_stays_info() {
        let logs = capture_logs(|| {
            EventLogger::new().on_status_changed(
                PlayerStatus::ReadyToPlay,
                PlayerStatus::Loading,
                None,
            );
        });
        assert!(logs.contains("INFO"));
        assert!(!logs.contains("ERROR"));
    }

    #[test]
    fn test_logger_marks_native_restart() {
        let source = VideoSource::default();
        let logs = capture_logs(|| {
            let mut logger = EventLogger::new();
            logger.on_end_of_media(true);
            logger.on_end_of_media(false);
            logger.on_source_changed(Some(&source), None);
        });

        assert_eq!(logs.matches("Event: end of media reached").count(), 2);
        assert_eq!(logs.matches("Native loop active").count(), 1);
        assert!(logs.contains("previous_source=none"));
        assert!(logs.contains("ForBiggerEscapes.mp4"));
    }
}
