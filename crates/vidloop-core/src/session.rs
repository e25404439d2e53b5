//! Playback Session - owns one engine instance for its whole lifetime
//!
//! Coordinates:
//! - Initial engine setup (loop mode, volume, rate, source)
//! - Notification dispatch to the loop controller and observers
//! - Presentation actions (toggle loop mode, toggle play/pause)

use crate::{
    controller::LoopController,
    engine::PlaybackEngine,
    events::{PlayerEvent, PlayerObserver},
    types::*,
    Result,
};
use tracing::{debug, info, instrument};

/// Logs the end of a session however it ends
struct ReleaseGuard(SessionId);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        info!(session_id = %self.0, "Player instance released");
    }
}

/// A single playback session
pub struct PlaybackSession<E: PlaybackEngine> {
    /// Unique session ID
    id: SessionId,
    /// Exclusively owned engine
    engine: E,
    /// Loop policy
    controller: LoopController,
    /// Notification sinks, in registration order
    observers: Vec<Box<dyn PlayerObserver>>,
    _guard: ReleaseGuard,
}

impl<E: PlaybackEngine> PlaybackSession<E> {
    /// Start a session on `engine`.
    ///
    /// The engine is configured from `config` and the source is loaded. The
    /// notifications produced during setup stay queued until the first
    /// [`pump`](Self::pump), so observers subscribed right after creation see
    /// them.
    pub fn new(mut engine: E, config: &PlayerConfig) -> Result<Self> {
        config.validate()?;
        let source = config.video_source()?;
        let id = SessionId::new();

        info!(session_id = %id, source = %source, mode = %config.initial_mode, "Starting playback session");

        let controller = LoopController::new(config.initial_mode, &mut engine);
        engine.set_volume(config.volume);
        engine.set_muted(config.muted);
        engine.set_playback_rate(config.playback_rate);
        engine.replace_source(source);

        let mut session = Self {
            id,
            engine,
            controller,
            observers: Vec::new(),
            _guard: ReleaseGuard(id),
        };
        session.log_properties();

        if config.autoplay {
            session.engine.play();
        }

        Ok(session)
    }

    /// Get session ID
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Register a notification sink
    pub fn subscribe(&mut self, observer: Box<dyn PlayerObserver>) {
        self.observers.push(observer);
    }

    pub fn mode(&self) -> LoopMode {
        self.controller.mode()
    }

    pub fn is_playing(&self) -> bool {
        self.controller.is_playing()
    }

    pub fn state(&self) -> PlaybackState {
        self.controller.state()
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        self.engine.snapshot()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Direct engine access, for drivers that advance time or inject faults
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Switch loop strategy
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn set_mode(&mut self, mode: LoopMode) {
        self.controller.set_mode(mode, &mut self.engine);
        info!(loop_enabled = self.engine.loop_enabled(), "Loop mode set");
    }

    /// Flip loop strategy. Returns the new mode.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn toggle_mode(&mut self) -> LoopMode {
        let mode = self.controller.toggle_mode(&mut self.engine);
        info!(mode = %mode, loop_enabled = self.engine.loop_enabled(), "Loop mode toggled");
        mode
    }

    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn toggle_play_pause(&mut self) {
        self.controller.toggle_play_pause(&mut self.engine);
    }

    /// Dispatch every queued engine notification, oldest first.
    ///
    /// Commands issued while handling a notification may queue more; those are
    /// dispatched in the same call. Returns the number of notifications handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let events = self.engine.drain_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                self.dispatch(&event);
                handled += 1;
            }
        }
        handled
    }

    fn dispatch(&mut self, event: &PlayerEvent) {
        debug!(session_id = %self.id, event = event.name(), "Dispatching notification");

        match event {
            PlayerEvent::EndOfMedia { .. } => self.controller.on_end_of_media(&mut self.engine),
            PlayerEvent::PlayingChanged { is_playing, .. } => {
                self.controller.on_playing_changed(*is_playing)
            }
            _ => {}
        }

        for observer in self.observers.iter_mut() {
            event.dispatch(observer.as_mut());
        }
    }

    /// End the session and hand the engine back.
    ///
    /// Pending notifications are delivered first.
    pub fn release(mut self) -> E {
        self.pump();
        info!(session_id = %self.id, "Player instance being released");
        self.engine
    }

    fn log_properties(&self) {
        let snapshot = self.engine.snapshot();
        info!(session_id = %self.id, "Initial player properties:");
        for (name, value) in snapshot.properties() {
            info!("  {}: {}", name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineCommand;
    use crate::events::{EventRecorder, PlayerError};
    use crate::sim::SimulatedEngine;

    fn session(mode: LoopMode) -> PlaybackSession<SimulatedEngine> {
        let config = PlayerConfig {
            initial_mode: mode,
            ..Default::default()
        };
        PlaybackSession::new(SimulatedEngine::new(15.0), &config).unwrap()
    }

    #[test]
    fn test_session_creation() {
        let session = session(LoopMode::Native);
        assert_eq!(session.mode(), LoopMode::Native);
        assert!(!session.is_playing());

        let snapshot = session.snapshot();
        assert!(snapshot.loop_enabled);
        assert_eq!(snapshot.status, PlayerStatus::ReadyToPlay);
        assert_eq!(snapshot.duration, 15.0);
        assert_eq!(snapshot.source, Some(VideoSource::default()));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PlayerConfig {
            source: "mailto:nobody@example.com".to_string(),
            ..Default::default()
        };
        assert!(PlaybackSession::new(SimulatedEngine::new(15.0), &config).is_err());
    }

    #[test]
    fn test_setup_events_reach_late_subscriber() {
        let mut session = session(LoopMode::Native);
        let recorder = EventRecorder::new(session.id());
        session.subscribe(Box::new(recorder.clone()));

        session.pump();
        let events = recorder.events();
        assert!(matches!(events[0], PlayerEvent::SourceChanged { .. }));
        assert!(matches!(
            events.last(),
            Some(PlayerEvent::StatusChanged {
                status: PlayerStatus::ReadyToPlay,
                ..
            })
        ));
    }

    #[test]
    fn test_autoplay() {
        let config = PlayerConfig {
            autoplay: true,
            ..Default::default()
        };
        let mut session = PlaybackSession::new(SimulatedEngine::new(15.0), &config).unwrap();
        session.pump();
        assert!(session.is_playing());
    }

    #[test]
    fn test_manual_loop_restarts_media() {
        let mut session = session(LoopMode::Manual);
        session.toggle_play_pause();
        session.pump();
        session.engine_mut().clear_commands();

        session.engine_mut().advance(16.0);
        session.pump();

        assert!(session.is_playing());
        assert_eq!(session.engine().current_time(), 0.0);
        assert_eq!(
            session.engine().commands(),
            &[EngineCommand::Seek { time: 0.0 }, EngineCommand::Play]
        );
    }

    #[test]
    fn test_native_loop_issues_no_commands() {
        let mut session = session(LoopMode::Native);
        session.toggle_play_pause();
        session.pump();
        session.engine_mut().clear_commands();

        session.engine_mut().advance(16.0);
        session.pump();

        assert!(session.is_playing());
        assert!(session.engine().commands().is_empty());
    }

    #[test]
    fn test_toggle_mode_mid_playback_resyncs_immediately() {
        let mut session = session(LoopMode::Native);
        session.toggle_play_pause();
        session.pump();
        session.engine_mut().advance(5.0);

        assert_eq!(session.toggle_mode(), LoopMode::Manual);
        assert!(!session.engine().loop_enabled());
    }

    #[test]
    fn test_status_error_surfaced_unchanged() {
        let mut session = session(LoopMode::Manual);
        let recorder = EventRecorder::new(session.id());
        session.subscribe(Box::new(recorder.clone()));
        session.pump();
        recorder.clear();
        session.engine_mut().clear_commands();

        session.engine_mut().fail("media not found");
        session.pump();

        assert!(session.engine().commands().is_empty());
        let errors: Vec<PlayerError> = recorder
            .events()
            .into_iter()
            .filter_map(|e| match e {
                PlayerEvent::StatusChanged { error, .. } => error,
                _ => None,
            })
            .collect();
        assert_eq!(errors, vec![PlayerError::new("media not found")]);
    }

    #[test]
    fn test_observers_see_events_in_engine_order() {
        let mut session = session(LoopMode::Native);
        session.pump();
        let first = EventRecorder::new(session.id());
        let second = EventRecorder::new(session.id());
        session.subscribe(Box::new(first.clone()));
        session.subscribe(Box::new(second.clone()));

        session.toggle_play_pause();
        session.pump();
        session.toggle_play_pause();
        session.pump();

        let expected = vec![
            PlayerEvent::PlayingChanged {
                is_playing: true,
                was_playing: false,
            },
            PlayerEvent::PlayingChanged {
                is_playing: false,
                was_playing: true,
            },
        ];
        assert_eq!(first.events(), expected);
        assert_eq!(second.events(), expected);
        assert!(!session.is_playing());
    }

    #[test]
    fn test_release_returns_engine() {
        let mut session = session(LoopMode::Manual);
        session.toggle_play_pause();
        let engine = session.release();
        assert_eq!(engine.pending_events(), 0);
        assert!(engine.playing());
    }
}
