//! CLI command implementations

use crate::output::{format_events, format_snapshot, to_json, OutputFormat};
use anyhow::{anyhow, bail, Context};
use serde::Serialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};
use vidloop_core::{
    EventLogger, EventRecorder, PlaybackEngine, PlaybackSession, PlaybackState,
    PlayerConfig, PlayerEvent, SimulatedEngine, VideoSource,
};

/// One user action replayed against a session
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ToggleLoop,
    Play,
    Pause,
    TogglePlay,
    Advance(f64),
    End,
    Fail(String),
    Volume(f64),
    Mute,
    Unmute,
    Rate(f64),
    Source(String),
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };

        let number = |arg: Option<&str>| -> anyhow::Result<f64> {
            let raw = arg.ok_or_else(|| anyhow!("action '{}' needs a value", name))?;
            let value = raw
                .parse::<f64>()
                .with_context(|| format!("invalid number '{}' for action '{}'", raw, name))?;
            if !value.is_finite() {
                bail!("value for action '{}' must be finite, got '{}'", name, raw);
            }
            Ok(value)
        };

        let action = match name.to_lowercase().as_str() {
            "toggle-loop" => Action::ToggleLoop,
            "play" => Action::Play,
            "pause" => Action::Pause,
            "toggle-play" => Action::TogglePlay,
            "advance" => Action::Advance(number(arg)?),
            "end" => Action::End,
            "fail" => Action::Fail(arg.unwrap_or("unknown error").to_string()),
            "volume" => Action::Volume(number(arg)?),
            "mute" => Action::Mute,
            "unmute" => Action::Unmute,
            "rate" => Action::Rate(number(arg)?),
            "source" => Action::Source(
                arg.ok_or_else(|| anyhow!("action 'source' needs a URL"))?
                    .to_string(),
            ),
            other => bail!("unknown action '{}'", other),
        };
        Ok(action)
    }
}

impl Action {
    /// Apply to the session and dispatch the resulting notifications
    pub fn apply(&self, session: &mut PlaybackSession<SimulatedEngine>) -> anyhow::Result<()> {
        match self {
            Action::ToggleLoop => {
                let mode = session.toggle_mode();
                info!(mode = %mode, "Action: toggle loop");
            }
            Action::Play => session.engine_mut().play(),
            Action::Pause => session.engine_mut().pause(),
            Action::TogglePlay => session.toggle_play_pause(),
            Action::Advance(secs) => session.engine_mut().advance(*secs),
            Action::End => session.engine_mut().play_to_end(),
            Action::Fail(msg) => session.engine_mut().fail(msg.clone()),
            Action::Volume(v) => session.engine_mut().set_volume(*v),
            Action::Mute => session.engine_mut().set_muted(true),
            Action::Unmute => session.engine_mut().set_muted(false),
            Action::Rate(r) => session.engine_mut().set_playback_rate(*r),
            Action::Source(url) => {
                let source = VideoSource::parse(url)?;
                session.engine_mut().replace_source(source);
            }
        }
        session.pump();
        Ok(())
    }
}

/// Final state printed after a run
#[derive(Debug, Serialize)]
struct RunSummary {
    state: PlaybackState,
    loops_completed: usize,
    current_time: f64,
    commands_issued: usize,
}

fn start_session(
    config: &PlayerConfig,
    duration: f64,
) -> anyhow::Result<(PlaybackSession<SimulatedEngine>, EventRecorder)> {
    let mut session = PlaybackSession::new(SimulatedEngine::new(duration), config)
        .context("failed to start playback session")?;
    let recorder = EventRecorder::new(session.id());
    session.subscribe(Box::new(EventLogger::new()));
    session.subscribe(Box::new(recorder.clone()));
    session.pump();
    Ok((session, recorder))
}

fn count_loops(recorder: &EventRecorder) -> usize {
    recorder
        .events()
        .iter()
        .filter(|e| matches!(e, PlayerEvent::EndOfMedia { .. }))
        .count()
}

fn print_summary(
    session: &PlaybackSession<SimulatedEngine>,
    recorder: &EventRecorder,
    format: OutputFormat,
) {
    let summary = RunSummary {
        state: session.state(),
        loops_completed: count_loops(recorder),
        current_time: session.engine().current_time(),
        commands_issued: session.engine().commands().len(),
    };

    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "summary": summary,
                "events": recorder.records(),
            });
            println!("{}", to_json(&out));
        }
        _ => {
            println!("\nEvents:");
            println!("{}", format_events(&recorder.records(), format));
            println!("\nSummary:");
            println!("  Mode: {}", summary.state.mode);
            println!("  Playing: {}", summary.state.is_playing);
            println!("  End-of-media events: {}", summary.loops_completed);
            println!("  Position: {:.3}s", summary.current_time);
            println!("  Engine commands: {}", summary.commands_issued);
        }
    }
}

/// Print the properties of a freshly loaded player
pub fn inspect(config: &PlayerConfig, duration: f64, format: OutputFormat) -> anyhow::Result<()> {
    let (session, _recorder) = start_session(config, duration)?;
    if format != OutputFormat::Json {
        println!("Player properties for {}:", config.source);
    }
    println!("{}", format_snapshot(&session.snapshot(), format));
    Ok(())
}

/// Replay a list of actions deterministically
pub fn script(
    config: &PlayerConfig,
    duration: f64,
    actions: &[String],
    format: OutputFormat,
) -> anyhow::Result<()> {
    let actions = actions
        .iter()
        .map(|a| a.parse::<Action>())
        .collect::<anyhow::Result<Vec<_>>>()?;

    let (mut session, recorder) = start_session(config, duration)?;
    for action in &actions {
        action.apply(&mut session)?;
    }

    print_summary(&session, &recorder, format);
    session.release();
    Ok(())
}

/// Play in real time until `loops` end-of-media events or Ctrl-C
pub async fn play(
    config: &PlayerConfig,
    duration: f64,
    loops: usize,
    tick_ms: u64,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if tick_ms == 0 {
        bail!("tick interval must be positive");
    }
    if !duration.is_finite() || duration <= 0.0 {
        bail!("media duration must be a positive number of seconds, got {}", duration);
    }

    let (mut session, recorder) = start_session(config, duration)?;
    if !session.is_playing() {
        session.toggle_play_pause();
        session.pump();
    }

    info!(mode = %session.mode(), loops, "Playing; press Ctrl-C to stop");

    let tick = Duration::from_millis(tick_ms);
    let mut interval = tokio::time::interval(tick);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                session.engine_mut().advance(tick.as_secs_f64());
                session.pump();

                if loops > 0 && count_loops(&recorder) >= loops {
                    info!(loops, "Requested loops completed");
                    break;
                }
                // Both loop modes resume playback after end of media
                if !session.is_playing() {
                    warn!(status = %session.engine().status(), "Playback stopped, ending session");
                    break;
                }
            }
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
        }
    }

    print_summary(&session, &recorder, format);
    session.release();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidloop_core::LoopMode;

    #[test]
    fn test_action_parse() {
        assert_eq!("toggle-loop".parse::<Action>().unwrap(), Action::ToggleLoop);
        assert_eq!("advance:2.5".parse::<Action>().unwrap(), Action::Advance(2.5));
        assert_eq!(
            "fail:boom".parse::<Action>().unwrap(),
            Action::Fail("boom".to_string())
        );
        assert!("advance".parse::<Action>().is_err());
        assert!("rate:fast".parse::<Action>().is_err());
        assert!("rewind".parse::<Action>().is_err());
    }

    #[test]
    fn test_action_rejects_non_finite_values() {
        for raw in ["advance:1e400", "advance:inf", "advance:NaN", "rate:inf", "volume:-inf"] {
            assert!(raw.parse::<Action>().is_err(), "{} should be rejected", raw);
        }
        assert_eq!("advance:1e20".parse::<Action>().unwrap(), Action::Advance(1e20));
    }

    #[test]
    fn test_huge_advance_in_script_terminates() {
        let (mut session, recorder) = start_session(&PlayerConfig::default(), 15.0).unwrap();
        for raw in ["play", "advance:1e20"] {
            raw.parse::<Action>().unwrap().apply(&mut session).unwrap();
        }
        assert!(session.is_playing());
        assert!(count_loops(&recorder) >= 1);
    }

    #[tokio::test]
    async fn test_play_rejects_unusable_duration() {
        let config = PlayerConfig::default();
        for duration in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            assert!(play(&config, duration, 3, 100, OutputFormat::Text).await.is_err());
        }
    }

    #[test]
    fn test_script_manual_loop() {
        let (mut session, recorder) = start_session(&PlayerConfig::default(), 10.0).unwrap();

        for raw in ["toggle-loop", "play", "advance:10", "advance:4"] {
            raw.parse::<Action>().unwrap().apply(&mut session).unwrap();
        }

        assert_eq!(session.mode(), LoopMode::Manual);
        assert!(session.is_playing());
        assert_eq!(session.engine().current_time(), 4.0);
        assert_eq!(count_loops(&recorder), 1);
    }

    #[test]
    fn test_script_bad_source() {
        let (mut session, _recorder) = start_session(&PlayerConfig::default(), 10.0).unwrap();
        let action = "source:not-a-url".parse::<Action>().unwrap();
        assert!(action.apply(&mut session).is_err());
    }
}
