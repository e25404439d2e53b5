//! Loop modes example
//!
//! Plays the same simulated clip with native and then manual looping and
//! prints the engine commands each mode issues at end of media.
//!
//! Run with: cargo run -p vidloop-core --example loop_modes

use vidloop_core::{
    EventRecorder, LoopMode, PlaybackEngine, PlaybackSession, PlayerConfig, SimulatedEngine,
};

fn run(mode: LoopMode) -> vidloop_core::Result<()> {
    let config = PlayerConfig {
        initial_mode: mode,
        autoplay: true,
        ..Default::default()
    };

    let mut session = PlaybackSession::new(SimulatedEngine::new(15.0), &config)?;
    let recorder = EventRecorder::new(session.id());
    session.subscribe(Box::new(recorder.clone()));
    session.pump();
    session.engine_mut().clear_commands();
    recorder.clear();

    // Two full passes over the clip
    session.engine_mut().advance(15.0);
    session.pump();
    session.engine_mut().advance(15.0);
    session.pump();

    println!("Mode: {}", mode);
    println!("  loop flag: {}", session.engine().loop_enabled());
    println!("  still playing: {}", session.is_playing());
    println!("  commands at end of media:");
    if session.engine().commands().is_empty() {
        println!("    (none, engine restarted on its own)");
    }
    for command in session.engine().commands() {
        println!("    {}", command);
    }
    println!("  notifications:");
    for event in recorder.events() {
        println!("    {}", event.name());
    }
    println!();

    Ok(())
}

fn main() -> vidloop_core::Result<()> {
    println!("vidloop - Loop Modes Example");
    println!("============================\n");

    run(LoopMode::Native)?;
    run(LoopMode::Manual)?;

    println!("Example complete!");
    Ok(())
}
