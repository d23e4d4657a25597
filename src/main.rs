//! Application entry point — cashlens trace replay.
//!
//! Replays a recorded classifier trace from stdin through the full
//! recognition path, with console sinks standing in for the platform audio,
//! speech and display glue:
//!
//! ```text
//! cashlens < session.jsonl
//! ```
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Load the class vocabulary and the preference store.
//! 4. Create the tokio runtime.
//! 5. Spawn a source thread that paces the trace and feeds the observation
//!    channel.
//! 6. Run the recognizer actor until the trace ends.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use cashlens::{
    config::AppConfig,
    engine::{Observation, Recognizer},
    feedback::{
        AudioSink, ConsoleAudioSink, ConsolePresentationSink, ConsoleSpeechSink,
        FeedbackCoordinator, PresentationSink, SpeechSink,
    },
    prefs::PreferenceGate,
    source::{ObservationSource, SourceError, TraceSource},
    vocab::Vocabulary,
};

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("cashlens starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    log::info!(
        "recognition: threshold {:.2}, dwell {} ms, reset {} ms, speech {}",
        config.recognition.confidence_threshold,
        config.recognition.dwell_ms,
        config.recognition.reset_ms,
        config.speech.language,
    );

    // 3. Vocabulary and preferences
    let vocab = Vocabulary::load_or_default();
    let prefs = PreferenceGate::load_or_default();
    log::info!(
        "{} recognized classes, sounds {}, flash {}",
        vocab.len(),
        if prefs.get().sounds_enabled { "on" } else { "off" },
        if prefs.get().flash_enabled { "on" } else { "off" },
    );

    // 4. Tokio runtime (2 workers — the actor and its reset timers)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    // 5. Source thread: stdin trace → observation channel.  Source errors
    //    stay on this side of the channel; the engine only ever sees
    //    well-formed observations or silence.
    let (obs_tx, obs_rx) = mpsc::channel::<Observation>(32);

    let source_thread = std::thread::Builder::new()
        .name("trace-source".into())
        .spawn(move || {
            let stdin = std::io::BufReader::new(std::io::stdin());
            let mut source = TraceSource::new(stdin, Instant::now());
            loop {
                match source.next_observation() {
                    Ok(Some(obs)) => {
                        if obs_tx.blocking_send(obs).is_err() {
                            break; // recognizer is gone
                        }
                    }
                    Ok(None) => {
                        log::info!("source: trace ended");
                        break;
                    }
                    Err(SourceError::Malformed(msg)) => {
                        log::warn!("source: skipping malformed record: {msg}");
                    }
                    Err(e @ SourceError::Unavailable(_)) => {
                        log::error!("source: {e}");
                        break;
                    }
                }
            }
        })?;

    // 6. Recognizer actor with console sinks
    let coordinator = FeedbackCoordinator::new(
        Arc::new(ConsoleAudioSink) as Arc<dyn AudioSink>,
        Arc::new(ConsoleSpeechSink) as Arc<dyn SpeechSink>,
        prefs,
    );
    let recognizer = Recognizer::new(
        &config.recognition,
        coordinator,
        Arc::new(ConsolePresentationSink) as Arc<dyn PresentationSink>,
        vocab,
    );

    rt.block_on(recognizer.run(obs_rx));

    let _ = source_thread.join();
    log::info!("cashlens shut down");
    Ok(())
}
