//! Console sink implementations for the trace-replay binary.
//!
//! These log each intent instead of touching any audio or speech hardware,
//! which is exactly what a replay session wants: the full recognition path
//! runs, and the operator sees every cue and announcement on stderr.

use super::{AudioSink, PresentationSink, SpeechSink};

/// Logs audio-cue intents.
#[derive(Debug, Default)]
pub struct ConsoleAudioSink;

impl AudioSink for ConsoleAudioSink {
    fn play_scanning_cue(&self) {
        log::info!("audio: ▶ scanning cue");
    }

    fn stop_scanning_cue(&self) {
        log::info!("audio: ■ scanning cue");
    }

    fn play_recognized_cue(&self) {
        log::info!("audio: ▶ recognized cue");
    }
}

/// Prints announcements to stdout (and the log).
#[derive(Debug, Default)]
pub struct ConsoleSpeechSink;

impl SpeechSink for ConsoleSpeechSink {
    fn speak(&self, text: &str) {
        log::info!("speech: {text:?}");
        println!("» {text}");
    }
}

/// Logs result-display updates.
#[derive(Debug, Default)]
pub struct ConsolePresentationSink;

impl PresentationSink for ConsolePresentationSink {
    fn on_result(&self, label: &str, confidence_pct: f32) {
        log::info!("display: {label} ({confidence_pct:.2}%)");
    }
}
