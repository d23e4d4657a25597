//! Translates engine phase transitions into feedback intents.
//!
//! The coordinator owns the "is the scanning cue playing" bookkeeping and
//! consults the [`PreferenceGate`] at the moment of each transition — never a
//! cached copy, so a settings-UI toggle takes effect on the very next
//! transition.
//!
//! One deliberate asymmetry: `sounds_enabled` mutes the audio cues but never
//! the spoken announcement.  Voice feedback is what makes the application
//! usable for its audience; the sound toggle only controls the beeps.

use std::sync::Arc;

use crate::prefs::PreferenceGate;

use super::{AudioSink, SpeechSink};

// ---------------------------------------------------------------------------
// FeedbackCoordinator
// ---------------------------------------------------------------------------

/// Issues abstract feedback commands in response to engine transitions.
///
/// Owned by the recognizer actor; methods take `&mut self` because the
/// scanning-cue bookkeeping is part of the actor's single-threaded state.
pub struct FeedbackCoordinator {
    audio: Arc<dyn AudioSink>,
    speech: Arc<dyn SpeechSink>,
    prefs: PreferenceGate,
    /// Whether a scanning-cue start intent is outstanding.  Tracked even when
    /// sounds are muted so the toggle cannot desynchronize the bookkeeping.
    scanning_active: bool,
}

impl FeedbackCoordinator {
    /// Create a coordinator over the given sinks and preference store.
    pub fn new(audio: Arc<dyn AudioSink>, speech: Arc<dyn SpeechSink>, prefs: PreferenceGate) -> Self {
        Self {
            audio,
            speech,
            prefs,
            scanning_active: false,
        }
    }

    /// Idle→Pending or continued Pending: ensure the scanning cue is playing.
    ///
    /// Idempotent — never double-starts.  When sounds are disabled the intent
    /// is recorded but the sink call is suppressed (muted, not skipped).
    pub fn ensure_scanning(&mut self) {
        if self.scanning_active {
            return;
        }
        self.scanning_active = true;

        if self.prefs.get().sounds_enabled {
            self.audio.play_scanning_cue();
        } else {
            log::debug!("feedback: scanning cue muted by preference");
        }
    }

    /// Pending→Settled: stop the scanning cue, play the recognized cue, and
    /// speak the result.
    ///
    /// `spoken` is the display/spoken form of the recognized label (e.g.
    /// `"20 pesos"`), already mapped through the vocabulary.
    pub fn announce(&mut self, spoken: &str) {
        let prefs = self.prefs.get();

        if self.scanning_active {
            self.scanning_active = false;
            self.audio.stop_scanning_cue();
        }

        if prefs.sounds_enabled {
            self.audio.play_recognized_cue();
        } else {
            log::debug!("feedback: recognized cue muted by preference");
        }

        // Never gated by sounds_enabled.
        self.speech.speak(spoken);
    }

    /// Whether a scanning-cue start intent is currently outstanding.
    pub fn is_scanning_cue_active(&self) -> bool {
        self.scanning_active
    }

    /// Current flash preference, exposed for the camera collaborator when it
    /// (re)configures capture parameters.  The coordinator itself never
    /// controls the flash hardware.
    pub fn flash_enabled(&self) -> bool {
        self.prefs.get().flash_enabled
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
