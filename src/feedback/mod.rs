//! Feedback intents and the collaborator interfaces that carry them.
//!
//! The core never touches media players, TTS engines or screens directly.
//! [`FeedbackCoordinator`](coordinator::FeedbackCoordinator) translates
//! engine phase transitions into calls against three narrow, fire-and-forget
//! traits; the host wires in platform implementations, the trace-replay
//! binary wires in the console ones from [`console`].
//!
//! All three traits are object-safe and `Send + Sync` so implementations can
//! be shared as `Arc<dyn …>` across the actor task and the host.

pub mod console;
pub mod coordinator;

pub use console::{ConsoleAudioSink, ConsolePresentationSink, ConsoleSpeechSink};
pub use coordinator::FeedbackCoordinator;

// ---------------------------------------------------------------------------
// AudioSink
// ---------------------------------------------------------------------------

/// Plays the scanning / recognized audio cues.
///
/// # Contract
///
/// Every method is idempotent and fire-and-forget: starting a cue that is
/// already playing, or stopping one that is not, must be harmless.  Calls may
/// block briefly on device I/O, which is why the coordinator issues them only
/// after the state transition has been computed.
pub trait AudioSink: Send + Sync {
    /// Start (or keep playing) the looping "scanning" cue.
    fn play_scanning_cue(&self);
    /// Stop the "scanning" cue.
    fn stop_scanning_cue(&self);
    /// Play the one-shot "recognized" cue.
    fn play_recognized_cue(&self);
}

// ---------------------------------------------------------------------------
// SpeechSink
// ---------------------------------------------------------------------------

/// Speaks announcement text.
///
/// Queue-flushing semantics: a new utterance interrupts any in-progress one,
/// so a fresh recognition is never stuck behind a stale announcement.
pub trait SpeechSink: Send + Sync {
    /// Speak `text`, interrupting any in-progress utterance.
    fn speak(&self, text: &str);
}

// ---------------------------------------------------------------------------
// PresentationSink
// ---------------------------------------------------------------------------

/// Renders the last result to a screen.
///
/// Called whenever the settled result changes — both on a new recognition and
/// when the reset timer decays the display back to its idle values.
pub trait PresentationSink: Send + Sync {
    /// Show `label` with its confidence as a percentage (0.0 – 100.0).
    fn on_result(&self, label: &str, confidence_pct: f32);
}

// Compile-time assertion: all three traits must stay object-safe.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn AudioSink>, _: Box<dyn SpeechSink>, _: Box<dyn PresentationSink>) {
    }
};
