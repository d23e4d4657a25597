//! cashlens — recognition-stabilization core for a camera banknote reader.
//!
//! The surrounding application points a phone camera at a banknote, runs an
//! image classifier on every frame, and announces the denomination by voice
//! for visually-impaired users.  This crate is the part with actual temporal
//! behaviour: turning the noisy per-frame `(label, confidence)` stream into a
//! small number of trustworthy, debounced announcements.
//!
//! # Architecture
//!
//! ```text
//! ObservationSource ──▶ Recognizer (actor) ──▶ FeedbackCoordinator ──▶ Audio/SpeechSink
//!                          │    ▲                      │
//!                          │    └── reset timer        └── PreferenceGate
//!                          └──▶ PresentationSink
//! ```
//!
//! * [`engine::Stabilizer`] — the Idle/Pending/Settled state machine:
//!   confidence threshold, dwell rule, reset-to-idle decay.
//! * [`engine::Recognizer`] — single-task actor that serializes classifier
//!   frames and timer firings so the state machine never races.
//! * [`feedback`] — the coordinator plus the narrow sink traits the host
//!   implements (audio cues, speech, result display).
//! * [`prefs::PreferenceGate`] — user toggles, snapshot reads, fire-and-forget
//!   persistence.
//! * [`vocab::Vocabulary`] — class-code → denomination mapping, deployment
//!   configuration.
//! * [`source`] — the classifier collaborator contract and a JSONL
//!   trace-replay source used by the binary.
//!
//! Camera capture, model inference, media playback and speech synthesis are
//! all out of scope; they live behind the collaborator traits.

pub mod config;
pub mod engine;
pub mod feedback;
pub mod prefs;
pub mod source;
pub mod vocab;

pub use config::AppConfig;
pub use engine::{Observation, Recognizer, Stabilizer};
pub use feedback::FeedbackCoordinator;
pub use prefs::{PreferenceGate, Preferences};
pub use vocab::Vocabulary;
