//! Recognition-stabilization engine.
//!
//! The classifier emits one noisy [`Observation`] per camera frame.  The
//! [`Stabilizer`](stabilizer::Stabilizer) turns that stream into debounced
//! [`Recognition`](stabilizer::Recognition) events — at most one per sustained
//! detection — and decays back to idle after a reset interval.  The
//! [`Recognizer`](runner::Recognizer) actor serializes observations and timer
//! firings onto a single task so the state machine never sees two callers at
//! once.

pub mod runner;
pub mod stabilizer;

pub use runner::Recognizer;
pub use stabilizer::{Phase, Recognition, Stabilizer};

use std::time::Instant;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Observation
// ---------------------------------------------------------------------------

/// One classifier output for one camera frame.
///
/// Produced by the classification collaborator, consumed exactly once by the
/// stabilizer, never stored.
#[derive(Debug, Clone)]
pub struct Observation {
    /// Opaque class identifier (e.g. a denomination code such as `"20ar"`).
    pub label: String,
    /// Classifier confidence in `[0.0, 1.0]`.
    pub confidence: f32,
    /// Monotonic capture instant of the frame.
    pub timestamp: Instant,
}

impl Observation {
    /// Convenience constructor.
    pub fn new(label: impl Into<String>, confidence: f32, timestamp: Instant) -> Self {
        Self {
            label: label.into(),
            confidence,
            timestamp,
        }
    }
}

// ---------------------------------------------------------------------------
// ObservationError
// ---------------------------------------------------------------------------

/// A malformed observation, rejected before it can touch engine state.
///
/// The caller decides whether to drop the frame or abort the source; the
/// engine itself never errors for "no detection" — that is the normal
/// `Ok(None)` path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObservationError {
    /// Confidence was outside `[0.0, 1.0]` (or not a number).
    #[error("confidence {0} is outside [0.0, 1.0]")]
    ConfidenceOutOfRange(f32),

    /// The observation's timestamp precedes a previously accepted frame.
    #[error("observation timestamp precedes a previously accepted frame")]
    NonMonotonicTimestamp,
}
