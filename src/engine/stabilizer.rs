//! The stabilization state machine.
//!
//! [`Stabilizer`] consumes per-frame [`Observation`]s and applies two rules
//! before anything is announced:
//!
//! 1. **Threshold** — frames below the configured confidence are noise.
//! 2. **Dwell** — a candidate must stay above threshold for the configured
//!    dwell duration before it settles.
//!
//! The state machine is:
//!
//! ```text
//! Idle ──conf ≥ thr──▶ Pending ──dwell elapsed, conf ≥ thr──▶ Settled
//!  ▲                      │                                      │
//!  └──────conf < thr──────┘          reset interval elapsed      │
//!  ▲                                                             │
//!  └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A settled result is immune to low-confidence frames; only the reset timer
//! clears it.  The stabilizer is not internally synchronized — it assumes at
//! most one caller at a time.  [`Recognizer`](super::runner::Recognizer)
//! provides that discipline by funnelling observations and timer firings
//! through one actor task.

use std::time::Instant;

use crate::config::{LabelSwitchPolicy, RecognitionConfig};

use super::{Observation, ObservationError};

// ---------------------------------------------------------------------------
// Recognition
// ---------------------------------------------------------------------------

/// A confirmed, debounced detection — emitted exactly once per settle.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    /// Class label of the confirming frame.
    pub label: String,
    /// Confidence of the confirming frame.
    pub confidence: f32,
    /// Timestamp of the confirming frame; the reset interval counts from
    /// here.
    pub settled_at: Instant,
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The stabilizer's phase.  Candidate and settled data live inside the
/// variants, so a candidate exists iff the phase is `Pending` and a settled
/// result exists iff the phase is `Settled` — by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Nothing above threshold recently.
    Idle,
    /// A candidate label is accumulating dwell time.
    Pending {
        /// The candidate currently above threshold.
        label: String,
        /// When the candidate first crossed threshold.
        since: Instant,
    },
    /// A recognition has been confirmed and announced; held until the reset
    /// timer clears it.
    Settled(Recognition),
}

impl Phase {
    /// Returns `true` in the `Idle` phase.
    pub fn is_idle(&self) -> bool {
        matches!(self, Phase::Idle)
    }

    /// Returns `true` while a candidate is accumulating dwell time.
    pub fn is_pending(&self) -> bool {
        matches!(self, Phase::Pending { .. })
    }

    /// Returns `true` while a confirmed result is being held.
    pub fn is_settled(&self) -> bool {
        matches!(self, Phase::Settled(_))
    }
}

// ---------------------------------------------------------------------------
// Stabilizer
// ---------------------------------------------------------------------------

/// Converts a raw observation stream into debounced recognition events.
///
/// # Example
///
/// ```rust
/// use std::time::{Duration, Instant};
/// use cashlens::config::RecognitionConfig;
/// use cashlens::engine::{Observation, Stabilizer};
///
/// let mut engine = Stabilizer::new(RecognitionConfig::default());
/// let t0 = Instant::now();
///
/// // First high-confidence frame starts the dwell window.
/// assert!(engine.observe(Observation::new("20ar", 0.995, t0)).unwrap().is_none());
///
/// // A frame past the 2 s dwell confirms the detection.
/// let t1 = t0 + Duration::from_millis(2_100);
/// let event = engine.observe(Observation::new("20ar", 0.996, t1)).unwrap();
/// assert_eq!(event.unwrap().label, "20ar");
/// ```
pub struct Stabilizer {
    config: RecognitionConfig,
    phase: Phase,
    /// Timestamp of the last accepted observation, for monotonicity checks.
    last_timestamp: Option<Instant>,
}

impl Stabilizer {
    /// Create a stabilizer with the given (deployment-injected) settings.
    pub fn new(config: RecognitionConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            last_timestamp: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The held recognition, if any.
    pub fn settled(&self) -> Option<&Recognition> {
        match &self.phase {
            Phase::Settled(rec) => Some(rec),
            _ => None,
        }
    }

    // -----------------------------------------------------------------------
    // observe
    // -----------------------------------------------------------------------

    /// Feed one classifier observation through the state machine.
    ///
    /// Returns `Ok(Some(_))` exactly once per stabilized detection; every
    /// other accepted frame returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`ObservationError`] when the confidence is outside `[0, 1]` or the
    /// timestamp precedes a previously accepted frame.  Rejected frames do
    /// not mutate state.
    pub fn observe(&mut self, obs: Observation) -> Result<Option<Recognition>, ObservationError> {
        // Validation happens before any state change.
        if !(0.0..=1.0).contains(&obs.confidence) {
            return Err(ObservationError::ConfidenceOutOfRange(obs.confidence));
        }
        if let Some(last) = self.last_timestamp {
            if obs.timestamp < last {
                return Err(ObservationError::NonMonotonicTimestamp);
            }
        }
        self.last_timestamp = Some(obs.timestamp);

        if obs.confidence < self.config.confidence_threshold {
            // A single low-confidence frame abandons a candidate but never
            // touches a settled result — that only clears via the reset
            // timer.
            if self.phase.is_pending() {
                log::debug!("stabilizer: candidate abandoned, back to idle");
                self.phase = Phase::Idle;
            }
            return Ok(None);
        }

        let mut event = None;
        self.phase = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => {
                log::debug!(
                    "stabilizer: candidate {:?} started dwell ({:.3})",
                    obs.label,
                    obs.confidence
                );
                Phase::Pending {
                    label: obs.label,
                    since: obs.timestamp,
                }
            }

            Phase::Pending { label, since } => {
                if self.config.label_switch == LabelSwitchPolicy::Restart && label != obs.label {
                    log::debug!(
                        "stabilizer: candidate switched {:?} → {:?}, dwell restarted",
                        label,
                        obs.label
                    );
                    Phase::Pending {
                        label: obs.label,
                        since: obs.timestamp,
                    }
                } else if obs.timestamp.duration_since(since) >= self.config.dwell() {
                    let rec = Recognition {
                        label: obs.label,
                        confidence: obs.confidence,
                        settled_at: obs.timestamp,
                    };
                    log::info!(
                        "stabilizer: settled on {:?} ({:.1}%)",
                        rec.label,
                        rec.confidence * 100.0
                    );
                    event = Some(rec.clone());
                    Phase::Settled(rec)
                } else {
                    Phase::Pending { label, since }
                }
            }

            // Already settled: further high-confidence frames are not
            // re-emitted until the reset timer returns us to idle.
            settled @ Phase::Settled(_) => settled,
        };

        Ok(event)
    }

    // -----------------------------------------------------------------------
    // reset_fired
    // -----------------------------------------------------------------------

    /// Invoked when the reset timer armed at settling time fires.
    ///
    /// Returns `true` when the settled result was cleared (Settled → Idle).
    /// A stale firing — one superseded by a rearm for a newer settle — fails
    /// the elapsed-time guard and is a no-op.
    pub fn reset_fired(&mut self, now: Instant) -> bool {
        if let Phase::Settled(rec) = &self.phase {
            if now.duration_since(rec.settled_at) >= self.config.reset_interval() {
                log::debug!("stabilizer: settled result decayed to idle");
                self.phase = Phase::Idle;
                return true;
            }
        }
        false
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(policy: LabelSwitchPolicy) -> RecognitionConfig {
        RecognitionConfig {
            confidence_threshold: 0.99,
            dwell_ms: 2_000,
            reset_ms: 30_000,
            label_switch: policy,
        }
    }

    fn engine() -> Stabilizer {
        Stabilizer::new(config(LabelSwitchPolicy::Restart))
    }

    fn obs(label: &str, confidence: f32, t0: Instant, offset_ms: u64) -> Observation {
        Observation::new(label, confidence, t0 + Duration::from_millis(offset_ms))
    }

    // ---- threshold gate ---

    #[test]
    fn below_threshold_never_emits_and_stays_idle() {
        let mut e = engine();
        let t0 = Instant::now();
        for i in 0..50u64 {
            let event = e.observe(obs("20ar", 0.5, t0, i * 33)).unwrap();
            assert!(event.is_none());
            assert!(e.phase().is_idle());
        }
    }

    #[test]
    fn high_confidence_frame_moves_idle_to_pending() {
        let mut e = engine();
        let t0 = Instant::now();
        assert!(e.observe(obs("20ar", 0.995, t0, 0)).unwrap().is_none());
        assert!(e.phase().is_pending());
    }

    #[test]
    fn low_confidence_frame_abandons_pending_without_event() {
        let mut e = engine();
        let t0 = Instant::now();
        e.observe(obs("20ar", 0.995, t0, 0)).unwrap();
        let event = e.observe(obs("20ar", 0.3, t0, 100)).unwrap();
        assert!(event.is_none());
        assert!(e.phase().is_idle());
    }

    // ---- dwell rule ---

    #[test]
    fn dwell_not_elapsed_stays_pending_without_event() {
        let mut e = engine();
        let t0 = Instant::now();
        e.observe(obs("20ar", 0.995, t0, 0)).unwrap();
        let event = e.observe(obs("20ar", 0.995, t0, 500)).unwrap();
        assert!(event.is_none());
        assert!(e.phase().is_pending());
    }

    #[test]
    fn dwell_elapsed_emits_exactly_one_event() {
        let mut e = engine();
        let t0 = Instant::now();
        e.observe(obs("20ar", 0.995, t0, 0)).unwrap();
        e.observe(obs("20ar", 0.995, t0, 500)).unwrap();

        let event = e.observe(obs("20ar", 0.996, t0, 2_100)).unwrap();
        let rec = event.expect("should settle");
        assert_eq!(rec.label, "20ar");
        assert_eq!(rec.confidence, 0.996);
        assert_eq!(rec.settled_at, t0 + Duration::from_millis(2_100));
        assert!(e.phase().is_settled());

        // Further high-confidence frames must not re-emit.
        for i in 0..10u64 {
            let again = e.observe(obs("20ar", 0.999, t0, 2_200 + i * 33)).unwrap();
            assert!(again.is_none(), "settle must be idempotent");
        }
    }

    #[test]
    fn dwell_boundary_is_inclusive() {
        let mut e = engine();
        let t0 = Instant::now();
        e.observe(obs("20ar", 0.995, t0, 0)).unwrap();
        // Exactly dwell_ms after the window opened.
        let event = e.observe(obs("20ar", 0.995, t0, 2_000)).unwrap();
        assert!(event.is_some());
    }

    // ---- settled immunity & reset ---

    #[test]
    fn settled_ignores_low_confidence_frames() {
        let mut e = engine();
        let t0 = Instant::now();
        e.observe(obs("20ar", 0.995, t0, 0)).unwrap();
        e.observe(obs("20ar", 0.996, t0, 2_100)).unwrap();
        assert!(e.phase().is_settled());

        e.observe(obs("20ar", 0.5, t0, 2_200)).unwrap();
        assert!(e.phase().is_settled(), "only the reset timer clears Settled");
    }

    #[test]
    fn stale_reset_timer_is_a_no_op() {
        let mut e = engine();
        let t0 = Instant::now();
        e.observe(obs("20ar", 0.995, t0, 0)).unwrap();
        e.observe(obs("20ar", 0.996, t0, 2_100)).unwrap();

        // Fired too early (e.g. a timer superseded by a rearm).
        let early = t0 + Duration::from_millis(2_100 + 29_999);
        assert!(!e.reset_fired(early));
        assert!(e.phase().is_settled());
    }

    #[test]
    fn elapsed_reset_timer_decays_to_idle() {
        let mut e = engine();
        let t0 = Instant::now();
        e.observe(obs("20ar", 0.995, t0, 0)).unwrap();
        e.observe(obs("20ar", 0.996, t0, 2_100)).unwrap();

        let due = t0 + Duration::from_millis(2_100 + 30_000);
        assert!(e.reset_fired(due));
        assert!(e.phase().is_idle());
        assert!(e.settled().is_none());
    }

    #[test]
    fn reset_while_idle_or_pending_is_a_no_op() {
        let mut e = engine();
        let t0 = Instant::now();
        assert!(!e.reset_fired(t0));

        e.observe(obs("20ar", 0.995, t0, 0)).unwrap();
        assert!(!e.reset_fired(t0 + Duration::from_secs(60)));
        assert!(e.phase().is_pending());
    }

    #[test]
    fn new_detection_possible_after_decay() {
        let mut e = engine();
        let t0 = Instant::now();
        e.observe(obs("20ar", 0.995, t0, 0)).unwrap();
        e.observe(obs("20ar", 0.996, t0, 2_100)).unwrap();
        e.reset_fired(t0 + Duration::from_millis(40_000));

        e.observe(obs("50br", 0.995, t0, 41_000)).unwrap();
        let event = e.observe(obs("50br", 0.997, t0, 43_500)).unwrap();
        assert_eq!(event.unwrap().label, "50br");
    }

    // ---- validation ---

    #[test]
    fn confidence_out_of_range_is_rejected_without_state_change() {
        let mut e = engine();
        let t0 = Instant::now();

        let err = e.observe(obs("20ar", 1.5, t0, 0)).unwrap_err();
        assert!(matches!(err, ObservationError::ConfidenceOutOfRange(_)));
        assert!(e.phase().is_idle());

        let err = e.observe(obs("20ar", -0.1, t0, 0)).unwrap_err();
        assert!(matches!(err, ObservationError::ConfidenceOutOfRange(_)));

        let err = e.observe(obs("20ar", f32::NAN, t0, 0)).unwrap_err();
        assert!(matches!(err, ObservationError::ConfidenceOutOfRange(_)));
    }

    #[test]
    fn non_monotonic_timestamp_is_rejected_without_state_change() {
        let mut e = engine();
        let t0 = Instant::now();
        e.observe(obs("20ar", 0.995, t0, 1_000)).unwrap();

        let err = e.observe(obs("20ar", 0.995, t0, 500)).unwrap_err();
        assert_eq!(err, ObservationError::NonMonotonicTimestamp);
        assert!(e.phase().is_pending(), "rejected frame must not mutate state");

        // Equal timestamps are allowed (two frames in the same millisecond).
        assert!(e.observe(obs("20ar", 0.995, t0, 1_000)).is_ok());
    }

    // ---- label-switch policies ---

    #[test]
    fn restart_policy_restarts_dwell_on_label_change() {
        let mut e = Stabilizer::new(RecognitionConfig {
            confidence_threshold: 0.9,
            ..config(LabelSwitchPolicy::Restart)
        });
        let t0 = Instant::now();

        // Labels flicker A, B, A — each switch restarts the window, so
        // nothing settles before dwell of continuous presence.
        e.observe(obs("A", 0.95, t0, 0)).unwrap();
        e.observe(obs("B", 0.95, t0, 1_500)).unwrap();
        let event = e.observe(obs("A", 0.95, t0, 3_000)).unwrap();
        assert!(event.is_none(), "window restarted at each switch");
        assert!(e.phase().is_pending());

        // Continuous "A" for the full dwell finally settles.
        let event = e.observe(obs("A", 0.95, t0, 5_000)).unwrap();
        assert_eq!(event.unwrap().label, "A");
    }

    #[test]
    fn continue_policy_settles_on_latest_label() {
        // Reference behavior: the dwell window never restarts on a label
        // change, and the settling frame's label wins.
        let mut e = Stabilizer::new(RecognitionConfig {
            confidence_threshold: 0.9,
            ..config(LabelSwitchPolicy::Continue)
        });
        let t0 = Instant::now();

        e.observe(obs("A", 0.95, t0, 0)).unwrap();
        e.observe(obs("B", 0.95, t0, 1_000)).unwrap();
        let event = e.observe(obs("B", 0.95, t0, 2_100)).unwrap();
        assert_eq!(event.unwrap().label, "B");
    }

    // ---- the concrete scenario from the design review ---

    #[test]
    fn reference_timeline() {
        let mut e = engine();
        let t0 = Instant::now();

        assert!(e.observe(obs("A", 0.995, t0, 0)).unwrap().is_none());
        assert!(e.phase().is_pending());

        assert!(e.observe(obs("A", 0.995, t0, 500)).unwrap().is_none());
        assert!(e.phase().is_pending());

        let rec = e.observe(obs("A", 0.996, t0, 2_100)).unwrap().unwrap();
        assert_eq!(rec.label, "A");
        assert_eq!(rec.confidence, 0.996);
        assert_eq!(rec.settled_at, t0 + Duration::from_millis(2_100));

        // Low-confidence frame while settled: ignored.
        assert!(e.observe(obs("A", 0.5, t0, 2_200)).unwrap().is_none());
        assert!(e.phase().is_settled());

        // Reset fires 30 s after settling.
        assert!(e.reset_fired(t0 + Duration::from_millis(32_100)));
        assert!(e.phase().is_idle());
    }
}
