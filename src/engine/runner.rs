//! The recognition actor — serializes observations and timer firings.
//!
//! [`Recognizer`] owns the [`Stabilizer`] and the [`FeedbackCoordinator`] and
//! is the *only* caller of either.  Two event sources feed it:
//!
//! ```text
//! classifier frames ──mpsc──▶ ┌────────────┐
//!                             │ Recognizer │──▶ feedback intents
//! reset timer ──────mpsc──▶   │  (1 task)  │──▶ presentation updates
//!                             └────────────┘
//! ```
//!
//! Both channels are merged with `tokio::select!` on a single task, so the
//! unsynchronized state machine never sees two callers at once.  Feedback
//! intents are dispatched after each transition is computed — a briefly
//! blocking audio call can never hold up state mutation.
//!
//! # Reset timer
//!
//! Every settle arms a fresh `tokio::time::sleep` task and aborts the
//! previous one, so there is exactly one live timer per settled detection.
//! An aborted-but-already-fired timer that loses the race is neutralized a
//! second time by the stabilizer's elapsed-time guard.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::RecognitionConfig;
use crate::feedback::{FeedbackCoordinator, PresentationSink};
use crate::vocab::{Vocabulary, IDLE_DISPLAY};

use super::stabilizer::Stabilizer;
use super::Observation;

// ---------------------------------------------------------------------------
// Recognizer
// ---------------------------------------------------------------------------

/// Drives the stabilizer and feedback coordinator on one actor task.
///
/// Create with [`Recognizer::new`], then call [`run`](Self::run) inside a
/// tokio task.  The actor terminates when the observation channel closes.
pub struct Recognizer {
    engine: Stabilizer,
    coordinator: FeedbackCoordinator,
    presentation: Arc<dyn PresentationSink>,
    vocab: Vocabulary,
    reset_interval: Duration,
    reset_task: Option<JoinHandle<()>>,
}

impl Recognizer {
    /// Create a recognizer.
    ///
    /// # Arguments
    ///
    /// * `config`       — thresholds, dwell and reset interval.
    /// * `coordinator`  — issues audio/speech intents on transitions.
    /// * `presentation` — receives result-display updates.
    /// * `vocab`        — maps class codes to spoken denominations.
    pub fn new(
        config: &RecognitionConfig,
        coordinator: FeedbackCoordinator,
        presentation: Arc<dyn PresentationSink>,
        vocab: Vocabulary,
    ) -> Self {
        Self {
            engine: Stabilizer::new(config.clone()),
            coordinator,
            presentation,
            vocab,
            reset_interval: config.reset_interval(),
            reset_task: None,
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run the actor until `obs_rx` is closed.
    ///
    /// This is an `async fn` and should be spawned as a tokio task; it never
    /// returns while the observation channel is open.
    pub async fn run(mut self, mut obs_rx: mpsc::Receiver<Observation>) {
        // The timer channel stays internal: spawned sleep tasks are the only
        // senders, the select loop below the only receiver.
        let (timer_tx, mut timer_rx) = mpsc::channel::<Instant>(4);

        loop {
            tokio::select! {
                maybe_obs = obs_rx.recv() => match maybe_obs {
                    Some(obs) => self.handle_observation(obs, &timer_tx),
                    None => break,
                },
                Some(now) = timer_rx.recv() => self.handle_reset(now),
            }
        }

        if let Some(task) = self.reset_task.take() {
            task.abort();
        }
        log::info!("recognizer: observation channel closed, shutting down");
    }

    // -----------------------------------------------------------------------
    // Event handlers
    // -----------------------------------------------------------------------

    fn handle_observation(&mut self, obs: Observation, timer_tx: &mpsc::Sender<Instant>) {
        match self.engine.observe(obs) {
            Err(e) => {
                // Malformed frames are dropped here; state is untouched.
                log::warn!("recognizer: dropping invalid observation: {e}");
            }

            Ok(Some(rec)) => {
                // Unmapped classes announce the idle value, matching the
                // reference UI.
                let spoken = self
                    .vocab
                    .spoken(&rec.label)
                    .unwrap_or(IDLE_DISPLAY)
                    .to_string();

                self.coordinator.announce(&spoken);
                self.presentation.on_result(&spoken, rec.confidence * 100.0);
                self.arm_reset_timer(rec.settled_at, timer_tx);
            }

            Ok(None) => {
                if self.engine.phase().is_pending() {
                    self.coordinator.ensure_scanning();
                }
            }
        }
    }

    fn handle_reset(&mut self, now: Instant) {
        if self.engine.reset_fired(now) {
            // Pure decay: no feedback, just the idle display.
            self.presentation.on_result(IDLE_DISPLAY, 0.0);
        }
    }

    /// Arm the reset timer for the settle that just happened, cancelling any
    /// previously pending one.
    ///
    /// The interval counts from `settled_at` — the confirming frame's
    /// timestamp — not from arming time, so a backlog of queued frames does
    /// not extend how long the result stays visible.
    fn arm_reset_timer(&mut self, settled_at: Instant, timer_tx: &mpsc::Sender<Instant>) {
        if let Some(prev) = self.reset_task.take() {
            prev.abort();
        }

        let tx = timer_tx.clone();
        let delay = self
            .reset_interval
            .saturating_sub(Instant::now().duration_since(settled_at));
        self.reset_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Instant::now()).await;
        }));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
