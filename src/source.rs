//! Classification-source collaborator contract and the trace-replay source.
//!
//! The camera/classifier glue is out of scope for this crate; anything that
//! can hand over a lazy, non-restartable stream of [`Observation`]s can drive
//! the engine.  [`ObservationSource`] is that seam.
//!
//! Source failures never travel through the engine: the source's caller sees
//! the error, the engine simply stops receiving observations, and the reset
//! timer bounds how long a stale result stays on screen if the source dies
//! silently.
//!
//! [`TraceSource`] replays a recorded classifier trace — one JSON record per
//! line — in real time, and is what the `cashlens` binary feeds from stdin:
//!
//! ```text
//! {"label":"20ar","confidence":0.995,"t_ms":0}
//! {"label":"20ar","confidence":0.995,"t_ms":500}
//! {"label":"20ar","confidence":0.996,"t_ms":2100}
//! ```

use std::io::BufRead;
use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;

use crate::engine::Observation;

// ---------------------------------------------------------------------------
// SourceError
// ---------------------------------------------------------------------------

/// Failures of the classification collaborator.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The classifier (or its transport) stopped working.
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    /// One record could not be parsed; the stream itself may still be alive.
    #[error("malformed classifier record: {0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// ObservationSource
// ---------------------------------------------------------------------------

/// A lazy, infinite-until-it-isn't stream of classifier outputs.
///
/// `Ok(None)` means the stream ended cleanly; sources are not restartable.
pub trait ObservationSource: Send {
    /// Produce the next observation, blocking as needed.
    fn next_observation(&mut self) -> Result<Option<Observation>, SourceError>;
}

const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn ObservationSource>) {}
};

// ---------------------------------------------------------------------------
// TraceSource
// ---------------------------------------------------------------------------

/// One line of a recorded classifier trace.
#[derive(Debug, Deserialize)]
struct TraceRecord {
    label: String,
    confidence: f32,
    /// Frame time in milliseconds from the start of the trace.
    t_ms: u64,
}

/// Replays a JSONL classifier trace in real time.
///
/// Each record is held back until its `t_ms` offset from the replay epoch has
/// elapsed, so dwell windows and the reset timer behave as they would against
/// a live camera.  Blank lines are skipped.
pub struct TraceSource<R: BufRead> {
    reader: R,
    epoch: Instant,
}

impl<R: BufRead> TraceSource<R> {
    /// Wrap a line-oriented reader; `epoch` anchors the trace's `t_ms = 0`.
    pub fn new(reader: R, epoch: Instant) -> Self {
        Self { reader, epoch }
    }
}

impl<R: BufRead + Send> ObservationSource for TraceSource<R> {
    fn next_observation(&mut self) -> Result<Option<Observation>, SourceError> {
        loop {
            let mut line = String::new();
            let n = self
                .reader
                .read_line(&mut line)
                .map_err(|e| SourceError::Unavailable(e.to_string()))?;
            if n == 0 {
                return Ok(None); // EOF
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let record: TraceRecord =
                serde_json::from_str(line).map_err(|e| SourceError::Malformed(e.to_string()))?;

            let timestamp = self.epoch + Duration::from_millis(record.t_ms);
            if let Some(wait) = timestamp.checked_duration_since(Instant::now()) {
                std::thread::sleep(wait);
            }

            return Ok(Some(Observation::new(
                record.label,
                record.confidence,
                timestamp,
            )));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn replay(input: &str) -> TraceSource<Cursor<Vec<u8>>> {
        TraceSource::new(Cursor::new(input.as_bytes().to_vec()), Instant::now())
    }

    #[test]
    fn parses_records_in_order() {
        let mut source = replay(concat!(
            "{\"label\":\"20ar\",\"confidence\":0.995,\"t_ms\":0}\n",
            "\n",
            "{\"label\":\"50br\",\"confidence\":0.5,\"t_ms\":5}\n",
        ));

        let first = source.next_observation().unwrap().unwrap();
        assert_eq!(first.label, "20ar");
        assert_eq!(first.confidence, 0.995);

        let second = source.next_observation().unwrap().unwrap();
        assert_eq!(second.label, "50br");
        assert!(second.timestamp > first.timestamp);

        assert!(source.next_observation().unwrap().is_none());
    }

    #[test]
    fn malformed_line_is_an_error_but_stream_continues() {
        let mut source = replay(concat!(
            "this is not json\n",
            "{\"label\":\"20ar\",\"confidence\":0.995,\"t_ms\":0}\n",
        ));

        let err = source.next_observation().unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));

        // The next call reads the next line as normal.
        let obs = source.next_observation().unwrap().unwrap();
        assert_eq!(obs.label, "20ar");
    }

    #[test]
    fn timestamps_follow_trace_offsets() {
        let epoch = Instant::now();
        let mut source = TraceSource::new(
            Cursor::new(b"{\"label\":\"20ar\",\"confidence\":0.99,\"t_ms\":20}\n".to_vec()),
            epoch,
        );

        let obs = source.next_observation().unwrap().unwrap();
        assert_eq!(obs.timestamp, epoch + Duration::from_millis(20));
        // Replay is paced: the record is not released before its offset.
        assert!(Instant::now() >= obs.timestamp);
    }
}
