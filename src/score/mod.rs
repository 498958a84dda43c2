//! The scoring engine.
//!
//! Evaluates detected events against labeled ground truth using the error
//! taxonomy of Ward et al. (2011) for segmented time-series classification.
//!
//! A scoring run proceeds in stages:
//!
//! 1. [`timeline::extract_segments`] carves the global range into contiguous
//!    segments at every truth/detected boundary.
//! 2. [`classify::score_segments`] assigns each segment TP/TN/FP/FN and one
//!    of eight positional error codes (D, I, F, M, Us, Ue, Os, Oe).
//! 3. [`frames::score_frames`] turns segment durations into time-weighted
//!    rates and overall accuracy.
//! 4. [`events::score_events`] projects segment codes back onto whole
//!    events in three passes.
//! 5. [`aggregate::aggregate`] combines any number of runs into summed
//!    counts with rates recomputed from the sums.
//!
//! The engine is a pure computation over in-memory intervals: it performs no
//! I/O, spawns no concurrency, and reports unhandled classification cases as
//! in-band diagnostics rather than log output.
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use segeval::{score_run, Interval, ScoreOptions};
//!
//! let ts = |s| Utc.timestamp_opt(s, 0).unwrap();
//! let truths = vec![Interval::new(ts(0), ts(10), "WALKING")];
//! let detected = vec![Interval::new(ts(0), ts(10), "WALKING")];
//!
//! let result = score_run(&truths, &detected, (ts(0), ts(10)), &ScoreOptions::default()).unwrap();
//! assert_eq!(result.frame_score.acc, Some(1.0));
//! ```

pub mod aggregate;
pub mod classify;
pub mod events;
pub mod frames;
pub mod timeline;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::Interval;
use crate::{Error, Result};

pub use aggregate::{aggregate, AggregateResult, AggregateScores, EventScoreSummary, RunStats};
pub use classify::{error_code, score_segments, ErrorCode, Position};
pub use events::{
    score_events, DetectedCounts, DetectedRates, EventCode, EventScoreReport, ScoredEvent,
    TruthCounts, TruthRates,
};
pub use frames::{score_frames, FrameCounts, FrameScore};
pub use timeline::{extract_segments, Segment, SegmentScore};

/// Options controlling a scoring run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreOptions {
    /// Drop the zero-duration segments produced by coincident interval
    /// boundaries before classification.
    ///
    /// Off by default: zero-duration segments carry no frame time but do
    /// participate in neighbor lookups, and the historical scoring behavior
    /// keeps them.
    pub collapse_zero_segments: bool,
}

/// One run's full scoring output; immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Ordered, classified segments tiling the global range.
    pub segments: Vec<Segment>,
    /// Duration-weighted frame summary.
    pub frame_score: FrameScore,
    /// Event-level summary.
    pub events: EventScoreReport,
    /// Warnings from classification rows the taxonomy does not cover.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub diagnostics: Vec<String>,
}

/// Score one run: detected events against labeled ground truth over a
/// global time range.
///
/// Validates every interval (`t1 <= t2`) and the range before scoring;
/// malformed input is fatal for the run. Division-by-zero conditions inside
/// the scorers are reported as absent rates, never as errors.
pub fn score_run(
    truths: &[Interval],
    detected: &[Interval],
    range: (DateTime<Utc>, DateTime<Utc>),
    options: &ScoreOptions,
) -> Result<ScoreResult> {
    for interval in truths.iter().chain(detected.iter()) {
        interval.validate()?;
    }
    if range.0 > range.1 {
        return Err(Error::invalid_input(format!(
            "global range ends before it starts ({} > {})",
            range.0, range.1
        )));
    }

    let mut bounds = timeline::extract_segments(truths, detected, range);
    if options.collapse_zero_segments {
        bounds.retain(|(t1, t2)| t1 != t2);
    }

    let (segments, diagnostics) = classify::score_segments(&bounds, truths, detected);
    let frame_score = frames::score_frames(&segments);
    let events = events::score_events(truths, detected, &segments);

    Ok(ScoreResult {
        segments,
        frame_score,
        events,
        diagnostics,
    })
}
