//! # segeval
//!
//! Frame- and event-level scoring for continuous context recognition.
//!
//! - **Scoring**: the error taxonomy of Ward et al. (2011) for segmented
//!   time-series classification — TP/TN/FP/FN segments, eight positional
//!   error codes, duration-weighted frame rates, per-event outcomes
//! - **Aggregation**: combine runs across ground-truth files and
//!   recognizers with counts summed and rates recomputed
//! - **Harness**: drive any [`Recognizer`] over labeled ground-truth cases
//!   and raw data files
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use segeval::{score_run, Interval, ScoreOptions};
//!
//! let ts = |s| Utc.timestamp_opt(s, 0).unwrap();
//!
//! // One true walking event, detected with a late start.
//! let truths = vec![Interval::new(ts(0), ts(60), "WALKING")];
//! let detected = vec![Interval::new(ts(10), ts(60), "WALKING")];
//!
//! let result = score_run(&truths, &detected, (ts(0), ts(60)), &ScoreOptions::default())?;
//! assert!(result.frame_score.acc.unwrap() > 0.8);
//! # Ok::<(), segeval::Error>(())
//! ```
//!
//! ## Taxonomy
//!
//! | Code | Meaning |
//! |------|---------|
//! | `D`  | Deletion: true event entirely missed |
//! | `I`  | Insertion: spurious detection |
//! | `F`  | Fragmentation: one true event returned in pieces |
//! | `M`  | Merge: several true events returned as one |
//! | `Us`/`Ue` | Underflow: detection starts late / ends early |
//! | `Os`/`Oe` | Overflow: detection starts early / ends late |
//!
//! ## Design
//!
//! - **Pure core**: the scoring engine does no I/O, spawns no threads, and
//!   reports unhandled classification rows as in-band diagnostics
//! - **Trait-based recognizers**: implementations plug in through the
//!   four-operation [`Recognizer`] contract and a name registry
//! - **Soft failures**: rate denominators of zero yield absent/null rates,
//!   never errors; only malformed input is fatal

#![warn(missing_docs)]

mod error;
pub mod harness;
pub mod interval;
pub mod loader;
pub mod recognizer;
pub mod report;
pub mod score;

pub use error::{Error, Result};
pub use harness::{Harness, Report, RunResult};
pub use interval::{overlap, Interval, TimeSpan};
pub use loader::GroundTruth;
pub use recognizer::{FixedRecognizer, Recognizer, RecognizerRegistry, ReplayRecognizer};
pub use score::{
    aggregate, score_run, AggregateResult, ErrorCode, EventCode, EventScoreReport, FrameScore,
    ScoreOptions, ScoreResult, Segment, SegmentScore,
};
