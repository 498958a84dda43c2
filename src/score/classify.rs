//! Segment classification and positional error-code assignment.
//!
//! Each timeline slice first gets a basic TP/TN/FP/FN score from its overlap
//! with the truth and detected sets, then every FP/FN slice is assigned one
//! of eight sub-error codes from the Ward et al. (2011) taxonomy based on
//! its position in the sequence and the scores of its neighbors.
//!
//! The taxonomy is implemented as an explicit lookup procedure keyed on
//! `(position, score, prev, next)` so the full rule set can be tested row by
//! row. Combinations the taxonomy leaves undefined produce a diagnostic
//! string instead of aborting the run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::{overlap, Interval};
use crate::score::timeline::{Segment, SegmentScore};

/// Sub-error code for FP/FN segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// A true event entirely missed by the recognizer.
    #[serde(rename = "D")]
    Deletion,
    /// A spurious detection with no corresponding truth.
    #[serde(rename = "I")]
    Insertion,
    /// A gap splitting one true event into multiple detections.
    #[serde(rename = "F")]
    Fragmented,
    /// A bridge joining multiple true events into one detection.
    #[serde(rename = "M")]
    Merged,
    /// Detection starts late relative to its true event.
    #[serde(rename = "Us")]
    UnderflowStart,
    /// Detection ends early relative to its true event.
    #[serde(rename = "Ue")]
    UnderflowEnd,
    /// Detection starts early, spilling before its true event.
    #[serde(rename = "Os")]
    OverflowStart,
    /// Detection ends late, spilling past its true event.
    #[serde(rename = "Oe")]
    OverflowEnd,
}

impl ErrorCode {
    /// Short wire label ("D", "I", "F", "M", "Us", "Ue", "Os", "Oe").
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Deletion => "D",
            ErrorCode::Insertion => "I",
            ErrorCode::Fragmented => "F",
            ErrorCode::Merged => "M",
            ErrorCode::UnderflowStart => "Us",
            ErrorCode::UnderflowEnd => "Ue",
            ErrorCode::OverflowStart => "Os",
            ErrorCode::OverflowEnd => "Oe",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a segment sits in the ordered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// First segment (index 0; takes precedence over `End` for a singleton).
    Start,
    /// Interior segment with neighbors on both sides.
    Middle,
    /// Last segment.
    End,
}

/// Look up the error code for one `(position, score, prev, next)` row.
///
/// Returns `None` both for TP/TN segments (which carry no error code) and
/// for FP/FN rows the taxonomy does not cover.
#[must_use]
pub fn error_code(
    position: Position,
    score: SegmentScore,
    prev: Option<SegmentScore>,
    next: Option<SegmentScore>,
) -> Option<ErrorCode> {
    use ErrorCode::*;
    use SegmentScore::*;

    match (position, score) {
        (Position::Start, FalsePositive) => match next {
            None | Some(TrueNegative) | Some(FalseNegative) => Some(Insertion),
            Some(TruePositive) => Some(OverflowStart),
            _ => None,
        },
        (Position::Start, FalseNegative) => match next {
            None | Some(TrueNegative) | Some(FalsePositive) => Some(Deletion),
            Some(TruePositive) => Some(UnderflowStart),
            _ => None,
        },
        (Position::End, FalsePositive) => match prev {
            None | Some(TrueNegative) | Some(FalseNegative) => Some(Insertion),
            Some(TruePositive) => Some(OverflowEnd),
            _ => None,
        },
        (Position::End, FalseNegative) => match prev {
            None | Some(TrueNegative) | Some(FalsePositive) => Some(Deletion),
            Some(TruePositive) => Some(UnderflowEnd),
            _ => None,
        },
        (Position::Middle, FalsePositive) => match (prev, next) {
            (Some(TruePositive), Some(TruePositive)) => Some(Merged),
            (Some(TrueNegative) | Some(FalseNegative), Some(TruePositive)) => Some(OverflowStart),
            (
                Some(TrueNegative) | Some(FalseNegative),
                Some(TrueNegative) | Some(FalseNegative),
            ) => Some(Insertion),
            (Some(TruePositive), Some(TrueNegative) | Some(FalseNegative)) => Some(OverflowEnd),
            _ => None,
        },
        (Position::Middle, FalseNegative) => match (prev, next) {
            (Some(TruePositive), Some(TruePositive)) => Some(Fragmented),
            (Some(TrueNegative) | Some(FalsePositive), Some(TruePositive)) => Some(UnderflowStart),
            (
                Some(TrueNegative) | Some(FalsePositive),
                Some(TrueNegative) | Some(FalsePositive),
            ) => Some(Deletion),
            (Some(TruePositive), Some(TrueNegative) | Some(FalsePositive)) => Some(UnderflowEnd),
            _ => None,
        },
        // TP/TN never carry an error code.
        _ => None,
    }
}

/// Classify timeline slices and assign error codes.
///
/// For each `(t1, t2)` pair the basic score is derived from overlap with the
/// truth and detected sets, and the label of the last overlapping truth is
/// attached. A second pass walks the ordered sequence and assigns error
/// codes via [`error_code`]; rows the taxonomy does not cover are reported
/// as diagnostic strings and leave `err` unset.
#[must_use]
pub fn score_segments(
    bounds: &[(DateTime<Utc>, DateTime<Utc>)],
    truths: &[Interval],
    detected: &[Interval],
) -> (Vec<Segment>, Vec<String>) {
    let mut segs: Vec<Segment> = bounds
        .iter()
        .map(|&(t1, t2)| {
            let span = (t1, t2);
            let mut label = None;
            let mut truth_match = false;
            for truth in truths {
                if overlap(&span, truth) {
                    truth_match = true;
                    label = Some(truth.label.clone());
                }
            }
            let detected_match = detected.iter().any(|d| overlap(&span, d));

            let score = match (truth_match, detected_match) {
                (true, true) => SegmentScore::TruePositive,
                (true, false) => SegmentScore::FalseNegative,
                (false, true) => SegmentScore::FalsePositive,
                (false, false) => SegmentScore::TrueNegative,
            };

            Segment {
                t1,
                t2,
                score,
                err: None,
                label,
            }
        })
        .collect();

    let mut diagnostics = Vec::new();
    if segs.is_empty() {
        return (segs, diagnostics);
    }

    let last = segs.len() - 1;
    for i in 0..segs.len() {
        let score = segs[i].score;
        if matches!(
            score,
            SegmentScore::TruePositive | SegmentScore::TrueNegative
        ) {
            continue;
        }

        let prev = if i > 0 { Some(segs[i - 1].score) } else { None };
        let next = if i < last { Some(segs[i + 1].score) } else { None };
        let position = if i == 0 {
            Position::Start
        } else if i == last {
            Position::End
        } else {
            Position::Middle
        };

        match error_code(position, score, prev, next) {
            Some(code) => segs[i].err = Some(code),
            None => diagnostics.push(format!(
                "unhandled error case: position={:?} score={} prev={} next={}",
                position,
                score,
                prev.map_or("None", |s| s.as_str()),
                next.map_or("None", |s| s.as_str()),
            )),
        }
    }

    (segs, diagnostics)
}
