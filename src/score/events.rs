//! Event-level scoring: projecting segment error codes back onto whole
//! truth and detected events.
//!
//! Works on the original intervals, not segments, in three ordered passes:
//!
//! 1. **Trivial pass** — every event takes the code implied by the segments
//!    it overlaps (D, F, I, M), with later segments overwriting earlier
//!    ones.
//! 2. **Cross pass** — overlapping (detected, truth) pairs upgrade each
//!    other: a merging return marks its truths merged (or
//!    fragmented-and-merged), a fragmented truth marks its returns
//!    fragmenting.
//! 3. **Default pass** — anything still unannotated is correct.
//!
//! Input intervals are never mutated; the scorer returns annotated copies
//! scoped to the call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::{overlap, Interval, TimeSpan};
use crate::score::classify::ErrorCode;
use crate::score::timeline::Segment;

/// Per-event categorical outcome.
///
/// The first five variants annotate truth events, the last four annotate
/// detected (returned) events; `Correct` is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCode {
    /// Event scored with no taxonomy error.
    #[serde(rename = "C")]
    Correct,
    /// True event entirely missed.
    #[serde(rename = "D")]
    Deletion,
    /// True event returned in pieces.
    #[serde(rename = "F")]
    Fragmented,
    /// True event both fragmented and merged with another.
    #[serde(rename = "FM")]
    FragmentedAndMerged,
    /// True event absorbed into a merged return.
    #[serde(rename = "M")]
    Merged,
    /// Spurious return with no truth.
    #[serde(rename = "I'")]
    InsertionReturn,
    /// Return spanning multiple true events.
    #[serde(rename = "M'")]
    MergingReturn,
    /// Return covering a fragment of a true event.
    #[serde(rename = "F'")]
    FragmentingReturn,
    /// Return that both fragments and merges true events.
    #[serde(rename = "FM'")]
    FragmentingAndMerging,
}

impl EventCode {
    /// Short wire label ("C", "D", "F", "FM", "M", "I'", "M'", "F'", "FM'").
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCode::Correct => "C",
            EventCode::Deletion => "D",
            EventCode::Fragmented => "F",
            EventCode::FragmentedAndMerged => "FM",
            EventCode::Merged => "M",
            EventCode::InsertionReturn => "I'",
            EventCode::MergingReturn => "M'",
            EventCode::FragmentingReturn => "F'",
            EventCode::FragmentingAndMerging => "FM'",
        }
    }
}

impl std::fmt::Display for EventCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An input interval annotated with its event-level outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEvent {
    /// Start of the event.
    pub t1: DateTime<Utc>,
    /// End of the event.
    pub t2: DateTime<Utc>,
    /// Label class.
    pub label: String,
    /// Event-level outcome.
    pub event_score: EventCode,
}

impl TimeSpan for ScoredEvent {
    fn t1(&self) -> DateTime<Utc> {
        self.t1
    }
    fn t2(&self) -> DateTime<Utc> {
        self.t2
    }
}

/// Truth-event counts, keyed by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruthCounts {
    /// Correct truth events.
    #[serde(rename = "C")]
    pub correct: usize,
    /// Deleted truth events.
    #[serde(rename = "D")]
    pub deletion: usize,
    /// Fragmented truth events.
    #[serde(rename = "F")]
    pub fragmented: usize,
    /// Fragmented-and-merged truth events.
    #[serde(rename = "FM")]
    pub fragmented_and_merged: usize,
    /// Merged truth events.
    #[serde(rename = "M")]
    pub merged: usize,
}

impl TruthCounts {
    /// Total truth events counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.correct + self.deletion + self.fragmented + self.fragmented_and_merged + self.merged
    }

    /// Per-outcome rates; all `None` when no events were counted.
    #[must_use]
    pub fn rates(&self) -> TruthRates {
        let n = self.total();
        let rate = |count: usize| {
            if n == 0 {
                None
            } else {
                Some(count as f64 / n as f64)
            }
        };
        TruthRates {
            correct: rate(self.correct),
            deletion: rate(self.deletion),
            fragmented: rate(self.fragmented),
            fragmented_and_merged: rate(self.fragmented_and_merged),
            merged: rate(self.merged),
        }
    }

    /// Elementwise sum with another set of counts.
    #[must_use]
    pub fn merge(&self, other: &TruthCounts) -> TruthCounts {
        TruthCounts {
            correct: self.correct + other.correct,
            deletion: self.deletion + other.deletion,
            fragmented: self.fragmented + other.fragmented,
            fragmented_and_merged: self.fragmented_and_merged + other.fragmented_and_merged,
            merged: self.merged + other.merged,
        }
    }
}

/// Truth-event rates; `null` on the wire when the total is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TruthRates {
    /// Correct rate.
    #[serde(rename = "C")]
    pub correct: Option<f64>,
    /// Deletion rate.
    #[serde(rename = "D")]
    pub deletion: Option<f64>,
    /// Fragmentation rate.
    #[serde(rename = "F")]
    pub fragmented: Option<f64>,
    /// Fragmented-and-merged rate.
    #[serde(rename = "FM")]
    pub fragmented_and_merged: Option<f64>,
    /// Merge rate.
    #[serde(rename = "M")]
    pub merged: Option<f64>,
}

/// Detected-event counts, keyed by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedCounts {
    /// Correct returns.
    #[serde(rename = "C")]
    pub correct: usize,
    /// Fragmenting returns.
    #[serde(rename = "F'")]
    pub fragmenting: usize,
    /// Merging returns.
    #[serde(rename = "M'")]
    pub merging: usize,
    /// Fragmenting-and-merging returns.
    #[serde(rename = "FM'")]
    pub fragmenting_and_merging: usize,
    /// Insertion returns.
    #[serde(rename = "I'")]
    pub insertion: usize,
}

impl DetectedCounts {
    /// Total detected events counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.correct + self.fragmenting + self.merging + self.fragmenting_and_merging + self.insertion
    }

    /// Per-outcome rates; all `None` when no events were counted.
    #[must_use]
    pub fn rates(&self) -> DetectedRates {
        let n = self.total();
        let rate = |count: usize| {
            if n == 0 {
                None
            } else {
                Some(count as f64 / n as f64)
            }
        };
        DetectedRates {
            correct: rate(self.correct),
            fragmenting: rate(self.fragmenting),
            merging: rate(self.merging),
            fragmenting_and_merging: rate(self.fragmenting_and_merging),
            insertion: rate(self.insertion),
        }
    }

    /// Elementwise sum with another set of counts.
    #[must_use]
    pub fn merge(&self, other: &DetectedCounts) -> DetectedCounts {
        DetectedCounts {
            correct: self.correct + other.correct,
            fragmenting: self.fragmenting + other.fragmenting,
            merging: self.merging + other.merging,
            fragmenting_and_merging: self.fragmenting_and_merging + other.fragmenting_and_merging,
            insertion: self.insertion + other.insertion,
        }
    }
}

/// Detected-event rates; `null` on the wire when the total is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedRates {
    /// Correct rate.
    #[serde(rename = "C")]
    pub correct: Option<f64>,
    /// Fragmenting rate.
    #[serde(rename = "F'")]
    pub fragmenting: Option<f64>,
    /// Merging rate.
    #[serde(rename = "M'")]
    pub merging: Option<f64>,
    /// Fragmenting-and-merging rate.
    #[serde(rename = "FM'")]
    pub fragmenting_and_merging: Option<f64>,
    /// Insertion rate.
    #[serde(rename = "I'")]
    pub insertion: Option<f64>,
}

/// Event-level scoring output for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventScoreReport {
    /// Annotated truth events.
    pub truths: Vec<ScoredEvent>,
    /// Annotated detected events.
    pub detected: Vec<ScoredEvent>,
    /// Detected-event counts.
    pub d_counts: DetectedCounts,
    /// Truth-event counts.
    pub t_counts: TruthCounts,
    /// Detected-event rates.
    pub d_rates: DetectedRates,
    /// Truth-event rates.
    pub t_rates: TruthRates,
}

/// Score whole truth and detected events from classified segments.
///
/// Pass 1 annotates events from overlapping segment error codes; when an
/// event overlaps several coded segments the last one in timeline order
/// wins. Pass 2 resolves merge/fragmentation interplay across overlapping
/// (detected, truth) pairs, re-reading annotations as it rewrites them.
/// Pass 3 defaults everything still unscored to correct.
#[must_use]
pub fn score_events(
    truths: &[Interval],
    detected: &[Interval],
    segments: &[Segment],
) -> EventScoreReport {
    let mut truth_codes: Vec<Option<EventCode>> = vec![None; truths.len()];
    let mut det_codes: Vec<Option<EventCode>> = vec![None; detected.len()];

    // Pass 1: trivial assignments from segment error codes.
    let trivial = |event: &Interval, codes: &mut Option<EventCode>| {
        for seg in segments {
            if !overlap(event, seg) {
                continue;
            }
            match seg.err {
                Some(ErrorCode::Deletion) => *codes = Some(EventCode::Deletion),
                Some(ErrorCode::Fragmented) => *codes = Some(EventCode::Fragmented),
                Some(ErrorCode::Insertion) => *codes = Some(EventCode::InsertionReturn),
                Some(ErrorCode::Merged) => *codes = Some(EventCode::MergingReturn),
                _ => {}
            }
        }
    };
    for (event, code) in truths.iter().zip(truth_codes.iter_mut()) {
        trivial(event, code);
    }
    for (event, code) in detected.iter().zip(det_codes.iter_mut()) {
        trivial(event, code);
    }

    // Pass 2: overlaps between scored events. Order matters: the truth side
    // is rewritten before the detected side re-reads it.
    for (di, d) in detected.iter().enumerate() {
        for (ti, t) in truths.iter().enumerate() {
            if !overlap(d, t) {
                continue;
            }
            if det_codes[di] == Some(EventCode::MergingReturn) {
                truth_codes[ti] = if truth_codes[ti] == Some(EventCode::Fragmented) {
                    Some(EventCode::FragmentedAndMerged)
                } else {
                    Some(EventCode::Merged)
                };
            }
            if truth_codes[ti] == Some(EventCode::Fragmented) {
                det_codes[di] = if det_codes[di] == Some(EventCode::MergingReturn) {
                    Some(EventCode::FragmentingAndMerging)
                } else {
                    Some(EventCode::FragmentingReturn)
                };
            }
        }
    }

    // Pass 3: anything still unscored is correct.
    let annotate = |events: &[Interval], codes: Vec<Option<EventCode>>| -> Vec<ScoredEvent> {
        events
            .iter()
            .zip(codes)
            .map(|(e, code)| ScoredEvent {
                t1: e.t1,
                t2: e.t2,
                label: e.label.clone(),
                event_score: code.unwrap_or(EventCode::Correct),
            })
            .collect()
    };
    let truths = annotate(truths, truth_codes);
    let detected = annotate(detected, det_codes);

    let mut t_counts = TruthCounts::default();
    for t in &truths {
        match t.event_score {
            EventCode::Correct => t_counts.correct += 1,
            EventCode::Deletion => t_counts.deletion += 1,
            EventCode::Fragmented => t_counts.fragmented += 1,
            EventCode::FragmentedAndMerged => t_counts.fragmented_and_merged += 1,
            EventCode::Merged => t_counts.merged += 1,
            // Return-side codes are never assigned to truth events.
            _ => {}
        }
    }
    let mut d_counts = DetectedCounts::default();
    for d in &detected {
        match d.event_score {
            EventCode::Correct => d_counts.correct += 1,
            EventCode::FragmentingReturn => d_counts.fragmenting += 1,
            EventCode::MergingReturn => d_counts.merging += 1,
            EventCode::FragmentingAndMerging => d_counts.fragmenting_and_merging += 1,
            EventCode::InsertionReturn => d_counts.insertion += 1,
            // Truth-side codes are never assigned to detected events.
            _ => {}
        }
    }

    EventScoreReport {
        d_rates: d_counts.rates(),
        t_rates: t_counts.rates(),
        truths,
        detected,
        d_counts,
        t_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::classify::score_segments;
    use crate::score::timeline::extract_segments;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn iv(t1: i64, t2: i64) -> Interval {
        Interval::new(ts(t1), ts(t2), "A")
    }

    fn score(
        truths: &[Interval],
        detected: &[Interval],
        range: (i64, i64),
    ) -> EventScoreReport {
        let bounds = extract_segments(truths, detected, (ts(range.0), ts(range.1)));
        let (segs, _) = score_segments(&bounds, truths, detected);
        score_events(truths, detected, &segs)
    }

    #[test]
    fn test_exact_match_is_correct_on_both_sides() {
        let report = score(&[iv(10, 20)], &[iv(10, 20)], (0, 30));
        assert_eq!(report.truths[0].event_score, EventCode::Correct);
        assert_eq!(report.detected[0].event_score, EventCode::Correct);
        assert_eq!(report.t_counts.correct, 1);
        assert_eq!(report.d_counts.correct, 1);
        assert_eq!(report.t_rates.correct, Some(1.0));
    }

    #[test]
    fn test_missed_truth_is_deleted_event() {
        let report = score(&[iv(10, 20)], &[], (0, 30));
        assert_eq!(report.truths[0].event_score, EventCode::Deletion);
        assert_eq!(report.t_counts.deletion, 1);
        assert_eq!(report.t_rates.deletion, Some(1.0));
    }

    #[test]
    fn test_spurious_detection_is_insertion_return() {
        let report = score(&[], &[iv(10, 20)], (0, 30));
        assert_eq!(report.detected[0].event_score, EventCode::InsertionReturn);
        assert_eq!(report.d_counts.insertion, 1);
        // No truth events at all: truth rates are null.
        assert_eq!(report.t_rates.correct, None);
        assert_eq!(report.t_counts.total(), 0);
    }

    #[test]
    fn test_fragmented_truth_marks_fragmenting_returns() {
        // One truth returned as two pieces.
        let report = score(&[iv(0, 30)], &[iv(0, 10), iv(20, 30)], (0, 30));
        assert_eq!(report.truths[0].event_score, EventCode::Fragmented);
        for d in &report.detected {
            assert_eq!(d.event_score, EventCode::FragmentingReturn);
        }
        assert_eq!(report.t_counts.fragmented, 1);
        assert_eq!(report.d_counts.fragmenting, 2);
    }

    #[test]
    fn test_merging_return_marks_merged_truths() {
        // Two truths returned as one bridging span.
        let report = score(&[iv(0, 10), iv(20, 30)], &[iv(0, 30)], (0, 30));
        assert_eq!(report.detected[0].event_score, EventCode::MergingReturn);
        for t in &report.truths {
            assert_eq!(t.event_score, EventCode::Merged);
        }
        assert_eq!(report.t_counts.merged, 2);
        assert_eq!(report.d_counts.merging, 1);
        assert_eq!(report.t_rates.merged, Some(1.0));
    }

    #[test]
    fn test_no_events_yields_null_rates() {
        let report = score(&[], &[], (0, 30));
        assert_eq!(report.t_rates, TruthRates::default());
        assert_eq!(report.d_rates, DetectedRates::default());
    }

    #[test]
    fn test_event_codes_wire_labels() {
        let codes = [
            (EventCode::Correct, "\"C\""),
            (EventCode::Deletion, "\"D\""),
            (EventCode::Fragmented, "\"F\""),
            (EventCode::FragmentedAndMerged, "\"FM\""),
            (EventCode::Merged, "\"M\""),
            (EventCode::InsertionReturn, "\"I'\""),
            (EventCode::MergingReturn, "\"M'\""),
            (EventCode::FragmentingReturn, "\"F'\""),
            (EventCode::FragmentingAndMerging, "\"FM'\""),
        ];
        for (code, want) in codes {
            assert_eq!(serde_json::to_string(&code).unwrap(), want);
        }
    }

    #[test]
    fn test_null_rates_serialize_as_null() {
        let json = serde_json::to_value(TruthRates::default()).unwrap();
        assert!(json["C"].is_null());
        assert!(json["FM"].is_null());
    }
}
