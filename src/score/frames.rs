//! Frame-level scoring: duration-weighted rates over the whole timeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::score::classify::ErrorCode;
use crate::score::timeline::{Segment, SegmentScore};

/// Seconds of timeline attributed to each score and error bucket.
///
/// `P` and `N` are derived totals: positive-labeled frame time
/// (`D + F + Us + Ue + TP`) and negative-labeled frame time
/// (`I + M + Os + Oe + TN`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameCounts {
    /// Deletion seconds.
    #[serde(rename = "D")]
    pub deletion: f64,
    /// Insertion seconds.
    #[serde(rename = "I")]
    pub insertion: f64,
    /// Fragmentation seconds.
    #[serde(rename = "F")]
    pub fragmented: f64,
    /// Merge seconds.
    #[serde(rename = "M")]
    pub merged: f64,
    /// Start-underflow seconds.
    #[serde(rename = "Us")]
    pub underflow_start: f64,
    /// End-underflow seconds.
    #[serde(rename = "Ue")]
    pub underflow_end: f64,
    /// Start-overflow seconds.
    #[serde(rename = "Os")]
    pub overflow_start: f64,
    /// End-overflow seconds.
    #[serde(rename = "Oe")]
    pub overflow_end: f64,
    /// True-positive seconds.
    #[serde(rename = "TP")]
    pub true_positive: f64,
    /// True-negative seconds.
    #[serde(rename = "TN")]
    pub true_negative: f64,
    /// Positive-labeled frame time.
    #[serde(rename = "P")]
    pub positive: f64,
    /// Negative-labeled frame time.
    #[serde(rename = "N")]
    pub negative: f64,
}

/// Duration-weighted summary over all segments of one or more runs.
///
/// Rate maps are keyed `Dr`, `Fr`, `Usr`, `Uer`, `TPr` (positive set) and
/// `Ir`, `Mr`, `Osr`, `Oer`, `TNr` (negative set); a map is left empty when
/// its denominator is zero, and `acc`/`p_rate`/`n_rate` are absent when the
/// timeline has no scored time at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameScore {
    /// Per-bucket seconds.
    pub frame_counts: FrameCounts,
    /// Positive-set rates over `P`.
    pub p_rates: BTreeMap<String, f64>,
    /// Negative-set rates over `N`.
    pub n_rates: BTreeMap<String, f64>,
    /// Overall accuracy `(TP + TN) / (P + N)`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub acc: Option<f64>,
    /// Share of positive-labeled time, `P / (P + N)`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub p_rate: Option<f64>,
    /// Share of negative-labeled time, `N / (P + N)`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub n_rate: Option<f64>,
}

/// Accumulate segment durations into buckets and compute frame rates.
///
/// FP/FN segments contribute to the bucket of their error code (segments
/// left without a code by an uncovered taxonomy row contribute nothing);
/// TP/TN segments contribute to their score bucket directly.
pub fn score_frames<'a, I>(segments: I) -> FrameScore
where
    I: IntoIterator<Item = &'a Segment>,
{
    let mut c = FrameCounts::default();

    for seg in segments {
        let secs = seg.duration_secs();
        match seg.score {
            SegmentScore::TruePositive => c.true_positive += secs,
            SegmentScore::TrueNegative => c.true_negative += secs,
            SegmentScore::FalsePositive | SegmentScore::FalseNegative => match seg.err {
                Some(ErrorCode::Deletion) => c.deletion += secs,
                Some(ErrorCode::Insertion) => c.insertion += secs,
                Some(ErrorCode::Fragmented) => c.fragmented += secs,
                Some(ErrorCode::Merged) => c.merged += secs,
                Some(ErrorCode::UnderflowStart) => c.underflow_start += secs,
                Some(ErrorCode::UnderflowEnd) => c.underflow_end += secs,
                Some(ErrorCode::OverflowStart) => c.overflow_start += secs,
                Some(ErrorCode::OverflowEnd) => c.overflow_end += secs,
                None => {}
            },
        }
    }

    c.positive = c.deletion + c.fragmented + c.underflow_start + c.underflow_end + c.true_positive;
    c.negative = c.insertion + c.merged + c.overflow_start + c.overflow_end + c.true_negative;

    let mut score = FrameScore {
        frame_counts: c,
        ..FrameScore::default()
    };
    let c = &score.frame_counts;

    if c.positive > 0.0 {
        for (key, value) in [
            ("Dr", c.deletion),
            ("Fr", c.fragmented),
            ("Usr", c.underflow_start),
            ("Uer", c.underflow_end),
            ("TPr", c.true_positive),
        ] {
            score.p_rates.insert(key.to_string(), value / c.positive);
        }
    }
    if c.negative > 0.0 {
        for (key, value) in [
            ("Ir", c.insertion),
            ("Mr", c.merged),
            ("Osr", c.overflow_start),
            ("Oer", c.overflow_end),
            ("TNr", c.true_negative),
        ] {
            score.n_rates.insert(key.to_string(), value / c.negative);
        }
    }
    let total = c.positive + c.negative;
    if total > 0.0 {
        score.acc = Some((c.true_positive + c.true_negative) / total);
        score.p_rate = Some(c.positive / total);
        score.n_rate = Some(c.negative / total);
    }

    score
}
