//! Timeline construction: carving truth and detected boundaries into
//! contiguous segments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::{span_secs, Interval, TimeSpan};
use crate::score::classify::ErrorCode;

/// Segment classification relative to ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentScore {
    /// Covered by both a truth and a detected interval.
    #[serde(rename = "TP")]
    TruePositive,
    /// Covered by neither.
    #[serde(rename = "TN")]
    TrueNegative,
    /// Covered by a detected interval only.
    #[serde(rename = "FP")]
    FalsePositive,
    /// Covered by a truth interval only.
    #[serde(rename = "FN")]
    FalseNegative,
}

impl SegmentScore {
    /// Short wire label ("TP", "TN", "FP", "FN").
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentScore::TruePositive => "TP",
            SegmentScore::TrueNegative => "TN",
            SegmentScore::FalsePositive => "FP",
            SegmentScore::FalseNegative => "FN",
        }
    }
}

impl std::fmt::Display for SegmentScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One contiguous slice of the evaluation timeline.
///
/// Segments are produced only by timeline construction; callers never build
/// them directly. Adjacent segments share a boundary timestamp, and segments
/// from coincident interval boundaries may have zero duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start of the slice.
    pub t1: DateTime<Utc>,
    /// End of the slice.
    pub t2: DateTime<Utc>,
    /// Basic classification.
    pub score: SegmentScore,
    /// Positional error code, set only on FP/FN segments the taxonomy covers.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub err: Option<ErrorCode>,
    /// Label of the last truth interval overlapping this slice.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
}

impl Segment {
    /// Slice duration in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        span_secs(self.t1, self.t2)
    }
}

impl TimeSpan for Segment {
    fn t1(&self) -> DateTime<Utc> {
        self.t1
    }
    fn t2(&self) -> DateTime<Utc> {
        self.t2
    }
}

/// Collect every boundary from truth and detected intervals, bracket the
/// sequence with the global range, and emit one `(start, end)` pair per
/// adjacent boundary pair.
///
/// Duplicate timestamps are deliberately kept: coincident boundaries yield
/// zero-duration segments that still participate in classification. The
/// global bounds are only prepended/appended when they fall strictly outside
/// the collected boundaries, so the emitted pairs exactly tile
/// `[range.0, range.1]`.
#[must_use]
pub fn extract_segments(
    truths: &[Interval],
    detected: &[Interval],
    range: (DateTime<Utc>, DateTime<Utc>),
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut ts: Vec<DateTime<Utc>> = truths
        .iter()
        .chain(detected.iter())
        .flat_map(|x| [x.t1, x.t2])
        .collect();
    ts.sort();

    match ts.first() {
        Some(&first) if range.0 < first => ts.insert(0, range.0),
        None => ts.push(range.0),
        _ => {}
    }
    if let Some(&last) = ts.last() {
        if range.1 > last {
            ts.push(range.1);
        }
    }

    ts.windows(2).map(|w| (w[0], w[1])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn iv(t1: i64, t2: i64) -> Interval {
        Interval::new(ts(t1), ts(t2), "A")
    }

    #[test]
    fn test_single_matching_pair_yields_one_segment() {
        let bounds = extract_segments(&[iv(0, 10)], &[iv(0, 10)], (ts(0), ts(10)));
        // Boundaries coincide, so duplicates are kept: 0,0,10,10 -> 3 windows.
        assert_eq!(bounds.len(), 3);
        assert_eq!(bounds[0], (ts(0), ts(0)));
        assert_eq!(bounds[1], (ts(0), ts(10)));
        assert_eq!(bounds[2], (ts(10), ts(10)));
    }

    #[test]
    fn test_global_range_brackets_boundaries() {
        let bounds = extract_segments(&[iv(5, 10)], &[], (ts(0), ts(20)));
        assert_eq!(bounds.first().unwrap().0, ts(0));
        assert_eq!(bounds.last().unwrap().1, ts(20));
        assert_eq!(bounds.len(), 3);
    }

    #[test]
    fn test_global_range_inside_boundaries_is_not_inserted() {
        // Range endpoints equal to the extreme boundaries are not duplicated.
        let bounds = extract_segments(&[iv(0, 10)], &[], (ts(0), ts(10)));
        assert_eq!(bounds.len(), 1);
        assert_eq!(bounds[0], (ts(0), ts(10)));
    }

    #[test]
    fn test_no_intervals_yields_single_segment() {
        let bounds = extract_segments(&[], &[], (ts(0), ts(30)));
        assert_eq!(bounds, vec![(ts(0), ts(30))]);
    }

    #[test]
    fn test_segments_tile_the_range() {
        let truths = vec![iv(2, 8), iv(12, 18)];
        let detected = vec![iv(3, 9), iv(12, 20)];
        let bounds = extract_segments(&truths, &detected, (ts(0), ts(25)));
        let total: f64 = bounds.iter().map(|(a, b)| span_secs(*a, *b)).sum();
        assert!((total - 25.0).abs() < 1e-9);
        // Adjacent segments share boundaries.
        for w in bounds.windows(2) {
            assert_eq!(w[0].1, w[1].0);
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn iv(t1: i64, t2: i64) -> Interval {
        Interval::new(
            Utc.timestamp_opt(t1, 0).unwrap(),
            Utc.timestamp_opt(t2, 0).unwrap(),
            "X",
        )
    }

    fn intervals() -> impl Strategy<Value = Vec<Interval>> {
        proptest::collection::vec((100i64..900, 0i64..100), 0..8)
            .prop_map(|v| v.into_iter().map(|(s, len)| iv(s, s + len)).collect())
    }

    proptest! {
        #[test]
        fn segments_always_tile_the_global_range(
            truths in intervals(),
            detected in intervals(),
        ) {
            let range = (
                Utc.timestamp_opt(0, 0).unwrap(),
                Utc.timestamp_opt(1000, 0).unwrap(),
            );
            let bounds = extract_segments(&truths, &detected, range);
            let total: f64 = bounds.iter().map(|(a, b)| span_secs(*a, *b)).sum();
            prop_assert!((total - 1000.0).abs() < 1e-9);
            for w in bounds.windows(2) {
                prop_assert_eq!(w[0].1, w[1].0);
            }
        }
    }
}
