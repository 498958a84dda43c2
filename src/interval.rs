//! Time intervals and the overlap predicate.
//!
//! [`Interval`] is the unit of input for scoring: a labeled span of time
//! produced either by a ground-truth annotator or by a recognizer. The
//! [`overlap`] predicate defined here is the primitive every later scoring
//! stage is built on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A labeled span of time.
///
/// Represents either a ground-truth labeled span or a recognizer-detected
/// span. Validated intervals satisfy `t1 <= t2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Start of the span.
    pub t1: DateTime<Utc>,
    /// End of the span.
    pub t2: DateTime<Utc>,
    /// Label class, e.g. "WALKING".
    pub label: String,
}

impl Interval {
    /// Create a new interval.
    #[must_use]
    pub fn new(t1: DateTime<Utc>, t2: DateTime<Utc>, label: impl Into<String>) -> Self {
        Self {
            t1,
            t2,
            label: label.into(),
        }
    }

    /// Check the `t1 <= t2` invariant.
    ///
    /// Downstream ordering and duration arithmetic depend on it, so a
    /// violation is fatal for the run rather than silently skipped.
    pub fn validate(&self) -> Result<()> {
        if self.t1 > self.t2 {
            return Err(Error::invalid_input(format!(
                "interval '{}' ends before it starts ({} > {})",
                self.label, self.t1, self.t2
            )));
        }
        Ok(())
    }

    /// Span duration in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        span_secs(self.t1, self.t2)
    }
}

/// Anything with a start and end timestamp.
///
/// Implemented by [`Interval`], scored segments, and annotated events, so
/// the overlap predicate works across all of them.
pub trait TimeSpan {
    /// Start of the span.
    fn t1(&self) -> DateTime<Utc>;
    /// End of the span.
    fn t2(&self) -> DateTime<Utc>;
}

impl TimeSpan for Interval {
    fn t1(&self) -> DateTime<Utc> {
        self.t1
    }
    fn t2(&self) -> DateTime<Utc> {
        self.t2
    }
}

impl TimeSpan for (DateTime<Utc>, DateTime<Utc>) {
    fn t1(&self) -> DateTime<Utc> {
        self.0
    }
    fn t2(&self) -> DateTime<Utc> {
        self.1
    }
}

/// True when `a` and `b` share more than a single boundary instant.
///
/// Two spans that merely touch at one shared endpoint (one's start equals
/// the other's end) do not overlap; point contact never triggers a match.
/// Symmetric in its arguments.
#[must_use]
pub fn overlap<A, B>(a: &A, b: &B) -> bool
where
    A: TimeSpan + ?Sized,
    B: TimeSpan + ?Sized,
{
    a.t1() <= b.t2() && b.t1() <= a.t2() && a.t1() != b.t2() && b.t1() != a.t2()
}

/// Seconds between two timestamps as f64, at microsecond resolution.
pub(crate) fn span_secs(t1: DateTime<Utc>, t2: DateTime<Utc>) -> f64 {
    let d = t2 - t1;
    d.num_microseconds().map_or_else(
        // Spans past ~292k years overflow the microsecond count.
        || d.num_milliseconds() as f64 / 1_000.0,
        |us| us as f64 / 1_000_000.0,
    )
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
    fn test_overlap_basic() {
        assert!(overlap(&iv(0, 10), &iv(5, 15)));
        assert!(overlap(&iv(0, 10), &iv(0, 10)));
        assert!(overlap(&iv(0, 10), &iv(2, 8)));
        assert!(!overlap(&iv(0, 10), &iv(20, 30)));
    }

    #[test]
    fn test_point_contact_is_not_overlap() {
        // One's end equals the other's start.
        assert!(!overlap(&iv(0, 10), &iv(10, 20)));
        assert!(!overlap(&iv(10, 20), &iv(0, 10)));
    }

    #[test]
    fn test_zero_duration_span_inside() {
        // A zero-duration span strictly inside a wider one still overlaps.
        assert!(overlap(&iv(5, 5), &iv(0, 10)));
        // At the boundary it degenerates to point contact.
        assert!(!overlap(&iv(10, 10), &iv(0, 10)));
    }

    #[test]
    fn test_validate_rejects_reversed() {
        assert!(iv(10, 0).validate().is_err());
        assert!(iv(0, 10).validate().is_ok());
        assert!(iv(5, 5).validate().is_ok());
    }

    #[test]
    fn test_duration_secs() {
        assert!((iv(0, 10).duration_secs() - 10.0).abs() < f64::EPSILON);
        assert!(iv(3, 3).duration_secs().abs() < f64::EPSILON);
    }

    #[test]
    fn test_duration_secs_keeps_sub_millisecond_precision() {
        // Fractional-second timestamps must not be truncated to whole
        // milliseconds.
        let a = Utc.timestamp_opt(0, 0).unwrap();
        let b = Utc.timestamp_opt(0, 1_500_000).unwrap();
        let span = Interval::new(a, b, "A");
        assert!((span.duration_secs() - 0.0015).abs() < 1e-12);
    }

    #[test]
    fn test_interval_json_shape() {
        let json = r#"{"t1":"2023-01-01T00:00:00Z","t2":"2023-01-01T00:01:00Z","label":"WALKING"}"#;
        let iv: Interval = serde_json::from_str(json).unwrap();
        assert_eq!(iv.label, "WALKING");
        assert!((iv.duration_secs() - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bad_timestamp_is_an_error() {
        let json = r#"{"t1":"not-a-date","t2":"2023-01-01T00:01:00Z","label":"WALKING"}"#;
        assert!(serde_json::from_str::<Interval>(json).is_err());
    }
}
