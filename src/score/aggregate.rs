//! Combining scoring results from multiple runs.
//!
//! Aggregation never averages per-run rates: frame scores are recomputed
//! from the concatenated segments of all runs, and event rates from the
//! elementwise-summed counts.

use serde::{Deserialize, Serialize};

use crate::score::events::{DetectedCounts, DetectedRates, TruthCounts, TruthRates};
use crate::score::frames::{score_frames, FrameScore};
use crate::score::ScoreResult;

/// Event counts and rates summed across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventScoreSummary {
    /// Summed detected-event counts.
    pub d_counts: DetectedCounts,
    /// Summed truth-event counts.
    pub t_counts: TruthCounts,
    /// Rates recomputed from the summed detected counts.
    pub d_rates: DetectedRates,
    /// Rates recomputed from the summed truth counts.
    pub t_rates: TruthRates,
}

/// Combined scores across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateScores {
    /// Frame score recomputed over every segment of every run.
    pub frame_scores: FrameScore,
    /// Event counts and rates over all runs.
    pub event_scores: EventScoreSummary,
}

/// Input-size statistics summed across runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Total truth events scored.
    pub truth_count: usize,
    /// Total detected events scored.
    pub detected_count: usize,
    /// Total segments produced.
    pub segment_count: usize,
}

/// Combination of N scoring runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Combined frame and event scores.
    pub scores: AggregateScores,
    /// Summed input statistics.
    pub stats: RunStats,
}

/// Aggregate any number of scoring runs.
///
/// Aggregating an empty set is valid and yields all-zero counts with null
/// rates; aggregating a single run reproduces that run's frame and event
/// rates exactly, since recomputing over one run's segments and counts is
/// the identity.
pub fn aggregate<'a, I>(runs: I) -> AggregateResult
where
    I: IntoIterator<Item = &'a ScoreResult>,
{
    let runs: Vec<&ScoreResult> = runs.into_iter().collect();

    let frame_scores = score_frames(runs.iter().flat_map(|r| r.segments.iter()));

    let mut d_counts = DetectedCounts::default();
    let mut t_counts = TruthCounts::default();
    let mut stats = RunStats::default();
    for run in &runs {
        d_counts = d_counts.merge(&run.events.d_counts);
        t_counts = t_counts.merge(&run.events.t_counts);
        stats.truth_count += run.events.truths.len();
        stats.detected_count += run.events.detected.len();
        stats.segment_count += run.segments.len();
    }

    AggregateResult {
        scores: AggregateScores {
            frame_scores,
            event_scores: EventScoreSummary {
                d_rates: d_counts.rates(),
                t_rates: t_counts.rates(),
                d_counts,
                t_counts,
            },
        },
        stats,
    }
}
