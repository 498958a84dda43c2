//! Orchestration: evaluate every recognizer against every ground-truth file.
//!
//! The harness owns all I/O and logging around the scoring engine. For each
//! ground-truth file it resets the recognizers, streams every matching raw
//! data file through `process`, then scores each recognizer's results
//! against the truth labels it supports. Runs are independent of each
//! other; this loop is strictly sequential, but nothing in a run depends on
//! any other run.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::interval::Interval;
use crate::loader;
use crate::recognizer::{Recognizer, RecognizerRegistry};
use crate::score::{aggregate, score_run, AggregateScores, RunStats, ScoreOptions, ScoreResult};
use crate::Result;

/// One (ground-truth file, recognizer) evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Registry name of the recognizer evaluated.
    pub recognizer: String,
    /// Path of the ground-truth file.
    pub labels_file: String,
    /// Start of the global evaluation range.
    pub t1: DateTime<Utc>,
    /// End of the global evaluation range.
    pub t2: DateTime<Utc>,
    /// Truth intervals, filtered to the recognizer's supported labels.
    pub labels: Vec<Interval>,
    /// Detected intervals returned by the recognizer.
    pub detected: Vec<Interval>,
    /// Scoring output for this run.
    pub scores: ScoreResult,
}

/// Full evaluation report across all runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Combined scores across all runs.
    pub scores: AggregateScores,
    /// Summed input statistics.
    pub stats: RunStats,
    /// Every individual run, in evaluation order.
    pub results: Vec<RunResult>,
    /// Recognizer names evaluated.
    pub recognizers: Vec<String>,
    /// When the report was produced.
    pub t: DateTime<Utc>,
}

/// Drives recognizers over ground-truth cases and aggregates the scores.
pub struct Harness {
    registry: RecognizerRegistry,
    options: ScoreOptions,
}

impl Harness {
    /// Create a harness over a recognizer registry.
    #[must_use]
    pub fn new(registry: RecognizerRegistry) -> Self {
        Self {
            registry,
            options: ScoreOptions::default(),
        }
    }

    /// Set scoring options for every run.
    #[must_use]
    pub fn with_options(mut self, options: ScoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Evaluate the named recognizers against each ground-truth file.
    ///
    /// Unknown recognizer names fail before any file is read. Within a
    /// truth file, every recognizer sees every raw data batch; recognizer
    /// state is reset between truth files.
    pub fn run(&self, truth_files: &[PathBuf], recognizer_names: &[String]) -> Result<Report> {
        let mut recognizers: Vec<(String, Box<dyn Recognizer>)> = recognizer_names
            .iter()
            .map(|name| self.registry.create(name).map(|rz| (name.clone(), rz)))
            .collect::<Result<_>>()?;

        let mut results = Vec::new();
        for truth_file in truth_files {
            info!("processing {}...", truth_file.display());
            let truth = loader::read_ground_truth(truth_file)?;

            for (_, rz) in recognizers.iter_mut() {
                rz.reset();
            }
            for data_file in loader::discover_data_files(&truth.data_path)? {
                info!("reading data from {}...", data_file.display());
                let chunk = loader::read_to_string(&data_file)?;
                for (_, rz) in recognizers.iter_mut() {
                    rz.process(&chunk)?;
                }
            }

            for (name, rz) in recognizers.iter() {
                let supported = rz.labels_supported();
                info!("evaluating recognizer {name} for labels {supported:?}...");
                let detected = rz.get_results(Some((truth.t1, truth.t2)));
                let labels: Vec<Interval> = truth
                    .labels
                    .iter()
                    .filter(|iv| supported.contains(&iv.label))
                    .cloned()
                    .collect();

                let scores =
                    score_run(&labels, &detected, (truth.t1, truth.t2), &self.options)?;
                for diagnostic in &scores.diagnostics {
                    warn!("{name}: {diagnostic}");
                }

                results.push(RunResult {
                    recognizer: name.clone(),
                    labels_file: truth_file.display().to_string(),
                    t1: truth.t1,
                    t2: truth.t2,
                    labels,
                    detected,
                    scores,
                });
            }
        }

        let combined = aggregate(results.iter().map(|r| &r.scores));
        Ok(Report {
            scores: combined.scores,
            stats: combined.stats,
            results,
            recognizers: recognizer_names.to_vec(),
            t: Utc::now(),
        })
    }
}
