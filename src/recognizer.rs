//! Recognizer capability contract and registry.
//!
//! A recognizer is anything that turns raw data records into labeled time
//! intervals. The scoring side only ever calls the four operations of the
//! [`Recognizer`] trait; concrete implementations are selected by name from
//! a [`RecognizerRegistry`] populated at startup, so new recognizers plug in
//! without any late-bound loading.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::interval::{overlap, Interval};
use crate::{Error, Result};

/// The capability contract every recognizer implements.
///
/// The evaluation harness drives a recognizer through exactly these four
/// operations: `reset`, then `process` for every raw data batch, then
/// `get_results` and `labels_supported` for scoring.
pub trait Recognizer {
    /// Ingest a batch of raw records, updating internal state.
    fn process(&mut self, records: &str) -> Result<()>;

    /// Ordered recognition results, optionally restricted to spans
    /// overlapping `time_range`.
    fn get_results(&self, time_range: Option<(DateTime<Utc>, DateTime<Utc>)>) -> Vec<Interval>;

    /// Label classes this recognizer can produce.
    ///
    /// Used to filter ground-truth labels down to what the recognizer could
    /// plausibly have detected before scoring.
    fn labels_supported(&self) -> Vec<String>;

    /// Clear all internal state between runs.
    fn reset(&mut self);
}

fn range_filter(
    mut results: Vec<Interval>,
    time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> Vec<Interval> {
    if let Some(range) = time_range {
        results.retain(|iv| overlap(iv, &range));
    }
    results.sort_by_key(|iv| (iv.t1, iv.t2));
    results
}

/// Recognizer that plays back detections parsed from the records it is fed.
///
/// `process` expects each batch to be a JSON array of interval records
/// (`{"t1", "t2", "label"}`) and keeps those whose label is supported.
/// Useful for re-scoring the stored output of an external detector.
pub struct ReplayRecognizer {
    labels: Vec<String>,
    results: Vec<Interval>,
}

impl ReplayRecognizer {
    /// Create a replay recognizer for the given label classes.
    #[must_use]
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            labels,
            results: Vec::new(),
        }
    }
}

impl Recognizer for ReplayRecognizer {
    fn process(&mut self, records: &str) -> Result<()> {
        let batch: Vec<Interval> = serde_json::from_str(records)
            .map_err(|e| Error::parse(format!("replay records: {e}")))?;
        for interval in batch {
            interval.validate()?;
            if self.labels.contains(&interval.label) {
                self.results.push(interval);
            }
        }
        Ok(())
    }

    fn get_results(&self, time_range: Option<(DateTime<Utc>, DateTime<Utc>)>) -> Vec<Interval> {
        range_filter(self.results.clone(), time_range)
    }

    fn labels_supported(&self) -> Vec<String> {
        self.labels.clone()
    }

    fn reset(&mut self) {
        self.results.clear();
    }
}

/// Recognizer that always returns a fixed set of detections.
///
/// `process` is a no-op and `reset` restores the initial detections, so the
/// same results come back run after run. Used in tests and as a baseline.
#[derive(Clone)]
pub struct FixedRecognizer {
    labels: Vec<String>,
    results: Vec<Interval>,
}

impl FixedRecognizer {
    /// Create a fixed recognizer with no detections.
    #[must_use]
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            labels,
            results: Vec::new(),
        }
    }

    /// Set the detections to return.
    #[must_use]
    pub fn with_results(mut self, results: Vec<Interval>) -> Self {
        self.results = results;
        self
    }
}

impl Recognizer for FixedRecognizer {
    fn process(&mut self, _records: &str) -> Result<()> {
        Ok(())
    }

    fn get_results(&self, time_range: Option<(DateTime<Utc>, DateTime<Utc>)>) -> Vec<Interval> {
        range_filter(self.results.clone(), time_range)
    }

    fn labels_supported(&self) -> Vec<String> {
        self.labels.clone()
    }

    fn reset(&mut self) {}
}

type Factory = Box<dyn Fn() -> Box<dyn Recognizer>>;

/// Maps recognizer names to constructors.
///
/// Populated explicitly at startup; `create` fails fast with
/// [`Error::UnknownRecognizer`] for unregistered names.
#[derive(Default)]
pub struct RecognizerRegistry {
    factories: HashMap<String, Factory>,
}

impl RecognizerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in recognizers registered.
    ///
    /// Currently that is `replay`, which accepts every label it sees in its
    /// input records.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("replay", || {
            Box::new(ReplayAllRecognizer::default()) as Box<dyn Recognizer>
        });
        registry
    }

    /// Register a factory under a name, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Recognizer> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Instantiate the recognizer registered under `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn Recognizer>> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| Error::UnknownRecognizer(name.to_string()))
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Replay recognizer that accepts every label present in its input.
#[derive(Default)]
struct ReplayAllRecognizer {
    results: Vec<Interval>,
}

impl Recognizer for ReplayAllRecognizer {
    fn process(&mut self, records: &str) -> Result<()> {
        let batch: Vec<Interval> = serde_json::from_str(records)
            .map_err(|e| Error::parse(format!("replay records: {e}")))?;
        for interval in &batch {
            interval.validate()?;
        }
        self.results.extend(batch);
        Ok(())
    }

    fn get_results(&self, time_range: Option<(DateTime<Utc>, DateTime<Utc>)>) -> Vec<Interval> {
        range_filter(self.results.clone(), time_range)
    }

    fn labels_supported(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.results.iter().map(|iv| iv.label.clone()).collect();
        labels.sort();
        labels.dedup();
        labels
    }

    fn reset(&mut self) {
        self.results.clear();
    }
}
