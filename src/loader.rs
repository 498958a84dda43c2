//! Ground-truth and raw-data file reading.
//!
//! Thin I/O glue around the scoring engine: JSON (optionally gzipped)
//! ground-truth files and glob-based discovery of the raw data files a
//! recognizer should be fed.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::interval::Interval;
use crate::{Error, Result};

/// A labeled ground-truth case.
///
/// The JSON shape is `{labels, data_path, t1, t2, ...}`; unknown fields
/// (titles, notes, device metadata) are preserved and round-tripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundTruth {
    /// Labeled truth intervals.
    pub labels: Vec<Interval>,
    /// Glob pattern locating the raw data files for this case.
    pub data_path: String,
    /// Start of the global evaluation range.
    pub t1: DateTime<Utc>,
    /// End of the global evaluation range.
    pub t2: DateTime<Utc>,
    /// Descriptive fields carried through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl GroundTruth {
    /// Check the global range and every labeled interval.
    pub fn validate(&self) -> Result<()> {
        if self.t1 > self.t2 {
            return Err(Error::ground_truth(format!(
                "global range ends before it starts ({} > {})",
                self.t1, self.t2
            )));
        }
        for interval in &self.labels {
            interval.validate()?;
        }
        Ok(())
    }
}

/// Read a file to a string, transparently decompressing `.gz` files.
pub fn read_to_string(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut contents = String::new();
    if path.extension().is_some_and(|ext| ext == "gz") {
        GzDecoder::new(file).read_to_string(&mut contents)?;
    } else {
        let mut file = file;
        file.read_to_string(&mut contents)?;
    }
    Ok(contents)
}

/// Read and validate a ground-truth file (JSON, optionally gzipped).
pub fn read_ground_truth(path: &Path) -> Result<GroundTruth> {
    let contents = read_to_string(path)?;
    let truth: GroundTruth = serde_json::from_str(&contents).map_err(|e| {
        Error::ground_truth(format!("{}: {e}", path.display()))
    })?;
    truth.validate()?;
    Ok(truth)
}

/// Expand a data-path glob into a sorted list of files.
///
/// Unreadable matches are logged and skipped; an invalid pattern is an
/// error. An empty result is not an error — a case may legitimately carry
/// no raw data when its recognizers replay stored detections.
pub fn discover_data_files(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in glob::glob(pattern)? {
        match entry {
            Ok(path) => files.push(path),
            Err(e) => warn!("skipping unreadable data file: {e}"),
        }
    }
    files.sort();
    Ok(files)
}
