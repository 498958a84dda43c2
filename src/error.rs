//! Error types for segeval.

use thiserror::Error;

/// Result type for segeval operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for segeval operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Timestamp or record parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// No recognizer registered under the requested name.
    #[error("Unknown recognizer: {0}")]
    UnknownRecognizer(String),

    /// Ground-truth file loading/validation error.
    #[error("Ground truth error: {0}")]
    GroundTruth(String),

    /// Recognizer failed while processing records.
    #[error("Recognizer error: {0}")]
    Recognizer(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid glob pattern in a data path.
    #[error("Glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Create a ground-truth error.
    pub fn ground_truth(msg: impl Into<String>) -> Self {
        Error::GroundTruth(msg.into())
    }

    /// Create a recognizer error.
    pub fn recognizer(msg: impl Into<String>) -> Self {
        Error::Recognizer(msg.into())
    }
}
