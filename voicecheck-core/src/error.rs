//! Error types for voicecheck-core

use thiserror::Error;

/// Result type for decoding, extraction and rule loading
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the decision engine
#[derive(Error, Debug)]
pub enum Error {
    /// Corrupt or unsupported audio container
    #[error("Audio decode failed: {0}")]
    Decode(String),

    /// Numeric failure while computing features (degenerate or too-short signal)
    #[error("Feature extraction failed: {0}")]
    FeatureExtraction(String),

    /// Invalid rule table or extractor configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures caused by the submitted audio rather than the service
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::Decode(_) | Error::FeatureExtraction(_))
    }
}
