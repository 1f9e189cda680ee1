//! Error types for the Extractor
//!
//! Failures while processing a single document never surface as errors;
//! they end the document's job with a [`FailureReason`](ocrename_domain::FailureReason).

use thiserror::Error;

/// Errors raised while assembling the pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
