//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Pipeline could not be assembled
    #[error("Extractor error: {0}")]
    Extractor(#[from] ocrename_extractor::ExtractorError),

    /// Output folders could not be prepared
    #[error("Filer error: {0}")]
    Filer(#[from] ocrename_filer::FilerError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
