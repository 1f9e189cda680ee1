//! Filer error types

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for filing operations
pub type Result<T> = std::result::Result<T, FilerError>;

/// Errors that can occur while filing a document
#[derive(Error, Debug)]
pub enum FilerError {
    /// Filesystem operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document to file does not exist
    #[error("Source file not found: {0}")]
    MissingSource(PathBuf),

    /// The requested name cannot be used as a file name
    #[error("Invalid file name: '{0}'")]
    InvalidName(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
