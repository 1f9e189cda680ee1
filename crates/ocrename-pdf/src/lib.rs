//! OCRename PDF Infrastructure
//!
//! Backends for the collaborator traits of `ocrename-domain` that touch
//! documents and pixels:
//!
//! - [`LopdfSource`]: embedded page text and encryption via `lopdf`
//! - [`PopplerRenderer`]: page rasterization through the `pdftoppm` binary
//! - [`TesseractEngine`]: text recognition through the `tesseract` binary
//!
//! The renderer and OCR engine shell out to system tools. Both report a
//! missing binary as an error (or, for OCR, as an engine that is not
//! ready) instead of panicking, so a run can route affected documents to
//! the failed bucket and continue.

#![warn(missing_docs)]

pub mod ocr;
pub mod render;
pub mod text;

use thiserror::Error;

pub use ocr::TesseractEngine;
pub use render::PopplerRenderer;
pub use text::LopdfSource;

/// Errors raised by the PDF and OCR backends
#[derive(Error, Debug)]
pub enum SourceError {
    /// The document could not be opened or parsed
    #[error("Failed to load document: {0}")]
    Load(String),

    /// The document is encrypted and could not be decrypted
    #[error("Document is encrypted: {0}")]
    Encrypted(String),

    /// Page rasterization failed
    #[error("Render error: {0}")]
    Render(String),

    /// Text recognition failed
    #[error("OCR error: {0}")]
    Ocr(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for backend operations
pub type Result<T> = std::result::Result<T, SourceError>;
