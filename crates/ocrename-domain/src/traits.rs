//! Trait definitions for external interactions
//!
//! These traits define the boundaries between extraction logic and
//! infrastructure. Implementations live in other crates.

use crate::ExtractedRecord;
use image::DynamicImage;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Text layer of a document, read in one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedText {
    /// Text of every page, in page order; unreadable pages are empty
    pub pages: Vec<String>,

    /// The file was encrypted and had to be decrypted to read it
    pub was_encrypted: bool,
}

/// Embedded-text access to a document
///
/// Implemented by the infrastructure layer (ocrename-pdf)
pub trait TextSource {
    /// Error type for source operations
    type Error: Display;

    /// Embedded text of every page.
    ///
    /// An encrypted document is opened with the empty user password, or
    /// with `password` when one is given. A document that stays locked is
    /// an error.
    fn read_text(&self, document: &Path, password: Option<&str>) -> Result<EmbeddedText, Self::Error>;
}

/// Rasterization of document pages
///
/// Implemented by the infrastructure layer (ocrename-pdf)
pub trait PageRenderer {
    /// Error type for rendering operations
    type Error: Display;

    /// Render every page at `dpi`, in page order
    fn render_pages(&self, document: &Path, dpi: u32) -> Result<Vec<DynamicImage>, Self::Error>;

    /// Render only the first page at `dpi`
    fn render_first_page(&self, document: &Path, dpi: u32) -> Result<Option<DynamicImage>, Self::Error> {
        Ok(self.render_pages(document, dpi)?.into_iter().next())
    }
}

/// Options for a single recognition call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecognizeOptions {
    /// Restrict the recognizer to the glyphs 0-9
    pub digits_only: bool,

    /// Group recognized lines into paragraph-level fragments
    pub group_paragraphs: bool,
}

impl RecognizeOptions {
    /// Paragraph-grouped full-text recognition
    pub fn paragraphs() -> Self {
        Self { digits_only: false, group_paragraphs: true }
    }

    /// Ungrouped digit-only recognition
    pub fn digits() -> Self {
        Self { digits_only: true, group_paragraphs: false }
    }
}

/// Optical character recognition over an image
///
/// Implemented by the infrastructure layer (ocrename-pdf)
pub trait OcrEngine {
    /// Error type for recognition
    type Error: Display;

    /// Whether the engine initialized and can accept work
    fn is_ready(&self) -> bool {
        true
    }

    /// Recognized text fragments, in reading order
    fn recognize(&self, image: &DynamicImage, options: RecognizeOptions) -> Result<Vec<String>, Self::Error>;
}

/// Errors surfaced by a language-model provider
pub trait ProviderError: Display {
    /// Whether the failure is a rejected credential rather than a transient fault
    fn is_authentication(&self) -> bool {
        false
    }
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (ocrename-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error: ProviderError;

    /// Raw reply of the text model to `prompt`
    fn complete(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Raw reply of the vision model to `prompt` about a PNG image
    fn complete_with_image(&self, prompt: &str, png: &[u8]) -> Result<String, Self::Error>;

    /// Whether a text model is configured
    fn has_text_model(&self) -> bool {
        true
    }

    /// Whether a vision model is configured
    fn has_vision_model(&self) -> bool {
        true
    }
}

/// Naming and filing of processed documents
///
/// Implemented by the infrastructure layer (ocrename-filer)
pub trait Filer {
    /// Error type for filing operations
    type Error: Display;

    /// Filename for `record` with extension `ext` (including the dot).
    ///
    /// Returns `None` when the record carries no identity number.
    fn build_filename(&self, record: &ExtractedRecord, ext: &str) -> Option<String>;

    /// Copy `original` into the renamed bucket as `new_name`
    fn rename(&self, original: &Path, new_name: &str) -> Result<PathBuf, Self::Error>;

    /// Move `original` into the failed bucket
    fn move_to_failed(&self, original: &Path) -> Result<PathBuf, Self::Error>;
}
