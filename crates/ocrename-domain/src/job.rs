//! Per-document job lifecycle

use crate::{DocumentMode, ExtractedRecord, Provenance};
use std::fmt;
use std::path::{Path, PathBuf};

/// How the raw text of a document was obtained (or why it was not)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionMethod {
    /// Embedded text read directly from the PDF
    Direct,
    /// Full-page OCR produced text
    OcrFullPage,
    /// Full-page OCR ran but recognized nothing
    OcrEmptyPage,
    /// Rendering or OCR failed with an unrecoverable error
    OcrException,
    /// The OCR engine never initialized
    OcrNotInitialized,
}

impl ExtractionMethod {
    /// Stable tag written to logs and debug dumps
    pub fn tag(&self) -> &'static str {
        match self {
            ExtractionMethod::Direct => "directo",
            ExtractionMethod::OcrFullPage => "ocr_pagina_completa",
            ExtractionMethod::OcrEmptyPage => "ocr_pagina_vacia",
            ExtractionMethod::OcrException => "fallido_ocr_excepcion",
            ExtractionMethod::OcrNotInitialized => "fallido_ocr_no_init",
        }
    }

    /// Whether the method delivers text
    pub fn produced_text(&self) -> bool {
        matches!(self, ExtractionMethod::Direct | ExtractionMethod::OcrFullPage)
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Why a document ended in the failed bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The OCR engine was not available
    OcrNotInitialized,
    /// A printed-mode document yielded no text at all
    NoText(ExtractionMethod),
    /// No identity number survived every stage
    MissingIdNumber,
    /// The renamed copy could not be written
    RenameFailed(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::OcrNotInitialized => write!(f, "OCR engine not initialized"),
            FailureReason::NoText(method) => write!(f, "no text extracted ({})", method),
            FailureReason::MissingIdNumber => write!(f, "crucial data missing (id_number)"),
            FailureReason::RenameFailed(e) => write!(f, "copy/rename failed: {}", e),
        }
    }
}

/// Terminal state of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A renamed copy was written
    Renamed {
        /// Path of the renamed copy
        destination: PathBuf,
    },
    /// The document could not be renamed
    Failed {
        /// Why processing failed
        reason: FailureReason,
        /// Where the original was moved, if the move succeeded
        moved_to: Option<PathBuf>,
    },
}

impl Outcome {
    /// Whether the document was renamed
    pub fn is_renamed(&self) -> bool {
        matches!(self, Outcome::Renamed { .. })
    }
}

/// One input file flowing through a processing run.
///
/// Created when the run reaches the file, mutated stage by stage and
/// closed by exactly one [`Outcome`]. Never persisted.
#[derive(Debug, Clone)]
pub struct DocumentJob {
    /// Input file
    pub source: PathBuf,

    /// Operator-selected document mode
    pub mode: DocumentMode,

    /// Raw document text, when any was obtained
    pub raw_text: Option<String>,

    /// How the raw text was obtained
    pub method: Option<ExtractionMethod>,

    /// Record assembled from all stages
    pub record: ExtractedRecord,

    /// Stages that changed the record
    pub provenance: Provenance,

    /// Final filename chosen for the renamed copy
    pub filename: Option<String>,

    /// Terminal state, `None` while in progress
    pub outcome: Option<Outcome>,
}

impl DocumentJob {
    /// Open a job for `source`
    pub fn new(source: impl Into<PathBuf>, mode: DocumentMode) -> Self {
        Self {
            source: source.into(),
            mode,
            raw_text: None,
            method: None,
            record: ExtractedRecord::default(),
            provenance: Provenance::for_text(false),
            filename: None,
            outcome: None,
        }
    }

    /// File name of the source, for logs and prompts
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }

    /// Extension of the source including the leading dot, or empty
    pub fn extension(&self) -> String {
        extension_with_dot(&self.source)
    }

    /// Whether the job ended with a renamed copy
    pub fn is_renamed(&self) -> bool {
        self.outcome.as_ref().map(Outcome::is_renamed).unwrap_or(false)
    }
}

fn extension_with_dot(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_tags() {
        assert_eq!(ExtractionMethod::Direct.tag(), "directo");
        assert_eq!(ExtractionMethod::OcrNotInitialized.to_string(), "fallido_ocr_no_init");
        assert!(ExtractionMethod::OcrFullPage.produced_text());
        assert!(!ExtractionMethod::OcrEmptyPage.produced_text());
    }

    #[test]
    fn test_new_job() {
        let job = DocumentJob::new("/tmp/in/acta 01.pdf", DocumentMode::Printed);
        assert_eq!(job.file_name(), "acta 01.pdf");
        assert_eq!(job.extension(), ".pdf");
        assert!(job.outcome.is_none());
        assert!(!job.is_renamed());
    }

    #[test]
    fn test_extension_missing() {
        let job = DocumentJob::new("scan", DocumentMode::HandwrittenCorner);
        assert_eq!(job.extension(), "");
    }
}
