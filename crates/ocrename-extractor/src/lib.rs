//! OCRename Extractor
//!
//! Recovers the patient identity and the delivery control number from
//! Spanish medical-delivery PDFs and decides how each document is filed.
//!
//! # Pipeline
//!
//! ```text
//! PDF → TextAcquirer (direct text | page OCR)
//!     → FieldExtractor (ordered pattern rules, age-based type inference)
//!     → HandwritingExtractor (top-right corner digits, handwritten mode)
//!     → AiFallback (vision model, then text model)
//!     → RecordMerger → Filer
//! ```
//!
//! # Merge policy
//!
//! - **Printed mode**: pattern rules, then the text model fills only the
//!   fields still missing.
//! - **Handwritten-corner mode**: pattern rules, then the corner digits
//!   replace the acta number, then the vision model may override any
//!   field, then the text model fills what remains.
//!
//! A printed document without any text fails immediately. Every stage
//! that changes the record is appended to the job's provenance.
//!
//! # Example
//!
//! ```no_run
//! use ocrename_domain::DocumentMode;
//! use ocrename_extractor::{Capabilities, DocumentProcessor, ExtractorConfig};
//! use ocrename_filer::{FilerConfig, FsFiler};
//! use ocrename_llm::MockProvider;
//! use ocrename_pdf::{LopdfSource, PopplerRenderer, TesseractEngine};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let processor = DocumentProcessor::new(
//!     Arc::new(LopdfSource::new()),
//!     Arc::new(PopplerRenderer::new()),
//!     Arc::new(TesseractEngine::new("spa")),
//!     None::<Arc<MockProvider>>,
//!     FsFiler::new(FilerConfig::default())?,
//!     ExtractorConfig::default(),
//!     Capabilities::detect(),
//! )?;
//!
//! let job = processor.process("scan_001.pdf".as_ref(), DocumentMode::Printed, &mut |_| {});
//! println!("{:?} via {}", job.outcome, job.provenance);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod acquire;
mod ai;
mod config;
mod error;
mod fields;
mod handwriting;
mod merger;
mod parser;
mod preprocess;
mod processor;
mod prompt;
mod rules;

#[cfg(test)]
mod tests;

pub use acquire::{Acquisition, TextAcquirer};
pub use ai::{encode_png, AiFallback};
pub use config::{Capabilities, ExtractorConfig};
pub use error::ExtractorError;
pub use fields::{type_for_age, FieldExtractor, FieldReport, TypeSource};
pub use handwriting::{accept_digits, HandwritingExtractor};
pub use merger::{MergeOutcome, MergeStrategy, RecordMerger};
pub use parser::parse_ai_reply;
pub use preprocess::{clahe, prepare_page, prepare_region};
pub use processor::{debug_dump_name, DocumentProcessor, RunReporter, RunSummary, EMPTY_DUMP};
pub use prompt::{PromptBuilder, PromptKind};
pub use rules::{Rule, RuleKind, ACTA_RULES, CAPTURABLE_TYPES, ID_RULES};
