//! OCRename Domain Layer
//!
//! Core vocabulary of the document renaming pipeline: the record extracted
//! from a medical-delivery document, the operator-selected document mode,
//! the provenance trail of extraction stages and the per-document job.
//!
//! ## Key Concepts
//!
//! - **ExtractedRecord**: `{id_type, id_number, acta_no}`, filled stage by stage
//! - **DocumentMode**: printed acta vs. handwritten-corner workflow
//! - **Provenance**: audit trail of the stages that changed the record
//! - **DocumentJob**: lifecycle of one input file within a run
//!
//! ## Architecture
//!
//! This crate holds no infrastructure. PDF text, page rendering, OCR,
//! language models and filesystem filing are reached only through the
//! traits in [`traits`]; implementations live in other crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod job;
pub mod mode;
pub mod provenance;
pub mod record;
pub mod traits;

// Re-exports for convenience
pub use job::{DocumentJob, ExtractionMethod, FailureReason, Outcome};
pub use mode::DocumentMode;
pub use provenance::{Provenance, Stage};
pub use record::{ExtractedRecord, Field, IdType};
