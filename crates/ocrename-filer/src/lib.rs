//! OCRename Filer
//!
//! Names processed documents after their extracted record and files them
//! into two buckets below a common output directory:
//!
//! - **renamed**: a copy of the original under `<TYPE>_<NUMBER>_<ACTA><ext>`
//! - **failed**: the original itself, moved out of the input folder
//!
//! Existing files are never overwritten; a numeric suffix (`_1`, `_2`, ...)
//! is inserted before the extension instead.
//!
//! # Examples
//!
//! ```no_run
//! use ocrename_domain::{ExtractedRecord, IdType};
//! use ocrename_domain::traits::Filer;
//! use ocrename_filer::{FilerConfig, FsFiler};
//!
//! let filer = FsFiler::new(FilerConfig::default())?;
//! let record = ExtractedRecord::new(IdType::CC, "12345678", "4567");
//!
//! if let Some(name) = filer.build_filename(&record, ".pdf") {
//!     filer.rename("scan_001.pdf".as_ref(), &name)?;
//! }
//! # Ok::<(), ocrename_filer::FilerError>(())
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod filer;
mod naming;

pub use config::FilerConfig;
pub use error::{FilerError, Result};
pub use filer::FsFiler;
pub use naming::{build_filename, sanitize_token, unique_destination};
