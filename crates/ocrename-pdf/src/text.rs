//! Embedded text access through `lopdf`

use crate::{Result, SourceError};
use lopdf::Document;
use ocrename_domain::traits::{EmbeddedText, TextSource};
use std::path::Path;
use tracing::{debug, info, warn};

/// Reads the text layer of a PDF with `lopdf`
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfSource;

impl LopdfSource {
    /// Create a new source
    pub fn new() -> Self {
        Self
    }

    /// Parse `document`, decrypting it on the way.
    ///
    /// `lopdf` tries the empty user password by itself; a non-empty
    /// `password` is tried after it.
    fn load(document: &Path, password: Option<&str>) -> Result<Document> {
        let loaded = match password.filter(|p| !p.is_empty()) {
            Some(password) => Document::load_with_password(document, password),
            None => Document::load(document),
        };
        let doc = loaded.map_err(|e| match e {
            lopdf::Error::InvalidPassword => {
                SourceError::Encrypted(format!("{}: wrong password", document.display()))
            }
            e => SourceError::Load(format!("{}: {}", document.display(), e)),
        })?;

        if doc.is_encrypted() {
            return Err(SourceError::Encrypted(format!(
                "{} requires a password",
                document.display()
            )));
        }
        Ok(doc)
    }
}

impl TextSource for LopdfSource {
    type Error = SourceError;

    fn read_text(&self, document: &Path, password: Option<&str>) -> Result<EmbeddedText> {
        let doc = Self::load(document, password)?;
        let was_encrypted = doc.was_encrypted();
        if was_encrypted {
            info!("{} was encrypted and has been decrypted", document.display());
        }

        let pages = doc.get_pages();
        let mut texts = Vec::with_capacity(pages.len());
        for page_number in pages.keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    warn!(
                        "Could not read text of page {} in {}: {}",
                        page_number,
                        document.display(),
                        e
                    );
                    texts.push(String::new());
                }
            }
        }

        debug!("Read text of {} page(s) from {}", texts.len(), document.display());
        Ok(EmbeddedText {
            pages: texts,
            was_encrypted,
        })
    }
}
