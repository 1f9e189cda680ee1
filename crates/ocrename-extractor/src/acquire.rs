//! Direct-text versus OCR acquisition of document text

use crate::config::{Capabilities, ExtractorConfig};
use crate::preprocess::prepare_page;
use ocrename_domain::traits::{OcrEngine, PageRenderer, RecognizeOptions, TextSource};
use ocrename_domain::ExtractionMethod;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Raw text of a document and how it was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    /// Trimmed document text; `None` when nothing usable was found
    pub text: Option<String>,
    /// Acquisition path taken
    pub method: ExtractionMethod,
}

impl Acquisition {
    fn with_text(text: String, method: ExtractionMethod) -> Self {
        Self { text: Some(text), method }
    }

    fn without_text(method: ExtractionMethod) -> Self {
        Self { text: None, method }
    }
}

/// Reads embedded text when the document carries enough of it and falls
/// back to rendering and recognizing every page otherwise.
///
/// Progress is reported in two phases: 0-50 while embedded pages are
/// inspected and 50-100 while pages are recognized.
pub struct TextAcquirer<S, R, O>
where
    S: TextSource,
    R: PageRenderer,
    O: OcrEngine,
{
    source: Arc<S>,
    renderer: Arc<R>,
    ocr: Arc<O>,
    config: ExtractorConfig,
    caps: Capabilities,
}

impl<S, R, O> TextAcquirer<S, R, O>
where
    S: TextSource,
    R: PageRenderer,
    O: OcrEngine,
{
    /// Create an acquirer over shared collaborators
    pub fn new(source: Arc<S>, renderer: Arc<R>, ocr: Arc<O>, config: ExtractorConfig, caps: Capabilities) -> Self {
        Self {
            source,
            renderer,
            ocr,
            config,
            caps,
        }
    }

    /// Obtain the text of `document`
    pub fn acquire(&self, document: &Path, progress: &mut dyn FnMut(u8)) -> Acquisition {
        progress(0);
        if let Some(text) = self.direct_text(document, progress) {
            progress(100);
            return Acquisition::with_text(text, ExtractionMethod::Direct);
        }

        info!("Insufficient embedded text in {}, running OCR", document.display());
        let acquisition = self.ocr_text(document, progress);
        progress(100);
        acquisition
    }

    /// Embedded text, when any page is text-bearing
    fn direct_text(&self, document: &Path, progress: &mut dyn FnMut(u8)) -> Option<String> {
        let pages = match self.source.read_text(document, Some("")) {
            Ok(read) => {
                if read.was_encrypted {
                    info!("{} is encrypted, opened with an empty password", document.display());
                }
                read.pages
            }
            Err(e) => {
                warn!("Embedded text unreadable in {}: {}", document.display(), e);
                return None;
            }
        };

        let total = pages.len().max(1);
        let mut text_bearing = false;
        for (index, page) in pages.iter().enumerate() {
            if page.trim().chars().count() > self.config.min_page_text_chars {
                text_bearing = true;
            }
            progress(phase_percent(0, index + 1, total));
        }

        if !text_bearing {
            debug!("No page of {} exceeds {} characters", document.display(), self.config.min_page_text_chars);
            return None;
        }

        let joined = pages
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        let joined = joined.trim();
        if joined.is_empty() {
            warn!("Embedded text of {} is empty after joining pages", document.display());
            return None;
        }

        debug!("Direct text of {} has {} characters", document.display(), joined.chars().count());
        Some(joined.to_string())
    }

    fn ocr_text(&self, document: &Path, progress: &mut dyn FnMut(u8)) -> Acquisition {
        if !self.ocr.is_ready() {
            error!("OCR engine not initialized, cannot read {}", document.display());
            return Acquisition::without_text(ExtractionMethod::OcrNotInitialized);
        }

        let pages = match self.renderer.render_pages(document, self.config.render_dpi) {
            Ok(pages) => pages,
            Err(e) => {
                error!("Rendering {} failed: {}", document.display(), e);
                return Acquisition::without_text(ExtractionMethod::OcrException);
            }
        };
        progress(50);

        let total = pages.len().max(1);
        let mut fragments = Vec::new();
        for (index, page) in pages.into_iter().enumerate() {
            let page = prepare_page(page, &self.config, self.caps);
            match self.ocr.recognize(&page, RecognizeOptions::paragraphs()) {
                Ok(found) => {
                    debug!("Page {} of {}: {} fragments", index + 1, document.display(), found.len());
                    fragments.extend(found);
                }
                Err(e) => {
                    error!("OCR failed on page {} of {}: {}", index + 1, document.display(), e);
                    return Acquisition::without_text(ExtractionMethod::OcrException);
                }
            }
            progress(phase_percent(50, index + 1, total));
        }

        let text = fragments.join("\n").trim().to_string();
        if text.is_empty() {
            warn!("OCR recognized no text in {}", document.display());
            Acquisition::without_text(ExtractionMethod::OcrEmptyPage)
        } else {
            info!("OCR produced {} characters for {}", text.chars().count(), document.display());
            Acquisition::with_text(text, ExtractionMethod::OcrFullPage)
        }
    }
}

/// Percentage within a 50-point phase starting at `base`
fn phase_percent(base: u8, done: usize, total: usize) -> u8 {
    base + ((done.min(total) * 50) / total) as u8
}
