//! Language-model fallback for fields the deterministic stages missed

use crate::parser::parse_ai_reply;
use crate::prompt::PromptBuilder;
use image::{DynamicImage, ImageFormat};
use ocrename_domain::traits::{LlmProvider, ProviderError};
use ocrename_domain::ExtractedRecord;
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Best-effort record extraction through a language-model provider.
///
/// Every failure ends as "no answer": transport errors are retried by the
/// provider itself, an authentication failure is logged distinctly, and a
/// reply without a JSON object or with only null fields is discarded.
pub struct AiFallback<L: LlmProvider> {
    provider: Option<Arc<L>>,
}

impl<L: LlmProvider> AiFallback<L> {
    /// Fallback backed by `provider`
    pub fn new(provider: Arc<L>) -> Self {
        Self { provider: Some(provider) }
    }

    /// Fallback with no provider; every query answers nothing
    pub fn disabled() -> Self {
        Self { provider: None }
    }

    /// Whether text queries can run
    pub fn text_available(&self) -> bool {
        self.provider.as_ref().is_some_and(|p| p.has_text_model())
    }

    /// Whether vision queries can run
    pub fn vision_available(&self) -> bool {
        self.provider.as_ref().is_some_and(|p| p.has_vision_model())
    }

    /// Ask the text model for a record from document text
    pub fn text_query(&self, text: &str, filename: &str) -> Option<ExtractedRecord> {
        let provider = self.provider.as_ref().filter(|p| p.has_text_model())?;
        if text.trim().is_empty() {
            info!("No text to send to the text model for '{}'", filename);
            return None;
        }

        let prompt = PromptBuilder::for_text(text, filename).build();
        debug!("Text prompt for '{}': {} chars", filename, prompt.len());
        let reply = provider.complete(&prompt);
        interpret("text", filename, reply)
    }

    /// Ask the vision model for a record from the first page image
    pub fn vision_query(&self, page: &DynamicImage, filename: &str) -> Option<ExtractedRecord> {
        let provider = self.provider.as_ref().filter(|p| p.has_vision_model())?;

        let png = match encode_png(page) {
            Ok(png) => png,
            Err(e) => {
                error!("Could not encode page of '{}' for the vision model: {}", filename, e);
                return None;
            }
        };

        let prompt = PromptBuilder::for_vision(filename).build();
        debug!("Vision request for '{}': {} byte image", filename, png.len());
        let reply = provider.complete_with_image(&prompt, &png);
        interpret("vision", filename, reply)
    }
}

/// Encode a page as PNG bytes
pub fn encode_png(page: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    page.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

fn interpret<E: ProviderError>(model: &str, filename: &str, reply: Result<String, E>) -> Option<ExtractedRecord> {
    let reply = match reply {
        Ok(reply) => reply,
        Err(e) if e.is_authentication() => {
            error!("Authentication with the AI provider failed, check the API key: {}", e);
            return None;
        }
        Err(e) => {
            warn!("AI {} query for '{}' gave no answer: {}", model, filename, e);
            return None;
        }
    };

    let record = parse_ai_reply(&reply)?;
    if record.is_empty() {
        info!("AI {} model found nothing for '{}'", model, filename);
        return None;
    }
    info!("AI {} model answered for '{}': {}", model, filename, record);
    Some(record)
}
