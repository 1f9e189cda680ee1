//! Handwritten control number recovery from the top-right page corner

use crate::config::{Capabilities, ExtractorConfig};
use crate::preprocess::prepare_region;
use image::DynamicImage;
use ocrename_domain::traits::{OcrEngine, RecognizeOptions};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Reads a short handwritten number from a fixed region of the first page
pub struct HandwritingExtractor<O: OcrEngine> {
    ocr: Arc<O>,
    config: ExtractorConfig,
    caps: Capabilities,
}

impl<O: OcrEngine> HandwritingExtractor<O> {
    /// Create an extractor sharing `ocr`
    pub fn new(ocr: Arc<O>, config: ExtractorConfig, caps: Capabilities) -> Self {
        Self { ocr, config, caps }
    }

    /// Crop the configured region; `None` when it has no pixels
    pub fn crop_region(&self, page: &DynamicImage) -> Option<DynamicImage> {
        let (width, height) = (page.width(), page.height());
        let y0 = (height as f64 * self.config.roi_top) as u32;
        let y1 = ((height as f64 * self.config.roi_bottom) as u32).min(height);
        let x0 = (width as f64 * self.config.roi_left) as u32;
        let x1 = ((width as f64 * self.config.roi_right) as u32).min(width);

        if y1 <= y0 || x1 <= x0 {
            return None;
        }
        Some(page.crop_imm(x0, y0, x1 - x0, y1 - y0))
    }

    /// Handwritten number of `page`, when one of acceptable length is read
    pub fn extract(&self, page: &DynamicImage) -> Option<String> {
        if !self.ocr.is_ready() {
            error!("OCR engine not initialized, skipping handwritten number");
            return None;
        }

        let Some(region) = self.crop_region(page) else {
            warn!("Handwriting region is empty");
            return None;
        };
        debug!("Handwriting region {}x{}", region.width(), region.height());

        let processed = prepare_region(&region, &self.config, self.caps);
        let fragments = match self.ocr.recognize(&processed, RecognizeOptions::digits()) {
            Ok(fragments) => fragments,
            Err(e) => {
                error!("Digit recognition failed: {}", e);
                return None;
            }
        };
        if fragments.is_empty() {
            warn!("No digits recognized in handwriting region");
            return None;
        }

        let accepted = accept_digits(
            &fragments,
            self.config.handwriting_min_digits,
            self.config.handwriting_max_digits,
        );
        match &accepted {
            Some(number) => info!("Handwritten number read: '{}'", number),
            None => warn!("Handwritten candidate {:?} has an invalid length", fragments),
        }
        accepted
    }
}

/// Join recognized fragments, keep only digits and apply the length gate
pub fn accept_digits(fragments: &[String], min: usize, max: usize) -> Option<String> {
    let digits: String = fragments
        .iter()
        .flat_map(|f| f.chars())
        .filter(char::is_ascii_digit)
        .collect();

    if (min..=max).contains(&digits.len()) {
        Some(digits)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use std::convert::Infallible;

    struct StubOcr(Vec<String>);

    impl OcrEngine for StubOcr {
        type Error = Infallible;

        fn recognize(&self, _image: &DynamicImage, options: RecognizeOptions) -> Result<Vec<String>, Infallible> {
            assert!(options.digits_only);
            assert!(!options.group_paragraphs);
            Ok(self.0.clone())
        }
    }

    fn extractor(reply: &[&str]) -> HandwritingExtractor<StubOcr> {
        let ocr = StubOcr(reply.iter().map(|s| s.to_string()).collect());
        HandwritingExtractor::new(Arc::new(ocr), ExtractorConfig::default(), Capabilities::detect())
    }

    fn page() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(1000, 1400))
    }

    #[test]
    fn test_region_is_top_right_corner() {
        let region = extractor(&[]).crop_region(&page()).unwrap();
        assert_eq!(region.width(), 300);
        assert_eq!(region.height(), 252);
    }

    #[test]
    fn test_degenerate_region() {
        let tiny = DynamicImage::ImageRgb8(RgbImage::new(3, 3));
        assert!(extractor(&[]).crop_region(&tiny).is_none());
    }

    #[test]
    fn test_accept_digits_length_gate() {
        let f = |s: &str| vec![s.to_string()];
        assert_eq!(accept_digits(&f("123"), 4, 6), None);
        assert_eq!(accept_digits(&f("12345678"), 4, 6), None);
        assert_eq!(accept_digits(&f("1234"), 4, 6), Some("1234".to_string()));
        assert_eq!(accept_digits(&f("123456"), 4, 6), Some("123456".to_string()));
        assert_eq!(accept_digits(&f("1234567"), 4, 7), Some("1234567".to_string()));
    }

    #[test]
    fn test_accept_digits_strips_noise() {
        let fragments = vec!["98 7".to_string(), "6-5".to_string()];
        assert_eq!(accept_digits(&fragments, 4, 6), Some("98765".to_string()));
    }

    #[test]
    fn test_extract_reads_region() {
        assert_eq!(extractor(&["98", "765"]).extract(&page()), Some("98765".to_string()));
        assert_eq!(extractor(&["12"]).extract(&page()), None);
        assert_eq!(extractor(&[]).extract(&page()), None);
    }
}
