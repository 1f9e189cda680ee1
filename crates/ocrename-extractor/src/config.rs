//! Configuration for the Extractor

use serde::{Deserialize, Serialize};

/// Tunable constants of the extraction pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// A page counts as text-bearing when its trimmed text is longer than this
    pub min_page_text_chars: usize,

    /// Resolution used to render pages for OCR and the image stages
    pub render_dpi: u32,

    /// Convert full pages to grayscale before OCR (needs image preprocessing)
    pub full_page_grayscale: bool,

    /// Top edge of the handwriting region, as a fraction of page height
    pub roi_top: f64,

    /// Bottom edge of the handwriting region, as a fraction of page height
    pub roi_bottom: f64,

    /// Left edge of the handwriting region, as a fraction of page width
    pub roi_left: f64,

    /// Right edge of the handwriting region, as a fraction of page width
    pub roi_right: f64,

    /// Fewest digits accepted from the handwriting region
    pub handwriting_min_digits: usize,

    /// Most digits accepted from the handwriting region
    pub handwriting_max_digits: usize,

    /// Contrast limit of the adaptive histogram equalization
    pub clahe_clip_limit: f32,

    /// Tiles per axis of the adaptive histogram equalization
    pub clahe_tile_grid: u32,

    /// Characters on each side of a bare number searched for ID keywords
    pub id_context_window: usize,

    /// Characters before an age searched for the word "EDAD"
    pub age_context_window: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_page_text_chars: 50,
            render_dpi: 200,
            full_page_grayscale: true,
            roi_top: 0.0,
            roi_bottom: 0.18,
            roi_left: 0.70,
            roi_right: 1.0,
            handwriting_min_digits: 4,
            handwriting_max_digits: 6,
            clahe_clip_limit: 2.0,
            clahe_tile_grid: 8,
            id_context_window: 70,
            age_context_window: 30,
        }
    }
}

impl ExtractorConfig {
    /// Narrow preset: region starts at 75% of the width, 4-6 digits
    pub fn strict() -> Self {
        Self {
            roi_left: 0.75,
            handwriting_max_digits: 6,
            ..Self::default()
        }
    }

    /// Wide preset: 4-7 digits accepted from the handwriting region
    pub fn lenient() -> Self {
        Self {
            roi_left: 0.70,
            handwriting_max_digits: 7,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.render_dpi == 0 {
            return Err("render_dpi must be greater than 0".to_string());
        }
        check_span("roi_top", self.roi_top, "roi_bottom", self.roi_bottom)?;
        check_span("roi_left", self.roi_left, "roi_right", self.roi_right)?;
        if self.handwriting_min_digits == 0 {
            return Err("handwriting_min_digits must be greater than 0".to_string());
        }
        if self.handwriting_min_digits > self.handwriting_max_digits {
            return Err(format!(
                "handwriting_min_digits ({}) cannot exceed handwriting_max_digits ({})",
                self.handwriting_min_digits, self.handwriting_max_digits
            ));
        }
        if self.clahe_clip_limit <= 0.0 {
            return Err("clahe_clip_limit must be greater than 0".to_string());
        }
        if self.clahe_tile_grid == 0 {
            return Err("clahe_tile_grid must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

fn check_span(low_name: &str, low: f64, high_name: &str, high: f64) -> Result<(), String> {
    if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) {
        return Err(format!("{} and {} must lie in [0.0, 1.0]", low_name, high_name));
    }
    if low >= high {
        return Err(format!("{} must be smaller than {}", low_name, high_name));
    }
    Ok(())
}

/// Optional capabilities, resolved once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Contrast enhancement and binarization are available
    pub image_preprocessing: bool,
}

impl Capabilities {
    /// Capabilities compiled into this build
    pub fn detect() -> Self {
        Self {
            image_preprocessing: cfg!(feature = "preprocessing"),
        }
    }

    /// No optional capability
    pub fn none() -> Self {
        Self { image_preprocessing: false }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::detect()
    }
}
