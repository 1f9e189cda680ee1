//! Text recognition through the `tesseract` command-line tool

use crate::{Result, SourceError};
use image::DynamicImage;
use ocrename_domain::traits::{OcrEngine, RecognizeOptions};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Default recognition language
pub const DEFAULT_LANGUAGE: &str = "spa";

const DIGIT_WHITELIST: &str = "tessedit_char_whitelist=0123456789";

/// Runs `tesseract <image> stdout` once per recognition call.
///
/// Readiness is checked once at construction with `tesseract --version`;
/// an engine that failed that check refuses all work.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    language: String,
    ready: bool,
}

impl TesseractEngine {
    /// Use `tesseract` from `PATH`
    pub fn new(language: impl Into<String>) -> Self {
        Self::with_binary("tesseract", language)
    }

    /// Use a specific `tesseract` executable
    pub fn with_binary(binary: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        let binary = binary.into();
        let language = language.into();
        let ready = check_ready(&binary);
        if ready {
            info!("OCR engine ready ({}, language '{}')", binary.display(), language);
        } else {
            warn!("OCR engine unavailable: {} could not be executed", binary.display());
        }
        Self { binary, language, ready }
    }

    /// Recognition language passed to `-l`
    pub fn language(&self) -> &str {
        &self.language
    }
}

impl OcrEngine for TesseractEngine {
    type Error = SourceError;

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn recognize(&self, image: &DynamicImage, options: RecognizeOptions) -> Result<Vec<String>> {
        if !self.ready {
            return Err(SourceError::Ocr("OCR engine not initialized".to_string()));
        }

        let scratch = TempDir::new()?;
        let input = scratch.path().join("input.png");
        image
            .save(&input)
            .map_err(|e| SourceError::Ocr(format!("failed to write OCR input: {}", e)))?;

        let mut command = Command::new(&self.binary);
        command.arg(&input).arg("stdout").arg("-l").arg(&self.language);
        if options.digits_only {
            command.args(["--psm", "6", "-c", DIGIT_WHITELIST]);
        }

        let output = command
            .output()
            .map_err(|e| SourceError::Ocr(format!("failed to run {}: {}", self.binary.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SourceError::Ocr(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let fragments = if options.group_paragraphs {
            split_paragraphs(&text)
        } else {
            split_lines(&text)
        };
        debug!("Recognized {} fragment(s)", fragments.len());
        Ok(fragments)
    }
}

fn check_ready(binary: &Path) -> bool {
    Command::new(binary)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Blank-line separated blocks, each joined into one line
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }
    paragraphs
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
