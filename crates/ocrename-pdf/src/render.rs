//! Page rasterization through poppler's `pdftoppm`

use crate::{Result, SourceError};
use image::DynamicImage;
use ocrename_domain::traits::PageRenderer;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tracing::{debug, info};

/// Renders pages by running `pdftoppm -png` into a scratch directory
#[derive(Debug, Clone)]
pub struct PopplerRenderer {
    binary: PathBuf,
}

impl Default for PopplerRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PopplerRenderer {
    /// Use `pdftoppm` from `PATH`
    pub fn new() -> Self {
        Self::with_binary("pdftoppm")
    }

    /// Use a specific `pdftoppm` executable
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    fn render(&self, document: &Path, dpi: u32, first_only: bool) -> Result<Vec<DynamicImage>> {
        let scratch = TempDir::new()?;
        let prefix = scratch.path().join("page");

        let mut command = Command::new(&self.binary);
        command.arg("-png").arg("-r").arg(dpi.to_string());
        if first_only {
            command.args(["-f", "1", "-l", "1"]);
        }
        command.arg(document).arg(&prefix);

        debug!("Rendering {} at {} dpi", document.display(), dpi);
        let output = command.output().map_err(|e| {
            SourceError::Render(format!("failed to run {}: {}", self.binary.display(), e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SourceError::Render(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                stderr.trim()
            )));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(scratch.path())? {
            let path = entry?.path();
            let number = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(rendered_page_number);
            if let Some(number) = number {
                files.push((number, path));
            }
        }
        files.sort_by_key(|(number, _)| *number);

        let mut pages = Vec::with_capacity(files.len());
        for (_, path) in files {
            let page = image::open(&path)
                .map_err(|e| SourceError::Render(format!("{}: {}", path.display(), e)))?;
            pages.push(page);
        }

        info!("Rendered {} page(s) of {}", pages.len(), document.display());
        Ok(pages)
    }
}

impl PageRenderer for PopplerRenderer {
    type Error = SourceError;

    fn render_pages(&self, document: &Path, dpi: u32) -> Result<Vec<DynamicImage>> {
        self.render(document, dpi, false)
    }

    fn render_first_page(&self, document: &Path, dpi: u32) -> Result<Option<DynamicImage>> {
        Ok(self.render(document, dpi, true)?.into_iter().next())
    }
}

/// Page number encoded in a `pdftoppm` output name such as `page-07.png`
fn rendered_page_number(file_name: &str) -> Option<u32> {
    let stem = file_name.strip_suffix(".png")?;
    let (_, number) = stem.rsplit_once('-')?;
    number.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_page_number() {
        assert_eq!(rendered_page_number("page-1.png"), Some(1));
        assert_eq!(rendered_page_number("page-07.png"), Some(7));
        assert_eq!(rendered_page_number("page-12.png"), Some(12));
        assert_eq!(rendered_page_number("page.png"), None);
        assert_eq!(rendered_page_number("page-1.ppm"), None);
    }

    #[test]
    fn test_missing_binary_is_render_error() {
        let renderer = PopplerRenderer::with_binary("/nonexistent/pdftoppm");
        let result = renderer.render_pages(Path::new("acta.pdf"), 200);
        assert!(matches!(result, Err(SourceError::Render(_))));
    }
}
