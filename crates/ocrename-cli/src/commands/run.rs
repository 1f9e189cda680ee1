//! Rename run: wire the pipeline and process the selected documents.

use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::output::{Formatter, JobRow};
use ocrename_domain::DocumentJob;
use ocrename_extractor::{Capabilities, DocumentProcessor, RunReporter, RunSummary};
use ocrename_filer::FsFiler;
use ocrename_llm::OpenRouterProvider;
use ocrename_pdf::{LopdfSource, PopplerRenderer, TesseractEngine};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Expand the command-line paths into the documents to process.
///
/// Files are taken as given; a directory contributes its `.pdf` files in
/// name order. Paths that do not exist are rejected.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_pdf(p))
                .collect();
            found.sort();
            if found.is_empty() {
                warn!("No PDF files in {}", path.display());
            }
            files.extend(found);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(CliError::InvalidInput(format!("'{}' does not exist", path.display())));
        }
    }

    if files.is_empty() {
        return Err(CliError::InvalidInput("no PDF files selected".to_string()));
    }
    Ok(files)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Console observer of a run: progress on stderr, one line per document.
pub struct ConsoleReporter<'a> {
    formatter: &'a Formatter,
    show_progress: bool,
    rows: Vec<JobRow>,
}

impl<'a> ConsoleReporter<'a> {
    /// Create a reporter printing through `formatter`.
    pub fn new(formatter: &'a Formatter, show_progress: bool) -> Self {
        Self {
            formatter,
            show_progress,
            rows: Vec::new(),
        }
    }

    /// Rows of the documents finished so far.
    pub fn rows(&self) -> &[JobRow] {
        &self.rows
    }
}

impl RunReporter for ConsoleReporter<'_> {
    fn document_started(&mut self, index: usize, total: usize, source: &Path) {
        if self.show_progress {
            eprint!("({}/{}) {} ...", index, total, source.display());
            let _ = std::io::stderr().flush();
        }
    }

    fn progress(&mut self, _index: usize, percent: u8) {
        if self.show_progress {
            eprint!(" {}%", percent);
            let _ = std::io::stderr().flush();
        }
    }

    fn document_finished(&mut self, index: usize, total: usize, job: &DocumentJob) {
        if self.show_progress {
            eprintln!();
            eprintln!("{}", self.formatter.document_line(index, total, job));
        }
        self.rows.push(JobRow::from(job));
    }
}

/// Execute a rename run over `files`.
pub fn execute_run(
    files: &[PathBuf],
    config: &AppConfig,
    formatter: &Formatter,
    show_progress: bool,
) -> Result<RunSummary> {
    let inputs = collect_inputs(files)?;
    let mode = config.document_mode()?;

    let llm = if config.ai.is_usable() {
        match config.ai.api_key() {
            Some(key) => match OpenRouterProvider::new(key, config.ai.openrouter.clone()) {
                Ok(provider) => Some(Arc::new(provider)),
                Err(e) => {
                    warn!("AI fallback unavailable: {}", e);
                    None
                }
            },
            None => None,
        }
    } else {
        None
    };

    let filer = FsFiler::new(config.filer.clone())?;
    let renamed_dir = filer.renamed_dir().to_path_buf();
    let failed_dir = filer.failed_dir().to_path_buf();

    let mut processor = DocumentProcessor::new(
        Arc::new(LopdfSource::new()),
        Arc::new(PopplerRenderer::new()),
        Arc::new(TesseractEngine::new(config.ocr_language.clone())),
        llm,
        filer,
        config.extractor.clone(),
        Capabilities::detect(),
    )?;
    if let Some(dir) = &config.debug_dir {
        fs::create_dir_all(dir)?;
        info!("Writing extracted text to {}", dir.display());
        processor = processor.with_debug_dir(dir);
    }

    let mut reporter = ConsoleReporter::new(formatter, show_progress);
    let summary = processor.process_all(&inputs, mode, &mut reporter);

    let rendered = formatter.format_rows(reporter.rows())?;
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
    println!("{}", formatter.summary(&summary, &renamed_dir, &failed_dir));
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_expands_to_sorted_pdfs() {
        let dir = TempDir::new().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let files = collect_inputs(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(files, vec![dir.path().join("a.PDF"), dir.path().join("b.pdf")]);
    }

    #[test]
    fn test_explicit_files_are_kept_in_order() {
        let dir = TempDir::new().unwrap();
        let second = dir.path().join("z.pdf");
        let first = dir.path().join("scan.tiff.pdf");
        fs::write(&second, b"x").unwrap();
        fs::write(&first, b"x").unwrap();

        let files = collect_inputs(&[second.clone(), first.clone()]).unwrap();
        assert_eq!(files, vec![second, first]);
    }

    #[test]
    fn test_missing_path_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = collect_inputs(&[dir.path().join("ghost.pdf")]).unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(collect_inputs(&[dir.path().to_path_buf()]), Err(CliError::InvalidInput(_))));
        assert!(matches!(collect_inputs(&[]), Err(CliError::InvalidInput(_))));
    }
}
