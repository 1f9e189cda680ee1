//! Per-document job lifecycle

use crate::acquire::TextAcquirer;
use crate::ai::AiFallback;
use crate::config::{Capabilities, ExtractorConfig};
use crate::error::ExtractorError;
use crate::fields::FieldExtractor;
use crate::handwriting::HandwritingExtractor;
use crate::merger::RecordMerger;
use image::DynamicImage;
use ocrename_domain::traits::{Filer, LlmProvider, OcrEngine, PageRenderer, TextSource};
use ocrename_domain::{DocumentJob, DocumentMode, ExtractionMethod, FailureReason, Outcome};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Observer of a processing run
pub trait RunReporter {
    /// A document is about to be processed (`index` starts at 1)
    fn document_started(&mut self, _index: usize, _total: usize, _source: &Path) {}

    /// Page-level progress of the current document, 0-100
    fn progress(&mut self, _index: usize, _percent: u8) {}

    /// A document reached its outcome
    fn document_finished(&mut self, _index: usize, _total: usize, _job: &DocumentJob) {}
}

impl RunReporter for () {}

/// Counts of a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Documents copied under a new name
    pub renamed: usize,
    /// Documents routed to the failed bucket
    pub failed: usize,
}

impl RunSummary {
    /// Account for a finished job
    pub fn record(&mut self, job: &DocumentJob) {
        if job.is_renamed() {
            self.renamed += 1;
        } else {
            self.failed += 1;
        }
    }

    /// Documents processed
    pub fn total(&self) -> usize {
        self.renamed + self.failed
    }
}

/// Drives one document at a time from text acquisition to filing
pub struct DocumentProcessor<S, R, O, L, F>
where
    S: TextSource,
    R: PageRenderer,
    O: OcrEngine,
    L: LlmProvider,
    F: Filer,
{
    acquirer: TextAcquirer<S, R, O>,
    renderer: Arc<R>,
    merger: RecordMerger<O, L>,
    filer: F,
    render_dpi: u32,
    debug_dir: Option<PathBuf>,
}

impl<S, R, O, L, F> DocumentProcessor<S, R, O, L, F>
where
    S: TextSource,
    R: PageRenderer,
    O: OcrEngine,
    L: LlmProvider,
    F: Filer,
{
    /// Assemble a processor from its collaborators.
    ///
    /// `llm` is `None` when no language model is configured.
    pub fn new(
        source: Arc<S>,
        renderer: Arc<R>,
        ocr: Arc<O>,
        llm: Option<Arc<L>>,
        filer: F,
        config: ExtractorConfig,
        caps: Capabilities,
    ) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        let ai = match llm {
            Some(provider) => AiFallback::new(provider),
            None => AiFallback::disabled(),
        };
        if !ai.text_available() && !ai.vision_available() {
            warn!("AI fallback disabled: no API key or model configured");
        }

        let merger = RecordMerger::new(
            FieldExtractor::new(&config),
            HandwritingExtractor::new(ocr.clone(), config.clone(), caps),
            ai,
        );
        let render_dpi = config.render_dpi;
        let acquirer = TextAcquirer::new(source, renderer.clone(), ocr, config, caps);

        Ok(Self {
            acquirer,
            renderer,
            merger,
            filer,
            render_dpi,
            debug_dir: None,
        })
    }

    /// Dump the acquired text of every document into `dir`
    pub fn with_debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }

    /// Process every file in order, reporting to `reporter`
    pub fn process_all(&self, files: &[PathBuf], mode: DocumentMode, reporter: &mut dyn RunReporter) -> RunSummary {
        let total = files.len();
        let mut summary = RunSummary::default();
        info!("Processing {} documents in {} mode", total, mode);

        for (offset, file) in files.iter().enumerate() {
            let index = offset + 1;
            reporter.document_started(index, total, file);
            let job = {
                let mut progress = |percent: u8| reporter.progress(index, percent);
                self.process(file, mode, &mut progress)
            };
            summary.record(&job);
            reporter.document_finished(index, total, &job);
        }

        info!("Run finished: {} renamed, {} failed", summary.renamed, summary.failed);
        summary
    }

    /// Process one document to its outcome
    pub fn process(&self, source: &Path, mode: DocumentMode, progress: &mut dyn FnMut(u8)) -> DocumentJob {
        let mut job = DocumentJob::new(source, mode);
        let filename = job.file_name();
        info!("Processing '{}' ({} mode)", filename, mode);

        let acquisition = self.acquirer.acquire(source, progress);
        job.method = Some(acquisition.method);
        job.raw_text = acquisition.text;
        info!("'{}' text method: {}", filename, acquisition.method);

        self.dump_text(&filename, acquisition.method, job.raw_text.as_deref());

        if acquisition.method == ExtractionMethod::OcrNotInitialized {
            return self.fail(job, FailureReason::OcrNotInitialized);
        }
        if job.raw_text.is_none() && !mode.tolerates_missing_text() {
            return self.fail(job, FailureReason::NoText(acquisition.method));
        }

        let first_page = match mode {
            DocumentMode::HandwrittenCorner => self.first_page(source),
            DocumentMode::Printed => None,
        };

        let merged = self
            .merger
            .merge(mode, job.raw_text.as_deref(), first_page.as_ref(), &filename);
        job.record = merged.record;
        job.provenance = merged.provenance;

        let Some(new_name) = self.filer.build_filename(&job.record, &job.extension()) else {
            return self.fail(job, FailureReason::MissingIdNumber);
        };
        job.filename = Some(new_name.clone());

        match self.filer.rename(source, &new_name) {
            Ok(destination) => {
                info!("'{}' renamed to '{}'", filename, destination.display());
                job.outcome = Some(Outcome::Renamed { destination });
            }
            Err(e) => {
                error!("Could not write renamed copy of '{}': {}", filename, e);
                job.outcome = Some(Outcome::Failed {
                    reason: FailureReason::RenameFailed(e.to_string()),
                    moved_to: None,
                });
            }
        }
        job
    }

    fn first_page(&self, source: &Path) -> Option<DynamicImage> {
        match self.renderer.render_first_page(source, self.render_dpi) {
            Ok(Some(page)) => Some(page),
            Ok(None) => {
                warn!("{} has no pages to render", source.display());
                None
            }
            Err(e) => {
                error!("Rendering first page of {} failed: {}", source.display(), e);
                None
            }
        }
    }

    fn fail(&self, mut job: DocumentJob, reason: FailureReason) -> DocumentJob {
        warn!("'{}' failed: {}", job.file_name(), reason);
        let moved_to = match self.filer.move_to_failed(&job.source) {
            Ok(path) => Some(path),
            Err(e) => {
                error!("Could not move '{}' to the failed folder: {}", job.file_name(), e);
                None
            }
        };
        job.outcome = Some(Outcome::Failed { reason, moved_to });
        job
    }

    fn dump_text(&self, filename: &str, method: ExtractionMethod, text: Option<&str>) {
        let Some(dir) = &self.debug_dir else {
            return;
        };
        let path = dir.join(debug_dump_name(filename, method));
        match std::fs::write(&path, text.unwrap_or(EMPTY_DUMP)) {
            Ok(()) => debug!("Text of '{}' written to {}", filename, path.display()),
            Err(e) => warn!("Could not write debug text {}: {}", path.display(), e),
        }
    }
}

/// Debug dump content when no text was obtained
pub const EMPTY_DUMP: &str = "(Vacio)";

/// Name of the debug text dump of `filename`
pub fn debug_dump_name(filename: &str, method: ExtractionMethod) -> String {
    format!("debug_{}_output_{}.txt", method.tag(), filename.replace('.', "_"))
}
