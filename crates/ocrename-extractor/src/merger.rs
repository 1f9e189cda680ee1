//! Stage ordering and merge policy
//!
//! Pattern extraction always runs first. In handwritten-corner mode the
//! corner digits then override the acta number and the vision model may
//! correct any field. In both modes the text model finally fills whatever
//! is still missing, without touching resolved fields.

use crate::ai::AiFallback;
use crate::fields::FieldExtractor;
use crate::handwriting::HandwritingExtractor;
use image::DynamicImage;
use ocrename_domain::traits::{LlmProvider, OcrEngine};
use ocrename_domain::{DocumentMode, ExtractedRecord, Field, IdType, Provenance, Stage};
use tracing::{debug, info, warn};

/// How a stage's answer is combined with the record built so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Only absent fields are taken from the incoming record
    FillGaps,
    /// Every field present in the incoming record replaces the current value
    Override,
}

impl MergeStrategy {
    /// Merge `incoming` into `target`, returning the fields whose value changed
    pub fn apply(&self, target: &mut ExtractedRecord, incoming: &ExtractedRecord) -> Vec<Field> {
        let mut changed = Vec::new();
        for field in Field::ALL {
            if *self == MergeStrategy::FillGaps && target.has(field) {
                continue;
            }
            if target.set_from(incoming, field) {
                changed.push(field);
            }
        }
        changed
    }
}

/// Final record of a document and the stages that shaped it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Merged record
    pub record: ExtractedRecord,
    /// Stages that changed the record, in order
    pub provenance: Provenance,
}

/// Runs the extraction stages in policy order and merges their answers
pub struct RecordMerger<O: OcrEngine, L: LlmProvider> {
    fields: FieldExtractor,
    handwriting: HandwritingExtractor<O>,
    ai: AiFallback<L>,
}

impl<O: OcrEngine, L: LlmProvider> RecordMerger<O, L> {
    /// Create a merger over the three extraction stages
    pub fn new(fields: FieldExtractor, handwriting: HandwritingExtractor<O>, ai: AiFallback<L>) -> Self {
        Self {
            fields,
            handwriting,
            ai,
        }
    }

    /// Language-model fallback used by this merger
    pub fn ai(&self) -> &AiFallback<L> {
        &self.ai
    }

    /// Build the record of one document.
    ///
    /// `text` is the acquired document text, `first_page` the rendered
    /// first page (only consulted in handwritten-corner mode).
    pub fn merge(
        &self,
        mode: DocumentMode,
        text: Option<&str>,
        first_page: Option<&DynamicImage>,
        filename: &str,
    ) -> MergeOutcome {
        let mut provenance = Provenance::for_text(text.is_some());
        let mut record = match text {
            Some(text) => self.fields.extract(text),
            None => ExtractedRecord::default(),
        };
        info!("'{}' after pattern rules: {}", filename, record);

        if mode == DocumentMode::HandwrittenCorner {
            match first_page {
                Some(page) => self.image_stages(page, filename, &mut record, &mut provenance),
                None => warn!("No first page image for '{}', skipping image stages", filename),
            }
        }

        if !record.is_complete() {
            self.text_stage(text, filename, &mut record, &mut provenance);
        }

        if record.apply_type_fallback() {
            info!("'{}' has no id_type, using '{}'", filename, IdType::FALLBACK);
        }

        info!("'{}' final record {} via {}", filename, record, provenance);
        MergeOutcome { record, provenance }
    }

    fn image_stages(
        &self,
        page: &DynamicImage,
        filename: &str,
        record: &mut ExtractedRecord,
        provenance: &mut Provenance,
    ) {
        if let Some(number) = self.handwriting.extract(page) {
            let incoming = ExtractedRecord {
                acta_no: Some(number),
                ..Default::default()
            };
            if !MergeStrategy::Override.apply(record, &incoming).is_empty() {
                info!("'{}' acta_no taken from handwriting: {}", filename, record.acta_no.as_deref().unwrap_or("-"));
                provenance.push(Stage::HandwrittenRoi);
            }
        }

        if record.is_complete() {
            return;
        }
        if !self.ai.vision_available() {
            debug!("Vision model unavailable, '{}' stays incomplete", filename);
            return;
        }

        info!("'{}' incomplete ({:?} missing), asking the vision model", filename, record.missing_fields());
        if let Some(answer) = self.ai.vision_query(page, filename) {
            let changed = MergeStrategy::Override.apply(record, &answer);
            if !changed.is_empty() {
                debug!("Vision model changed {:?}", changed);
                provenance.push(Stage::VisionAi);
            }
        }
    }

    fn text_stage(&self, text: Option<&str>, filename: &str, record: &mut ExtractedRecord, provenance: &mut Provenance) {
        let Some(text) = text else {
            info!("No document text for '{}', skipping the text model", filename);
            return;
        };
        if !self.ai.text_available() {
            debug!("Text model unavailable, '{}' stays incomplete", filename);
            return;
        }

        info!("'{}' incomplete ({:?} missing), asking the text model", filename, record.missing_fields());
        if let Some(answer) = self.ai.text_query(text, filename) {
            let filled = MergeStrategy::FillGaps.apply(record, &answer);
            if !filled.is_empty() {
                debug!("Text model filled {:?}", filled);
                provenance.push(Stage::TextAiComplement);
            }
        }
    }
}
