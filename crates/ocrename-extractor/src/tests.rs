//! End-to-end scenarios for the extractor pipeline

use crate::{Capabilities, DocumentProcessor, ExtractorConfig, FieldExtractor, RunReporter};
use image::{DynamicImage, RgbImage};
use ocrename_domain::traits::{EmbeddedText, Filer, OcrEngine, PageRenderer, RecognizeOptions, TextSource};
use ocrename_domain::{
    DocumentJob, DocumentMode, ExtractedRecord, ExtractionMethod, FailureReason, IdType, Outcome, Stage,
};
use ocrename_filer::{FilerConfig, FsFiler};
use ocrename_llm::MockProvider;
use proptest::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

struct FakeSource(Vec<String>);

impl TextSource for FakeSource {
    type Error = String;

    fn read_text(&self, _document: &Path, _password: Option<&str>) -> Result<EmbeddedText, String> {
        Ok(EmbeddedText {
            pages: self.0.clone(),
            was_encrypted: false,
        })
    }
}

struct FakeRenderer;

impl PageRenderer for FakeRenderer {
    type Error = String;

    fn render_pages(&self, _document: &Path, _dpi: u32) -> Result<Vec<DynamicImage>, String> {
        Ok(vec![DynamicImage::ImageRgb8(RgbImage::new(100, 140))])
    }
}

struct FakeOcr {
    ready: bool,
    paragraphs: Vec<String>,
    digits: Vec<String>,
}

impl OcrEngine for FakeOcr {
    type Error = String;

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn recognize(&self, _image: &DynamicImage, options: RecognizeOptions) -> Result<Vec<String>, String> {
        if options.digits_only {
            Ok(self.digits.clone())
        } else {
            Ok(self.paragraphs.clone())
        }
    }
}

struct BrokenFiler;

impl Filer for BrokenFiler {
    type Error = String;

    fn build_filename(&self, record: &ExtractedRecord, ext: &str) -> Option<String> {
        ocrename_filer::build_filename(record, ext, "DESCONOCIDO")
    }

    fn rename(&self, _original: &Path, _new_name: &str) -> Result<PathBuf, String> {
        Err("disk full".to_string())
    }

    fn move_to_failed(&self, original: &Path) -> Result<PathBuf, String> {
        Err(format!("should not move {}", original.display()))
    }
}

/// Inputs of one simulated document
struct Scenario {
    embedded: Vec<String>,
    ocr_ready: bool,
    paragraphs: Vec<String>,
    digits: Vec<String>,
    llm: Option<Arc<MockProvider>>,
}

impl Scenario {
    fn embedded(text: &str) -> Self {
        Self {
            embedded: vec![text.to_string()],
            ocr_ready: true,
            paragraphs: Vec::new(),
            digits: Vec::new(),
            llm: None,
        }
    }

    fn scanned() -> Self {
        Self::embedded("")
    }

    fn digits(mut self, digits: &str) -> Self {
        self.digits = vec![digits.to_string()];
        self
    }

    fn llm(mut self, provider: &Arc<MockProvider>) -> Self {
        self.llm = Some(provider.clone());
        self
    }

    fn ocr_not_ready(mut self) -> Self {
        self.ocr_ready = false;
        self
    }

    fn processor<F: Filer>(self, filer: F) -> DocumentProcessor<FakeSource, FakeRenderer, FakeOcr, MockProvider, F> {
        let ocr = FakeOcr {
            ready: self.ocr_ready,
            paragraphs: self.paragraphs,
            digits: self.digits,
        };
        DocumentProcessor::new(
            Arc::new(FakeSource(self.embedded)),
            Arc::new(FakeRenderer),
            Arc::new(ocr),
            self.llm,
            filer,
            ExtractorConfig::default(),
            Capabilities::none(),
        )
        .unwrap()
    }

    /// Run the scenario against a real filer in a temporary directory
    fn run(self, mode: DocumentMode) -> (TempDir, FsFiler, DocumentJob) {
        let dir = TempDir::new().unwrap();
        let filer = FsFiler::new(FilerConfig::with_output_base(dir.path().join("out"))).unwrap();
        let source = write_input(&dir, "scan.pdf");

        let job = self.processor(filer.clone()).process(&source, mode, &mut |_| {});
        (dir, filer, job)
    }
}

fn write_input(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, b"%PDF-1.4 test").unwrap();
    path
}

const PRINTED_TEXT: &str = "ACTA DE ENTREGA DE MEDICAMENTOS\n\
    Paciente: JUAN PEREZ Identificación CC 12345678 Edad 45 AÑOS\n\
    Acta de Entrega No. 4567 Fecha 2024-03-01";

const PRINTED_WITHOUT_ACTA: &str = "FORMULA DE MEDICAMENTOS PARA EL PACIENTE\n\
    Identificación CC 12345678 Edad 45 AÑOS Dispensado por farmacia";

fn stage_labels(job: &DocumentJob) -> String {
    job.provenance.to_string()
}

#[test]
fn test_printed_document_end_to_end() {
    let (_dir, filer, job) = Scenario::embedded(PRINTED_TEXT).run(DocumentMode::Printed);

    assert_eq!(job.method, Some(ExtractionMethod::Direct));
    assert_eq!(job.record, ExtractedRecord::new(IdType::CC, "12345678", "4567"));
    assert_eq!(stage_labels(&job), "PrintedRegex");
    assert_eq!(job.filename.as_deref(), Some("CC_12345678_4567.pdf"));
    assert_eq!(
        job.outcome,
        Some(Outcome::Renamed {
            destination: filer.renamed_dir().join("CC_12345678_4567.pdf")
        })
    );
    assert!(job.source.exists());
}

#[test]
fn test_handwritten_scan_uses_corner_digits_only() {
    let (_dir, filer, job) = Scenario::scanned().digits("98765").run(DocumentMode::HandwrittenCorner);

    assert_eq!(job.method, Some(ExtractionMethod::OcrEmptyPage));
    assert_eq!(job.record.acta_no.as_deref(), Some("98765"));
    assert_eq!(job.record.id_number, None);
    assert_eq!(job.record.id_type, None);
    assert_eq!(stage_labels(&job), "NoTextForRegex+HandwrittenROI");
    assert_eq!(
        job.outcome,
        Some(Outcome::Failed {
            reason: FailureReason::MissingIdNumber,
            moved_to: Some(filer.failed_dir().join("scan.pdf")),
        })
    );
    assert!(!job.source.exists());
}

#[test]
fn test_handwriting_overrides_printed_acta() {
    let text = "Identificación CC 12345678 Edad 45 AÑOS Acta de Entrega No. 999 entregado al paciente";
    let provider = Arc::new(MockProvider::new("{}"));
    let (_dir, _filer, job) = Scenario::embedded(text)
        .digits("12345")
        .llm(&provider)
        .run(DocumentMode::HandwrittenCorner);

    assert_eq!(job.record, ExtractedRecord::new(IdType::CC, "12345678", "12345"));
    assert_eq!(stage_labels(&job), "PrintedRegex+HandwrittenROI");
    assert_eq!(provider.vision_calls(), 0);
    assert_eq!(provider.text_calls(), 0);
    assert!(job.is_renamed());
}

#[test]
fn test_invalid_corner_digits_are_ignored() {
    let text = "Identificación CC 12345678 Edad 45 AÑOS Acta de Entrega No. 999 entregado al paciente";
    let (_dir, _filer, job) = Scenario::embedded(text).digits("12345678").run(DocumentMode::HandwrittenCorner);

    assert_eq!(job.record.acta_no.as_deref(), Some("999"));
    assert!(!job.provenance.contains(Stage::HandwrittenRoi));
}

#[test]
fn test_printed_text_ai_only_fills_gaps() {
    let provider = Arc::new(MockProvider::new(
        r#"{"id_type": "TI", "id_number": "99999999", "acta_no": "4567"}"#,
    ));
    let (_dir, _filer, job) = Scenario::embedded(PRINTED_WITHOUT_ACTA)
        .llm(&provider)
        .run(DocumentMode::Printed);

    assert_eq!(job.record, ExtractedRecord::new(IdType::CC, "12345678", "4567"));
    assert_eq!(stage_labels(&job), "PrintedRegex+TextAIComplement");
    assert_eq!(provider.text_calls(), 1);
    assert_eq!(provider.vision_calls(), 0);
}

#[test]
fn test_vision_overrides_existing_fields() {
    let provider = Arc::new(MockProvider::new(
        r#"{"id_type": "CC", "id_number": "87654321", "acta_no": "4321"}"#,
    ));
    let (_dir, _filer, job) = Scenario::embedded(PRINTED_WITHOUT_ACTA)
        .digits("12")
        .llm(&provider)
        .run(DocumentMode::HandwrittenCorner);

    assert_eq!(job.record, ExtractedRecord::new(IdType::CC, "87654321", "4321"));
    assert_eq!(stage_labels(&job), "PrintedRegex+VisionAI");
    assert_eq!(provider.vision_calls(), 1);
    assert_eq!(provider.text_calls(), 0);
    assert_eq!(job.filename.as_deref(), Some("CC_87654321_4321.pdf"));
}

#[test]
fn test_vision_then_text_complement() {
    let provider = Arc::new(MockProvider::default());
    provider.push_response(r#"{"id_type": null, "id_number": "87654321", "acta_no": null}"#);
    provider.push_response(r#"{"id_type": "TI", "id_number": "1", "acta_no": "555"}"#);

    let (_dir, _filer, job) = Scenario::embedded(PRINTED_WITHOUT_ACTA)
        .llm(&provider)
        .run(DocumentMode::HandwrittenCorner);

    assert_eq!(job.record, ExtractedRecord::new(IdType::CC, "87654321", "555"));
    assert_eq!(stage_labels(&job), "PrintedRegex+VisionAI+TextAIComplement");
}

#[test]
fn test_printed_without_text_fails_without_fallback() {
    let provider = Arc::new(MockProvider::new(
        r#"{"id_type": "CC", "id_number": "12345678", "acta_no": "1"}"#,
    ));
    let (_dir, filer, job) = Scenario::scanned().digits("98765").llm(&provider).run(DocumentMode::Printed);

    assert_eq!(
        job.outcome,
        Some(Outcome::Failed {
            reason: FailureReason::NoText(ExtractionMethod::OcrEmptyPage),
            moved_to: Some(filer.failed_dir().join("scan.pdf")),
        })
    );
    assert_eq!(provider.text_calls() + provider.vision_calls(), 0);
    assert!(job.record.is_empty());
}

#[test]
fn test_ocr_not_initialized_fails_in_both_modes() {
    for mode in [DocumentMode::Printed, DocumentMode::HandwrittenCorner] {
        let (_dir, _filer, job) = Scenario::scanned().digits("98765").ocr_not_ready().run(mode);

        assert_eq!(job.method, Some(ExtractionMethod::OcrNotInitialized));
        assert!(matches!(
            job.outcome,
            Some(Outcome::Failed { reason: FailureReason::OcrNotInitialized, .. })
        ));
    }
}

#[test]
fn test_type_defaults_when_ai_gives_bare_number() {
    let provider = Arc::new(MockProvider::new(
        r#"{"id_type": null, "id_number": "55555555", "acta_no": null}"#,
    ));
    let (_dir, _filer, job) = Scenario::scanned()
        .llm(&provider)
        .run(DocumentMode::HandwrittenCorner);

    assert_eq!(job.record.id_type, Some(IdType::CC));
    assert_eq!(job.filename.as_deref(), Some("CC_55555555_DESCONOCIDO.pdf"));
    assert_eq!(stage_labels(&job), "NoTextForRegex+VisionAI");
}

#[test]
fn test_rename_failure_keeps_original_in_place() {
    let dir = TempDir::new().unwrap();
    let source = write_input(&dir, "scan.pdf");
    let job = Scenario::embedded(PRINTED_TEXT)
        .processor(BrokenFiler)
        .process(&source, DocumentMode::Printed, &mut |_| {});

    assert_eq!(
        job.outcome,
        Some(Outcome::Failed {
            reason: FailureReason::RenameFailed("disk full".to_string()),
            moved_to: None,
        })
    );
    assert!(source.exists());
}

#[test]
fn test_debug_dump_is_written() {
    let dir = TempDir::new().unwrap();
    let filer = FsFiler::new(FilerConfig::with_output_base(dir.path().join("out"))).unwrap();
    let source = write_input(&dir, "scan.01.pdf");
    let dumps = dir.path().join("debug");
    fs::create_dir_all(&dumps).unwrap();

    let processor = Scenario::embedded(PRINTED_TEXT).processor(filer).with_debug_dir(&dumps);
    processor.process(&source, DocumentMode::Printed, &mut |_| {});

    let dump = dumps.join("debug_directo_output_scan_01_pdf.txt");
    assert_eq!(fs::read_to_string(dump).unwrap(), PRINTED_TEXT);
}

#[test]
fn test_debug_dump_marks_scans_without_text() {
    let dir = TempDir::new().unwrap();
    let filer = FsFiler::new(FilerConfig::with_output_base(dir.path().join("out"))).unwrap();
    let source = write_input(&dir, "blank.pdf");
    let dumps = dir.path().join("debug");
    fs::create_dir_all(&dumps).unwrap();

    let processor = Scenario::scanned().processor(filer).with_debug_dir(&dumps);
    let job = processor.process(&source, DocumentMode::Printed, &mut |_| {});
    assert_eq!(job.method, Some(ExtractionMethod::OcrEmptyPage));

    let dump = dumps.join("debug_ocr_pagina_vacia_output_blank_pdf.txt");
    assert_eq!(fs::read_to_string(dump).unwrap(), crate::EMPTY_DUMP);
}

#[derive(Default)]
struct CountingReporter {
    started: Vec<usize>,
    finished: usize,
    last_percent: u8,
}

impl RunReporter for CountingReporter {
    fn document_started(&mut self, index: usize, _total: usize, _source: &Path) {
        self.started.push(index);
    }

    fn progress(&mut self, _index: usize, percent: u8) {
        self.last_percent = percent;
    }

    fn document_finished(&mut self, _index: usize, _total: usize, _job: &DocumentJob) {
        self.finished += 1;
    }
}

#[test]
fn test_process_all_continues_after_failures() {
    let dir = TempDir::new().unwrap();
    let filer = FsFiler::new(FilerConfig::with_output_base(dir.path().join("out"))).unwrap();
    let files = vec![
        write_input(&dir, "one.pdf"),
        dir.path().join("missing.pdf"),
        write_input(&dir, "three.pdf"),
    ];

    let processor = Scenario::embedded(PRINTED_TEXT).processor(filer.clone());
    let mut reporter = CountingReporter::default();
    let summary = processor.process_all(&files, DocumentMode::Printed, &mut reporter);

    assert_eq!(summary.renamed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(reporter.started, vec![1, 2, 3]);
    assert_eq!(reporter.finished, 3);
    assert_eq!(reporter.last_percent, 100);
    assert!(filer.renamed_dir().join("CC_12345678_4567_1.pdf").exists());
}

#[test]
fn test_unit_reporter_is_silent() {
    let dir = TempDir::new().unwrap();
    let filer = FsFiler::new(FilerConfig::with_output_base(dir.path().join("out"))).unwrap();
    let files = vec![write_input(&dir, "one.pdf")];

    let summary = Scenario::embedded(PRINTED_TEXT)
        .processor(filer)
        .process_all(&files, DocumentMode::Printed, &mut ());
    assert_eq!(summary.total(), 1);
}

#[test]
fn test_invalid_config_is_rejected() {
    let result = DocumentProcessor::new(
        Arc::new(FakeSource(Vec::new())),
        Arc::new(FakeRenderer),
        Arc::new(FakeOcr {
            ready: true,
            paragraphs: Vec::new(),
            digits: Vec::new(),
        }),
        None::<Arc<MockProvider>>,
        BrokenFiler,
        ExtractorConfig {
            render_dpi: 0,
            ..Default::default()
        },
        Capabilities::none(),
    );
    assert!(matches!(result, Err(crate::ExtractorError::Config(_))));
}

proptest! {
    #[test]
    fn prop_identificacion_label_captures_type_and_number(
        prefix in "[a-z ]{0,40}",
        suffix in "[a-z ]{0,40}",
        number in "[1-9][0-9]{5,11}",
    ) {
        let text = format!("{} Identificación CC {} {}", prefix, number, suffix);
        let record = FieldExtractor::default().extract(&text);
        prop_assert_eq!(record.id_type, Some(IdType::CC));
        prop_assert_eq!(record.id_number, Some(number));
    }

    #[test]
    fn prop_number_near_documento_has_no_type_before_inference(
        filler in "[fgh ]{0,30}",
        number in "[1-9][0-9]{7}",
    ) {
        let text = format!("DOCUMENTO {} {} {}", filler, number, filler);
        let (record, rule) = FieldExtractor::default().match_identity(&text);
        prop_assert_eq!(record.id_number, Some(number));
        prop_assert_eq!(record.id_type, None);
        prop_assert_eq!(rule, Some("number_near_keyword"));
    }

    #[test]
    fn prop_no_number_means_no_type(age in 0u32..120, filler in "[a-z ]{0,30}") {
        let text = format!("Paciente {} Edad {} AÑOS", filler, age);
        let record = FieldExtractor::default().extract(&text);
        prop_assert_eq!(record.id_number, None);
        prop_assert_eq!(record.id_type, None);
    }
}
