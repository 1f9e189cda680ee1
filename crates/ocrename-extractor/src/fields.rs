//! Pattern-based record extraction from document text

use crate::config::ExtractorConfig;
use crate::rules::{Rule, RuleKind, ACTA_RULES, AGE_LABELLED, AGE_LOOSE, ID_KEYWORDS, ID_RULES, TYPE_CODE};
use ocrename_domain::{ExtractedRecord, IdType};
use tracing::{debug, info, warn};

/// How the identity type of a record was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSource {
    /// Captured by a pattern rule
    Captured,
    /// Inferred from the patient's age
    Age(u32),
    /// No type and no age; the fallback type was used
    Default,
}

/// Outcome of running the cascades over one text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldReport {
    /// Extracted record, after type inference
    pub record: ExtractedRecord,
    /// Rule that produced the identity number
    pub id_rule: Option<&'static str>,
    /// Rule that produced the acta number
    pub acta_rule: Option<&'static str>,
    /// How the identity type was settled, when a number was found
    pub type_source: Option<TypeSource>,
}

/// Applies the ordered rule cascades to raw text
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    id_context_window: usize,
    age_context_window: usize,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(&ExtractorConfig::default())
    }
}

impl FieldExtractor {
    /// Create an extractor with the context windows of `config`
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            id_context_window: config.id_context_window,
            age_context_window: config.age_context_window,
        }
    }

    /// Extract `{id_type, id_number, acta_no}` from `text`
    pub fn extract(&self, text: &str) -> ExtractedRecord {
        self.extract_detailed(text).record
    }

    /// Extract a record and report which rules produced it
    pub fn extract_detailed(&self, text: &str) -> FieldReport {
        let mut report = FieldReport::default();
        if text.trim().is_empty() {
            debug!("No text for pattern extraction");
            return report;
        }

        let (identity, id_rule) = self.match_identity(text);
        report.record = identity;
        report.id_rule = id_rule;

        if report.record.id_number.is_some() {
            report.type_source = Some(if report.record.id_type.is_some() {
                TypeSource::Captured
            } else {
                match self.extract_age(text) {
                    Some(age) => {
                        let inferred = type_for_age(age);
                        info!("Inferred id_type '{}' from age {}", inferred, age);
                        report.record.id_type = Some(inferred);
                        TypeSource::Age(age)
                    }
                    None => {
                        warn!("No id_type and no age found, defaulting to '{}'", IdType::FALLBACK);
                        report.record.id_type = Some(IdType::FALLBACK);
                        TypeSource::Default
                    }
                }
            });
        } else {
            warn!("No id_number found; id_type left empty");
            report.record.id_type = None;
        }

        if let Some((acta, rule)) = self.match_acta(text) {
            report.record.acta_no = Some(acta);
            report.acta_rule = Some(rule);
        }

        debug!("Pattern extraction result: {}", report.record);
        report
    }

    /// Identity cascade only, without type inference.
    ///
    /// Returns the partial record and the name of the winning rule.
    pub fn match_identity(&self, text: &str) -> (ExtractedRecord, Option<&'static str>) {
        for rule in ID_RULES.iter() {
            let found = match rule.kind {
                RuleKind::Direct => direct_identity(rule, text),
                RuleKind::Contextual => self.contextual_identity(rule, text),
            };
            if let Some(record) = found {
                debug!(
                    "ID matched by rule '{}': type={:?}, number={:?}",
                    rule.name, record.id_type, record.id_number
                );
                return (record, Some(rule.name));
            }
        }
        (ExtractedRecord::default(), None)
    }

    /// Acta cascade; first matching rule wins
    pub fn match_acta(&self, text: &str) -> Option<(String, &'static str)> {
        for rule in ACTA_RULES.iter() {
            if let Some(number) = rule.pattern.captures(text).and_then(|c| c.name("number")) {
                debug!("Acta matched by rule '{}': {}", rule.name, number.as_str());
                return Some((number.as_str().to_string(), rule.name));
            }
        }
        debug!("No acta rule matched");
        None
    }

    /// Patient age, when the text states one
    pub fn extract_age(&self, text: &str) -> Option<u32> {
        if let Some(caps) = AGE_LABELLED.captures(text) {
            return caps["age"].parse().ok();
        }

        let caps = AGE_LOOSE.captures(text)?;
        let whole = caps.get(0)?;
        let before = char_window(text, whole.start(), whole.start(), self.age_context_window, 0);
        if before.to_uppercase().contains("EDAD") {
            return caps["age"].parse().ok();
        }
        None
    }

    fn contextual_identity(&self, rule: &Rule, text: &str) -> Option<ExtractedRecord> {
        for caps in rule.pattern.captures_iter(text) {
            let Some(number) = caps.name("number") else {
                continue;
            };
            let window = char_window(
                text,
                number.start(),
                number.end(),
                self.id_context_window,
                self.id_context_window,
            );
            if !ID_KEYWORDS.is_match(window) {
                continue;
            }

            let id_type = TYPE_CODE
                .captures(window)
                .and_then(|c| IdType::parse(&c["type"]));
            return Some(ExtractedRecord {
                id_type,
                id_number: Some(number.as_str().to_string()),
                acta_no: None,
            });
        }
        None
    }
}

fn direct_identity(rule: &Rule, text: &str) -> Option<ExtractedRecord> {
    let caps = rule.pattern.captures(text)?;
    let number = caps.name("number")?.as_str().to_string();
    let id_type = caps.name("type").and_then(|t| IdType::parse(t.as_str()));
    Some(ExtractedRecord {
        id_type,
        id_number: Some(number),
        acta_no: None,
    })
}

/// Identity type implied by the patient's age
pub fn type_for_age(age: u32) -> IdType {
    if age >= 18 {
        IdType::CC
    } else if age < 5 {
        IdType::RC
    } else {
        IdType::TI
    }
}

/// Slice of `text` spanning `before` characters ahead of byte `start` and
/// `after` characters past byte `end`
fn char_window(text: &str, start: usize, end: usize, before: usize, after: usize) -> &str {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(before)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let to = text[end..]
        .char_indices()
        .nth(after)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    &text[from..to]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> FieldExtractor {
        FieldExtractor::default()
    }

    #[test]
    fn test_labelled_identity_with_type() {
        let report = extractor().extract_detailed("Paciente X\nIdentificación: CC 12345678\n");
        assert_eq!(report.record.id_type, Some(IdType::CC));
        assert_eq!(report.record.id_number.as_deref(), Some("12345678"));
        assert_eq!(report.id_rule, Some("identificacion_label"));
        assert_eq!(report.type_source, Some(TypeSource::Captured));
    }

    #[test]
    fn test_labelled_identity_unaccented_lowercase_type() {
        let (record, rule) = extractor().match_identity("IDENTIFICACION ti-1098765432");
        assert_eq!(record.id_type, Some(IdType::TI));
        assert_eq!(record.id_number.as_deref(), Some("1098765432"));
        assert_eq!(rule, Some("identificacion_label"));
    }

    #[test]
    fn test_type_then_number() {
        let (record, rule) = extractor().match_identity("Usuario: CE: 4455667 Fecha");
        assert_eq!(record.id_type, Some(IdType::CE));
        assert_eq!(record.id_number.as_deref(), Some("4455667"));
        assert_eq!(rule, Some("type_then_number"));
    }

    #[test]
    fn test_nit_is_never_captured_as_type() {
        let (record, _) = extractor().match_identity("NIT 900123456 proveedor");
        assert_eq!(record.id_type, None);
        assert_eq!(record.id_number, None);
    }

    #[test]
    fn test_contextual_number_without_type() {
        let text = "DOCUMENTO del paciente 87654321 registrado";
        let (record, rule) = extractor().match_identity(text);
        assert_eq!(record.id_number.as_deref(), Some("87654321"));
        assert_eq!(record.id_type, None);
        assert_eq!(rule, Some("number_near_keyword"));
    }

    #[test]
    fn test_contextual_number_picks_type_from_window() {
        let text = "No. Doc tipo RC del menor 55667788";
        let (record, rule) = extractor().match_identity(text);
        assert_eq!(rule, Some("number_near_keyword"));
        assert_eq!(record.id_type, Some(IdType::RC));
    }

    #[test]
    fn test_contextual_number_too_far_from_keyword() {
        let padding = "x".repeat(80);
        let text = format!("DOCUMENTO {} 87654321", padding);
        let (record, _) = extractor().match_identity(&text);
        assert_eq!(record.id_number, None);
    }

    #[test]
    fn test_window_counts_characters_not_bytes() {
        // 60 two-byte characters: within 70 chars, beyond 70 bytes
        let padding = "ñ".repeat(60);
        let text = format!("DOCUMENTO{} 87654321", padding);
        let (record, _) = extractor().match_identity(&text);
        assert_eq!(record.id_number.as_deref(), Some("87654321"));
    }

    #[test]
    fn test_age_inference() {
        let fx = extractor();
        let record = fx.extract("DOCUMENTO 87654321 Edad: 45 AÑOS");
        assert_eq!(record.id_type, Some(IdType::CC));

        let report = fx.extract_detailed("DOCUMENTO 87654321 3 años");
        assert_eq!(report.record.id_type, Some(IdType::RC));
        assert_eq!(report.type_source, Some(TypeSource::Age(3)));

        let record = fx.extract("DOCUMENTO 87654321 10 ANOS");
        assert_eq!(record.id_type, Some(IdType::TI));
    }

    #[test]
    fn test_age_boundaries() {
        assert_eq!(type_for_age(18), IdType::CC);
        assert_eq!(type_for_age(17), IdType::TI);
        assert_eq!(type_for_age(5), IdType::TI);
        assert_eq!(type_for_age(4), IdType::RC);
        assert_eq!(type_for_age(0), IdType::RC);
    }

    #[test]
    fn test_default_type_without_age() {
        let report = extractor().extract_detailed("DOCUMENTO 87654321");
        assert_eq!(report.record.id_type, Some(IdType::CC));
        assert_eq!(report.type_source, Some(TypeSource::Default));
    }

    #[test]
    fn test_no_number_means_no_type() {
        let report = extractor().extract_detailed("Edad: 45 AÑOS, tipo CC, sin número");
        assert_eq!(report.record.id_number, None);
        assert_eq!(report.record.id_type, None);
        assert_eq!(report.type_source, None);
    }

    #[test]
    fn test_loose_age_needs_edad_nearby() {
        let fx = extractor();
        assert_eq!(fx.extract_age("EDAD del paciente: 45 AÑOSX"), Some(45));
        assert_eq!(fx.extract_age("paciente 45 AÑOSX"), None);
    }

    #[test]
    fn test_acta_cascade_order() {
        let fx = extractor();
        let text = "Entrega No. 111\nFórmula Médica Nro. 222\nActa de Entrega No. 333";
        assert_eq!(fx.match_acta(text), Some(("333".to_string(), "acta_de_entrega")));

        assert_eq!(
            fx.match_acta("Formula Medica Nro 222 y RECIBO 9"),
            Some(("222".to_string(), "formula_medica"))
        );
        assert_eq!(
            fx.match_acta("AUTORIZACION N°: 7788"),
            Some(("7788".to_string(), "orden_autorizacion"))
        );
        assert_eq!(fx.match_acta("RECIBO. 42"), Some(("42".to_string(), "entrega_recibo")));
        assert_eq!(fx.match_acta("sin control"), None);
    }

    #[test]
    fn test_empty_text() {
        assert!(extractor().extract("   ").is_empty());
    }

    #[test]
    fn test_full_printed_acta() {
        let text = "Identificación CC 12345678\nPaciente: Ana\nActa de Entrega No. 4567";
        let record = extractor().extract(text);
        assert_eq!(record, ExtractedRecord::new(IdType::CC, "12345678", "4567"));
    }

    #[test]
    fn test_char_window() {
        let text = "abcdefXYZghijk";
        let start = text.find("XYZ").unwrap();
        assert_eq!(char_window(text, start, start + 3, 2, 2), "efXYZgh");
        assert_eq!(char_window(text, start, start + 3, 100, 100), text);
    }
}
