//! Ordered pattern rules for field extraction
//!
//! Each field is recovered by a cascade of rules tried in ascending
//! priority; the first rule that yields a value wins. The tables are plain
//! data so the cascade order can be inspected and tested directly.

use ocrename_domain::Field;
use once_cell::sync::Lazy;
use regex::Regex;

/// Identity types that may be captured from text. NIT is deliberately absent.
pub const CAPTURABLE_TYPES: &str = "CC|TI|CE|PA|RC";

/// How a rule's match is turned into a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// First match wins; captures `number` and optionally `type`
    Direct,
    /// Every match is a candidate, accepted only when an ID keyword
    /// appears in the surrounding window
    Contextual,
}

/// One step of a field cascade
#[derive(Debug)]
pub struct Rule {
    /// Stable name, used in logs and tests
    pub name: &'static str,
    /// Field the rule fills
    pub field: Field,
    /// Lower runs first
    pub priority: u8,
    /// Match semantics
    pub kind: RuleKind,
    /// Pattern with a `number` group and an optional `type` group
    pub pattern: Regex,
}

fn rule(name: &'static str, field: Field, priority: u8, kind: RuleKind, pattern: &str) -> Rule {
    Rule {
        name,
        field,
        priority,
        kind,
        pattern: Regex::new(pattern).expect("rule pattern must compile"),
    }
}

/// Cascade for the identity number (and, opportunistically, its type)
pub static ID_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    let mut rules = vec![
        rule(
            "identificacion_label",
            Field::IdNumber,
            1,
            RuleKind::Direct,
            &format!(
                r"(?i)Identificaci[oó]n\s*[:\-]?\s*(?:(?P<type>{})\s*[:\-]?\s*)?(?P<number>\d{{6,12}})\b",
                CAPTURABLE_TYPES
            ),
        ),
        rule(
            "type_then_number",
            Field::IdNumber,
            2,
            RuleKind::Direct,
            &format!(
                r"(?i)\b(?P<type>{})\s*[:\-]?\s*(?P<number>\d{{6,12}})\b",
                CAPTURABLE_TYPES
            ),
        ),
        rule(
            "number_near_keyword",
            Field::IdNumber,
            3,
            RuleKind::Contextual,
            r"\b(?P<number>\d{6,10})\b",
        ),
    ];
    rules.sort_by_key(|r| r.priority);
    rules
});

/// Cascade for the acta / control number
pub static ACTA_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    let mut rules = vec![
        rule(
            "acta_de_entrega",
            Field::ActaNo,
            1,
            RuleKind::Direct,
            r"(?i)Acta\s*de\s*Entrega\s*No\.?\s*(?P<number>\d+)",
        ),
        rule(
            "formula_medica",
            Field::ActaNo,
            2,
            RuleKind::Direct,
            r"(?i)F[oó]rmula\s*M[eé]dica\s*Nro\.?\s*(?P<number>\d+)",
        ),
        rule(
            "orden_autorizacion",
            Field::ActaNo,
            3,
            RuleKind::Direct,
            r"(?i)(?:ORDEN|AUTORIZACION)\s*N[°oº.]*[:\s]*(?P<number>\d+)",
        ),
        rule(
            "entrega_recibo",
            Field::ActaNo,
            4,
            RuleKind::Direct,
            r"(?i)(?:Entrega\s*No|Nro|RECIBO)\.?\s*(?P<number>\d+)",
        ),
    ];
    rules.sort_by_key(|r| r.priority);
    rules
});

/// Keywords that confirm a bare number is an identity number
pub static ID_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Identificaci[oó]n|DOCUMENTO|No\.\s*Doc|C[.\s]*C\b|IDENTIFICACION\s*No")
        .expect("static pattern must compile")
});

/// A capturable type code standing alone
pub static TYPE_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(?P<type>{})\b", CAPTURABLE_TYPES))
        .expect("static pattern must compile")
});

/// "<n> AÑOS", optionally labelled with "Edad"
pub static AGE_LABELLED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:Edad\s*[:\-]?\s*)?(?P<age>\d{1,3})\s*A[ÑN]OS\b")
        .expect("static pattern must compile")
});

/// Looser "<n> AÑOS"; only trusted with "EDAD" shortly before it
pub static AGE_LOOSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?P<age>\d{1,3})\b\s*A[ÑN]OS")
        .expect("static pattern must compile")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cascades_are_ordered() {
        let id: Vec<_> = ID_RULES.iter().map(|r| r.name).collect();
        assert_eq!(id, vec!["identificacion_label", "type_then_number", "number_near_keyword"]);

        let acta: Vec<_> = ACTA_RULES.iter().map(|r| r.priority).collect();
        assert_eq!(acta, vec![1, 2, 3, 4]);
        assert!(ACTA_RULES.iter().all(|r| r.field == Field::ActaNo));
    }

    #[test]
    fn test_only_last_id_rule_needs_context() {
        let kinds: Vec<_> = ID_RULES.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RuleKind::Direct, RuleKind::Direct, RuleKind::Contextual]);
    }

    #[test]
    fn test_nit_is_not_capturable() {
        assert!(!TYPE_CODE.is_match("NIT 900123456"));
        assert!(TYPE_CODE.is_match("tipo: ce"));
    }

    #[test]
    fn test_age_patterns() {
        let caps = AGE_LABELLED.captures("Edad: 45 años").unwrap();
        assert_eq!(&caps["age"], "45");
        assert!(AGE_LABELLED.is_match("3 ANOS"));
        assert!(!AGE_LABELLED.is_match("45 AÑOSX"));
        assert!(AGE_LOOSE.is_match("45 AÑOSX"));
    }
}
