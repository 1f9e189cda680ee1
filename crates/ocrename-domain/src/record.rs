//! The record extracted from a single document

use std::fmt;
use std::str::FromStr;

/// Identity document type of the patient.
///
/// Pattern extraction only ever captures the five codes accepted for
/// renaming. Language-model answers may carry other codes (for example
/// `NIT`), which are preserved verbatim in [`IdType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdType {
    /// Cédula de ciudadanía (adult citizen)
    CC,
    /// Tarjeta de identidad (minor, 5 to 17 years)
    TI,
    /// Cédula de extranjería (foreign resident)
    CE,
    /// Pasaporte
    PA,
    /// Registro civil (young child)
    RC,
    /// Any other code reported by an external source, upper-cased
    Other(String),
}

impl IdType {
    /// Codes a pattern rule is allowed to capture, in alternation order
    pub const CAPTURABLE: [IdType; 5] = [IdType::CC, IdType::TI, IdType::CE, IdType::PA, IdType::RC];

    /// Type assigned when a number is known but no type could be recovered
    pub const FALLBACK: IdType = IdType::CC;

    /// Canonical code as it appears in filenames
    pub fn as_str(&self) -> &str {
        match self {
            IdType::CC => "CC",
            IdType::TI => "TI",
            IdType::CE => "CE",
            IdType::PA => "PA",
            IdType::RC => "RC",
            IdType::Other(code) => code,
        }
    }

    /// Parse a code leniently (trimmed, case-insensitive).
    ///
    /// Returns `None` for empty input and for the literal `null`.
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim().to_uppercase();
        match code.as_str() {
            "" | "NULL" | "NONE" => None,
            "CC" => Some(IdType::CC),
            "TI" => Some(IdType::TI),
            "CE" => Some(IdType::CE),
            "PA" => Some(IdType::PA),
            "RC" => Some(IdType::RC),
            _ => Some(IdType::Other(code)),
        }
    }

    /// Whether this is one of the five capturable codes
    pub fn is_capturable(&self) -> bool {
        !matches!(self, IdType::Other(_))
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IdType::parse(s).ok_or_else(|| format!("empty id type: '{}'", s))
    }
}

/// One of the three record fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Identity document type
    IdType,
    /// Identity document number
    IdNumber,
    /// Delivery/order control number
    ActaNo,
}

impl Field {
    /// All fields in filename order
    pub const ALL: [Field; 3] = [Field::IdType, Field::IdNumber, Field::ActaNo];

    /// Key used for this field in JSON answers and logs
    pub fn key(&self) -> &'static str {
        match self {
            Field::IdType => "id_type",
            Field::IdNumber => "id_number",
            Field::ActaNo => "acta_no",
        }
    }
}

/// Identity and control numbers recovered from a document.
///
/// Stages fill the record incrementally. A set field is only ever replaced
/// by another present value, never cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedRecord {
    /// Identity document type
    pub id_type: Option<IdType>,

    /// Identity document number (digits)
    pub id_number: Option<String>,

    /// Delivery/order control number (digits)
    pub acta_no: Option<String>,
}

impl ExtractedRecord {
    /// Create a fully populated record
    pub fn new(id_type: IdType, id_number: impl Into<String>, acta_no: impl Into<String>) -> Self {
        Self {
            id_type: Some(id_type),
            id_number: Some(id_number.into()),
            acta_no: Some(acta_no.into()),
        }
    }

    /// Whether the given field holds a value
    pub fn has(&self, field: Field) -> bool {
        match field {
            Field::IdType => self.id_type.is_some(),
            Field::IdNumber => self.id_number.is_some(),
            Field::ActaNo => self.acta_no.is_some(),
        }
    }

    /// Whether all three fields hold a value
    pub fn is_complete(&self) -> bool {
        Field::ALL.iter().all(|f| self.has(*f))
    }

    /// Whether no field holds a value
    pub fn is_empty(&self) -> bool {
        !Field::ALL.iter().any(|f| self.has(*f))
    }

    /// Fields still absent, in filename order
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL.iter().copied().filter(|f| !self.has(*f)).collect()
    }

    /// A record can be renamed once it carries a real identity number.
    ///
    /// `placeholder` is the stand-in used for unresolved filename tokens;
    /// a number equal to it does not count.
    pub fn is_renameable(&self, placeholder: &str) -> bool {
        match &self.id_number {
            Some(number) => {
                let number = number.trim();
                !number.is_empty() && !number.eq_ignore_ascii_case(placeholder)
            }
            None => false,
        }
    }

    /// Copy `field` from `other` into `self` when `other` has it.
    ///
    /// Returns `true` when the stored value changed.
    pub fn set_from(&mut self, other: &ExtractedRecord, field: Field) -> bool {
        match field {
            Field::IdType => replace_if_present(&mut self.id_type, &other.id_type),
            Field::IdNumber => replace_if_present(&mut self.id_number, &other.id_number),
            Field::ActaNo => replace_if_present(&mut self.acta_no, &other.acta_no),
        }
    }

    /// Assign the fallback type when a number exists but no type does.
    ///
    /// Returns `true` when the fallback was applied.
    pub fn apply_type_fallback(&mut self) -> bool {
        if self.id_number.is_some() && self.id_type.is_none() {
            self.id_type = Some(IdType::FALLBACK);
            return true;
        }
        false
    }
}

impl fmt::Display for ExtractedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{id_type: {}, id_number: {}, acta_no: {}}}",
            self.id_type.as_ref().map(IdType::as_str).unwrap_or("-"),
            self.id_number.as_deref().unwrap_or("-"),
            self.acta_no.as_deref().unwrap_or("-"),
        )
    }
}

fn replace_if_present<T: Clone + PartialEq>(slot: &mut Option<T>, incoming: &Option<T>) -> bool {
    match incoming {
        Some(value) if slot.as_ref() != Some(value) => {
            *slot = Some(value.clone());
            true
        }
        _ => false,
    }
}
