//! Document-format modes selected by the operator

use std::fmt;
use std::str::FromStr;

/// Which physical form a batch of documents follows.
///
/// The mode decides where the acta number is expected and therefore which
/// extraction stages run and how their answers are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DocumentMode {
    /// Control number machine-printed in the body ("pendiente impreso")
    #[default]
    Printed,
    /// Control number handwritten in the top-right corner ("entregado manuscrito")
    HandwrittenCorner,
}

impl DocumentMode {
    /// Short name used in configuration and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentMode::Printed => "printed",
            DocumentMode::HandwrittenCorner => "handwritten",
        }
    }

    /// Whether a document without any text is still worth processing
    pub fn tolerates_missing_text(&self) -> bool {
        matches!(self, DocumentMode::HandwrittenCorner)
    }
}

impl fmt::Display for DocumentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "printed" | "pendiente_impreso" => Ok(DocumentMode::Printed),
            "handwritten" | "handwritten-corner" | "entregado_manuscrito" => {
                Ok(DocumentMode::HandwrittenCorner)
            }
            other => Err(format!("Unknown document mode: '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("printed".parse::<DocumentMode>().unwrap(), DocumentMode::Printed);
        assert_eq!(
            "entregado_manuscrito".parse::<DocumentMode>().unwrap(),
            DocumentMode::HandwrittenCorner
        );
        assert_eq!(
            "Handwritten".parse::<DocumentMode>().unwrap(),
            DocumentMode::HandwrittenCorner
        );
        assert!("scanned".parse::<DocumentMode>().is_err());
    }

    #[test]
    fn test_missing_text_tolerance() {
        assert!(!DocumentMode::Printed.tolerates_missing_text());
        assert!(DocumentMode::HandwrittenCorner.tolerates_missing_text());
    }
}
