//! Prompts for the language-model fallback

/// Which model the prompt is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Text model reading extracted document text
    Text,
    /// Vision model reading the first page image
    Vision,
}

/// Builds the extraction instruction sent to the model
pub struct PromptBuilder<'a> {
    kind: PromptKind,
    filename: &'a str,
    text: Option<&'a str>,
}

impl<'a> PromptBuilder<'a> {
    /// Prompt over the text of `filename`
    pub fn for_text(text: &'a str, filename: &'a str) -> Self {
        Self {
            kind: PromptKind::Text,
            filename,
            text: Some(text),
        }
    }

    /// Prompt accompanying the first page image of `filename`
    pub fn for_vision(filename: &'a str) -> Self {
        Self {
            kind: PromptKind::Vision,
            filename,
            text: None,
        }
    }

    /// Which model the prompt targets
    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    /// Build the complete prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        match self.kind {
            PromptKind::Text => {
                prompt.push_str(&format!(
                    "Vas a leer el texto de un documento llamado \"{}\". El texto viene de un PDF o de OCR y puede tener errores.\n",
                    self.filename
                ));
            }
            PromptKind::Vision => {
                prompt.push_str(&format!(
                    "Vas a leer la imagen de la primera página de un documento llamado \"{}\". Puede tener texto impreso y manuscrito.\n",
                    self.filename
                ));
            }
        }
        prompt.push_str(DOCUMENT_CONTEXT);
        prompt.push_str("\n\n");

        prompt.push_str(FIELD_DESCRIPTIONS);
        if self.kind == PromptKind::Vision {
            prompt.push_str(HANDWRITTEN_HINT);
        }
        prompt.push_str("\n");

        if let Some(text) = self.text {
            prompt.push_str("Texto del documento:\n");
            prompt.push_str("---\n");
            prompt.push_str(text);
            prompt.push_str("\n---\n\n");
        }

        prompt.push_str(OUTPUT_FORMAT);
        prompt
    }
}

const DOCUMENT_CONTEXT: &str =
    "Se trata de un acta de entrega de medicamentos o de una fórmula médica colombiana, en español.";

const FIELD_DESCRIPTIONS: &str = r#"Extrae estos datos:
1. "id_type": tipo de documento de identidad del PACIENTE (CC, TI, CE, PA, RC o NIT). Suele aparecer junto a "Identificación", "Paciente", "Usuario" o "DOCUMENTO".
2. "id_number": número de identificación del PACIENTE, solo dígitos.
3. "acta_no": número del acta de entrega, de la fórmula médica o de la orden ("Acta de Entrega No.", "Fórmula Médica Nro.", "Orden", "Solicitud de Medicamentos N°"), solo dígitos.
"#;

const HANDWRITTEN_HINT: &str = r#"Revisa también la esquina superior derecha: allí suele haber un número de control escrito a mano, normalmente de 4 a 6 dígitos. Si ves un número impreso de fórmula y un número manuscrito de control, usa el manuscrito como "acta_no".
"#;

const OUTPUT_FORMAT: &str = r#"Responde SOLO con un objeto JSON con las claves "id_type", "id_number" y "acta_no", sin texto antes ni después.
Usa null para cualquier dato que no puedas leer con seguridad.
Ejemplo: {"id_type": "CC", "id_number": "12345678", "acta_no": "46150"}
Ejemplo sin acta: {"id_type": "CC", "id_number": "12345678", "acta_no": null}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_prompt_embeds_text_and_name() {
        let prompt = PromptBuilder::for_text("Identificación CC 123", "scan_01.pdf").build();
        assert!(prompt.contains("\"scan_01.pdf\""));
        assert!(prompt.contains("---\nIdentificación CC 123\n---"));
        assert!(prompt.contains("\"acta_no\""));
        assert!(!prompt.contains("esquina superior derecha"));
    }

    #[test]
    fn test_vision_prompt_mentions_corner() {
        let builder = PromptBuilder::for_vision("scan_02.pdf");
        assert_eq!(builder.kind(), PromptKind::Vision);

        let prompt = builder.build();
        assert!(prompt.contains("esquina superior derecha"));
        assert!(!prompt.contains("Texto del documento"));
        assert!(prompt.contains("null"));
    }
}
