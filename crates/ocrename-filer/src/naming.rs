//! Filename construction and collision handling

use ocrename_domain::ExtractedRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Replace every non-alphanumeric character with `_`
pub fn sanitize_token(token: &str) -> String {
    token
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// `<TYPE>_<NUMBER>_<ACTA><ext>` for `record`.
///
/// Unresolved type and acta render as `placeholder`. Returns `None` when
/// the record has no usable identity number.
pub fn build_filename(record: &ExtractedRecord, ext: &str, placeholder: &str) -> Option<String> {
    if !record.is_renameable(placeholder) {
        warn!("No id_number in {}, cannot build a filename", record);
        return None;
    }
    let id_number = record.id_number.as_deref()?;

    let id_type = record.id_type.as_ref().map(|t| t.as_str()).unwrap_or(placeholder);
    let acta_no = record.acta_no.as_deref().unwrap_or(placeholder);

    Some(format!(
        "{}_{}_{}{}",
        sanitize_token(id_type),
        sanitize_token(id_number.trim()),
        sanitize_token(acta_no),
        ext
    ))
}

/// First free path for `name` in `dir`, suffixing `_1`, `_2`, ... before
/// the extension when the name is taken
pub fn unique_destination(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let as_path = Path::new(name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let ext = as_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1u32;
    loop {
        let next = dir.join(format!("{}_{}{}", stem, counter, ext));
        if !next.exists() {
            debug!("'{}' exists, using '{}'", name, next.display());
            return next;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocrename_domain::IdType;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_full_record() {
        let record = ExtractedRecord::new(IdType::CC, "12345678", "4567");
        assert_eq!(
            build_filename(&record, ".pdf", "DESCONOCIDO").as_deref(),
            Some("CC_12345678_4567.pdf")
        );
    }

    #[test]
    fn test_placeholders_for_type_and_acta() {
        let record = ExtractedRecord {
            id_number: Some("12345678".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build_filename(&record, ".pdf", "DESCONOCIDO").as_deref(),
            Some("DESCONOCIDO_12345678_DESCONOCIDO.pdf")
        );
    }

    #[test]
    fn test_no_number_no_name() {
        let record = ExtractedRecord {
            id_type: Some(IdType::CC),
            acta_no: Some("4567".to_string()),
            ..Default::default()
        };
        assert_eq!(build_filename(&record, ".pdf", "DESCONOCIDO"), None);

        let placeholder_number = ExtractedRecord::new(IdType::CC, "desconocido", "1");
        assert_eq!(build_filename(&placeholder_number, ".pdf", "DESCONOCIDO"), None);
    }

    #[test]
    fn test_tokens_are_sanitized() {
        assert_eq!(sanitize_token("12.345-678"), "12_345_678");
        assert_eq!(sanitize_token("Año"), "Año");

        let record = ExtractedRecord::new(IdType::Other("C/C".to_string()), "1 2", "A-1");
        assert_eq!(
            build_filename(&record, ".PDF", "X").as_deref(),
            Some("C_C_1_2_A_1.PDF")
        );
    }

    #[test]
    fn test_unique_destination_suffixes() {
        let dir = TempDir::new().unwrap();
        assert_eq!(unique_destination(dir.path(), "a.pdf"), dir.path().join("a.pdf"));

        fs::write(dir.path().join("a.pdf"), b"x").unwrap();
        assert_eq!(unique_destination(dir.path(), "a.pdf"), dir.path().join("a_1.pdf"));

        fs::write(dir.path().join("a_1.pdf"), b"x").unwrap();
        assert_eq!(unique_destination(dir.path(), "a.pdf"), dir.path().join("a_2.pdf"));
    }

    #[test]
    fn test_unique_destination_without_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes"), b"x").unwrap();
        assert_eq!(unique_destination(dir.path(), "notes"), dir.path().join("notes_1"));
    }
}
