//! Configuration for the Filer

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output layout and naming settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilerConfig {
    /// Directory holding both buckets
    pub output_base: PathBuf,

    /// Bucket for renamed copies, relative to `output_base`
    pub renamed_subdir: String,

    /// Bucket for failed originals, relative to `output_base`
    pub failed_subdir: String,

    /// Stand-in for an unresolved type or acta number in filenames
    pub placeholder: String,
}

impl Default for FilerConfig {
    fn default() -> Self {
        Self {
            output_base: PathBuf::from("OCRename_Resultados"),
            renamed_subdir: "Archivos_Renombrados".to_string(),
            failed_subdir: "Archivos_Fallidos".to_string(),
            placeholder: "DESCONOCIDO".to_string(),
        }
    }
}

impl FilerConfig {
    /// Default layout below `output_base`
    pub fn with_output_base(output_base: impl Into<PathBuf>) -> Self {
        Self {
            output_base: output_base.into(),
            ..Self::default()
        }
    }

    /// Directory receiving renamed copies
    pub fn renamed_dir(&self) -> PathBuf {
        self.output_base.join(&self.renamed_subdir)
    }

    /// Directory receiving failed originals
    pub fn failed_dir(&self) -> PathBuf {
        self.output_base.join(&self.failed_subdir)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.output_base.as_os_str().is_empty() {
            return Err("output_base cannot be empty".to_string());
        }
        for (name, value) in [("renamed_subdir", &self.renamed_subdir), ("failed_subdir", &self.failed_subdir)] {
            if value.trim().is_empty() {
                return Err(format!("{} cannot be empty", name));
            }
        }
        if self.renamed_subdir == self.failed_subdir {
            return Err("renamed_subdir and failed_subdir must differ".to_string());
        }
        if self.placeholder.trim().is_empty() {
            return Err("placeholder cannot be empty".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }
}
