//! Configuration management for the CLI.
//!
//! Settings come from a TOML file (the `--config` path, or
//! `<config dir>/ocrename/config.toml` when present) and are then
//! overridden by command-line flags.

use crate::cli::Cli;
use crate::error::{CliError, Result};
use ocrename_domain::DocumentMode;
use ocrename_extractor::ExtractorConfig;
use ocrename_filer::FilerConfig;
use ocrename_llm::OpenRouterConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default document mode ("printed" or "handwritten")
    pub mode: String,

    /// Log level directive
    pub log_level: String,

    /// Optional log file, appended to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Directory for extracted-text dumps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_dir: Option<PathBuf>,

    /// Colored console output
    pub color: bool,

    /// Recognition language passed to tesseract
    pub ocr_language: String,

    /// Extraction settings
    pub extractor: ExtractorConfig,

    /// Output folders and naming
    pub filer: FilerConfig,

    /// Language-model fallback
    pub ai: AiConfig,
}

/// Language-model fallback settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Use the fallback at all
    pub enabled: bool,

    /// OpenRouter API key; usually supplied through `OPENROUTER_API_KEY`
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Client settings
    pub openrouter: OpenRouterConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: DocumentMode::Printed.as_str().to_string(),
            log_level: "info".to_string(),
            log_file: None,
            debug_dir: None,
            color: true,
            ocr_language: "spa".to_string(),
            extractor: ExtractorConfig::default(),
            filer: FilerConfig::default(),
            ai: AiConfig::default(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            openrouter: OpenRouterConfig::default(),
        }
    }
}

impl AiConfig {
    /// API key, when one is configured and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// Whether the fallback should be attempted
    pub fn is_usable(&self) -> bool {
        self.enabled && self.api_key().is_some()
    }
}

impl AppConfig {
    /// Default location of the configuration file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ocrename").join("config.toml"))
    }

    /// Load configuration from `path`, or from the default location.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::Config(format!(
                "Config file '{}' does not exist",
                path.display()
            )));
        }
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Apply command-line overrides.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(mode) = cli.mode {
            self.mode = DocumentMode::from(mode).as_str().to_string();
        }
        if let Some(output) = &cli.output {
            self.filer.output_base = output.clone();
        }
        if let Some(level) = &cli.log_level {
            self.log_level = level.clone();
        }
        if let Some(file) = &cli.log_file {
            self.log_file = Some(file.clone());
        }
        if let Some(dir) = &cli.debug_dir {
            self.debug_dir = Some(dir.clone());
        }
        if cli.no_ai {
            self.ai.enabled = false;
        }
        if let Some(key) = &cli.api_key {
            self.ai.api_key = Some(key.clone());
        }
        if cli.no_color {
            self.color = false;
        }
    }

    /// Document mode selected by the configuration.
    pub fn document_mode(&self) -> Result<DocumentMode> {
        self.mode.parse().map_err(CliError::Config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.document_mode()?;
        if self.ocr_language.trim().is_empty() {
            return Err(CliError::Config("ocr_language cannot be empty".to_string()));
        }
        self.extractor
            .validate()
            .map_err(|e| CliError::Config(format!("extractor: {}", e)))?;
        self.filer
            .validate()
            .map_err(|e| CliError::Config(format!("filer: {}", e)))?;
        self.ai
            .openrouter
            .validate()
            .map_err(|e| CliError::Config(format!("ai.openrouter: {}", e)))?;
        Ok(())
    }
}
