//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand, ValueEnum};
use ocrename_domain::DocumentMode;
use std::path::PathBuf;

/// OCRename - Rename scanned medication-delivery PDFs after the patient ID and acta number.
#[derive(Debug, Parser)]
#[command(name = "ocrename")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Where the acta number is expected
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Output base directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Also append logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Disable the language-model fallback
    #[arg(long)]
    pub no_ai: bool,

    /// OpenRouter API key
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Write the extracted text of every document into this directory
    #[arg(long)]
    pub debug_dir: Option<PathBuf>,

    /// Summary format
    #[arg(short, long, value_enum)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// PDF files or directories containing PDFs
    pub files: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Document mode options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Acta number printed in the document body
    Printed,
    /// Acta number handwritten in the top-right corner
    Handwritten,
}

impl From<ModeArg> for DocumentMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Printed => DocumentMode::Printed,
            ModeArg::Handwritten => DocumentMode::HandwrittenCorner,
        }
    }
}

/// Summary format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Counts only
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect the effective configuration
    Config(ConfigArgs),
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    /// Print the effective configuration as TOML
    #[arg(long)]
    pub print: bool,
}
