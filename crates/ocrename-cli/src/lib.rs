//! OCRename CLI library.
//!
//! Configuration loading, logging setup, the rename run and console
//! output for the `ocrename` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;

pub use cli::{Cli, CliFormat, Command};
pub use config::{AiConfig, AppConfig};
pub use error::{CliError, Result};
pub use output::{Formatter, JobRow};
