//! Output formatting for the CLI.

use crate::cli::CliFormat;
use crate::error::Result;
use colored::*;
use ocrename_domain::{DocumentJob, Outcome};
use ocrename_extractor::RunSummary;
use serde::Serialize;
use std::path::Path;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// One processed document, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRow {
    /// Source file name
    pub file: String,
    /// How the text was obtained
    pub method: String,
    /// Identity type
    pub id_type: Option<String>,
    /// Identity number
    pub id_number: Option<String>,
    /// Acta number
    pub acta_no: Option<String>,
    /// Stages that shaped the record
    pub provenance: String,
    /// Whether a renamed copy was written
    pub renamed: bool,
    /// New file path, or the failure reason
    pub detail: String,
}

impl From<&DocumentJob> for JobRow {
    fn from(job: &DocumentJob) -> Self {
        let (renamed, detail) = match &job.outcome {
            Some(Outcome::Renamed { destination }) => (true, destination.display().to_string()),
            Some(Outcome::Failed { reason, .. }) => (false, reason.to_string()),
            None => (false, "not processed".to_string()),
        };
        Self {
            file: job.file_name(),
            method: job.method.map(|m| m.tag().to_string()).unwrap_or_default(),
            id_type: job.record.id_type.as_ref().map(|t| t.as_str().to_string()),
            id_number: job.record.id_number.clone(),
            acta_no: job.record.acta_no.clone(),
            provenance: job.provenance.to_string(),
            renamed,
            detail,
        }
    }
}

/// Output formatter.
pub struct Formatter {
    format: CliFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: CliFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the per-document results.
    pub fn format_rows(&self, rows: &[JobRow]) -> Result<String> {
        match self.format {
            CliFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
            CliFormat::Table => Ok(self.format_rows_table(rows)),
            CliFormat::Quiet => Ok(String::new()),
        }
    }

    fn format_rows_table(&self, rows: &[JobRow]) -> String {
        if rows.is_empty() {
            return self.colorize("No documents processed.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["File", "Method", "Type", "Number", "Acta", "Stages", "Result"]);
        for row in rows {
            let result = if row.renamed {
                format!("→ {}", file_name_of(&row.detail))
            } else {
                format!("✗ {}", row.detail)
            };
            builder.push_record([
                row.file.as_str(),
                row.method.as_str(),
                row.id_type.as_deref().unwrap_or("-"),
                row.id_number.as_deref().unwrap_or("-"),
                row.acta_no.as_deref().unwrap_or("-"),
                row.provenance.as_str(),
                result.as_str(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Line printed when a document finishes.
    pub fn document_line(&self, index: usize, total: usize, job: &DocumentJob) -> String {
        let prefix = format!("({}/{}) {}", index, total, job.file_name());
        match &job.outcome {
            Some(Outcome::Renamed { destination }) => {
                self.success(&format!("{} → {}", prefix, file_name_of(&destination.display().to_string())))
            }
            Some(Outcome::Failed { reason, .. }) => self.error(&format!("{}: {}", prefix, reason)),
            None => self.warning(&format!("{}: not processed", prefix)),
        }
    }

    /// Run totals and bucket locations.
    pub fn summary(&self, summary: &RunSummary, renamed_dir: &Path, failed_dir: &Path) -> String {
        let mut lines = vec![self.info(&format!(
            "Processed {} document(s): {} renamed, {} failed",
            summary.total(),
            summary.renamed,
            summary.failed
        ))];
        if summary.renamed > 0 {
            lines.push(format!("  Renamed: {}", renamed_dir.display()));
        }
        if summary.failed > 0 {
            lines.push(format!("  Failed:  {}", failed_dir.display()));
        }
        lines.join("\n")
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn file_name_of(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
