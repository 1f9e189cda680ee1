//! Filesystem implementation of the Filer trait

use crate::config::FilerConfig;
use crate::error::{FilerError, Result};
use crate::naming::{build_filename, unique_destination};
use ocrename_domain::traits::Filer;
use ocrename_domain::ExtractedRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Files documents below a local output directory
#[derive(Debug, Clone)]
pub struct FsFiler {
    config: FilerConfig,
    renamed_dir: PathBuf,
    failed_dir: PathBuf,
}

impl FsFiler {
    /// Create the filer and both bucket directories
    pub fn new(config: FilerConfig) -> Result<Self> {
        config.validate().map_err(FilerError::Config)?;

        let renamed_dir = config.renamed_dir();
        let failed_dir = config.failed_dir();
        fs::create_dir_all(&renamed_dir)?;
        fs::create_dir_all(&failed_dir)?;
        info!(
            "Output folders ready: '{}', '{}'",
            renamed_dir.display(),
            failed_dir.display()
        );

        Ok(Self {
            config,
            renamed_dir,
            failed_dir,
        })
    }

    /// Directory receiving renamed copies
    pub fn renamed_dir(&self) -> &Path {
        &self.renamed_dir
    }

    /// Directory receiving failed originals
    pub fn failed_dir(&self) -> &Path {
        &self.failed_dir
    }

    /// Configuration in use
    pub fn config(&self) -> &FilerConfig {
        &self.config
    }
}

impl Filer for FsFiler {
    type Error = FilerError;

    fn build_filename(&self, record: &ExtractedRecord, ext: &str) -> Option<String> {
        build_filename(record, ext, &self.config.placeholder)
    }

    fn rename(&self, original: &Path, new_name: &str) -> Result<PathBuf> {
        if !original.is_file() {
            return Err(FilerError::MissingSource(original.to_path_buf()));
        }
        if !is_plain_name(new_name) {
            return Err(FilerError::InvalidName(new_name.to_string()));
        }

        let destination = unique_destination(&self.renamed_dir, new_name);
        fs::copy(original, &destination)?;
        info!(
            "'{}' copied as '{}'",
            original.display(),
            destination.display()
        );
        Ok(destination)
    }

    fn move_to_failed(&self, original: &Path) -> Result<PathBuf> {
        if !original.is_file() {
            warn!("Cannot move missing file '{}' to failed", original.display());
            return Err(FilerError::MissingSource(original.to_path_buf()));
        }
        let name = original
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| FilerError::InvalidName(original.display().to_string()))?;

        let destination = unique_destination(&self.failed_dir, &name);
        if let Err(e) = fs::rename(original, &destination) {
            debug!("Rename into failed folder failed ({}), copying instead", e);
            fs::copy(original, &destination)?;
            fs::remove_file(original)?;
        }
        info!("'{}' moved to '{}'", original.display(), destination.display());
        Ok(destination)
    }
}

/// A single path component with no separators
fn is_plain_name(name: &str) -> bool {
    !name.trim().is_empty() && Path::new(name).file_name().is_some_and(|n| n == name)
}
