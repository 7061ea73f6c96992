//! Archive building and output cleanup for mod distribution.
//!
//! After patches and manifest are in place, the factor directory is packed
//! into a single `.cat` archive. Its subdirectories are then removed so only
//! the archive and `content.xml` remain for upload.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ModError, ModResult};
use crate::fsutil;
use crate::tools::{Packer, ToolStatus, Uploader};

/// Result of building an archive.
#[derive(Debug, Clone)]
pub struct ArchiveBuildResult {
    /// Full path of the archive the packer was asked to write.
    pub archive_path: PathBuf,

    /// Packer exit status.
    pub status: ToolStatus,
}

/// Packs a populated output directory into one archive.
pub struct ArchiveBuilder<'a> {
    packer: &'a dyn Packer,
    archive_name: String,
    strict: bool,
}

impl<'a> ArchiveBuilder<'a> {
    /// Create a builder writing `archive_name` into each packed directory.
    pub fn new(packer: &'a dyn Packer, archive_name: impl Into<String>, strict: bool) -> Self {
        Self {
            packer,
            archive_name: archive_name.into(),
            strict,
        }
    }

    /// Pack every file under `package_dir` into `package_dir/<archive_name>`.
    pub fn build(&self, package_dir: &Path) -> ModResult<ArchiveBuildResult> {
        if !package_dir.is_dir() {
            return Err(ModError::InvalidConfig(format!(
                "package directory does not exist: {}",
                package_dir.display()
            )));
        }

        let archive_path = package_dir.join(&self.archive_name);
        info!("Packing {} into {}", package_dir.display(), archive_path.display());

        let status = self
            .packer
            .pack(package_dir, &archive_path)?
            .enforce(self.strict)?;

        Ok(ArchiveBuildResult {
            archive_path,
            status,
        })
    }
}

/// Removes intermediate directories from a packaged output directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryCleaner;

impl DirectoryCleaner {
    /// Create a new cleaner.
    pub fn new() -> Self {
        Self
    }

    /// Delete every subdirectory of `dir`, keeping its top-level files.
    ///
    /// Returns the number of top-level subdirectories removed.
    pub fn clean(&self, dir: &Path) -> ModResult<usize> {
        let entries = fs::read_dir(dir).map_err(|e| ModError::ReadFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut subdirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ModError::ReadFailed {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let file_type = entry.file_type().map_err(|e| ModError::ReadFailed {
                path: entry.path(),
                source: e,
            })?;
            if file_type.is_dir() {
                subdirs.push(entry.path());
            }
        }

        for subdir in &subdirs {
            debug!("Cleanup of {}", subdir.display());
            fsutil::remove_dir_if_exists(subdir)?;
        }
        Ok(subdirs.len())
    }
}

/// Upload a finished mod directory.
pub fn publish(
    uploader: &dyn Uploader,
    mod_dir: &Path,
    change_note: &str,
    strict: bool,
) -> ModResult<ToolStatus> {
    info!("Uploading mod from {}", mod_dir.display());
    Ok(uploader.upload(mod_dir, change_note)?.enforce(strict)?)
}
