//! Archive extraction and definition filtering.
//!
//! This module handles:
//! - Finding packed `.cat` archives anywhere below the game directory
//! - Unpacking storage macros from each archive, mirroring its directory
//! - Filtering the unpacked tree down to definitions with a cargo value

mod filter;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::ModConfig;
use crate::error::ModResult;
use crate::fsutil;
use crate::tools::{ToolStatus, Unpacker};

pub use filter::{remove_empty_dirs, DefinitionFilter, FilterPlan, FilterSummary, RemovalReason};

const ARCHIVE_EXTENSION: &str = ".cat";
const SIGNATURE_SUFFIX: &str = "sig.cat";

/// Whether a file name denotes an extractable archive.
///
/// Signature archives (`*sig.cat`) are skipped.
pub fn is_archive_name(name: &str) -> bool {
    name.ends_with(ARCHIVE_EXTENSION) && !name.ends_with(SIGNATURE_SUFFIX)
}

/// Result of extracting every archive below a root.
#[derive(Debug, Clone, Default)]
pub struct ExtractSummary {
    /// Archives handed to the unpacker.
    pub archives: Vec<PathBuf>,

    /// Unpacker runs that exited unsuccessfully.
    pub failures: Vec<ToolStatus>,
}

/// Unpacks storage definitions from the game's archives.
pub struct ArchiveExtractor<'a> {
    unpacker: &'a dyn Unpacker,
    include: String,
    exclude: Vec<String>,
    strict: bool,
}

impl<'a> ArchiveExtractor<'a> {
    /// Create an extractor using the patterns and tool policy of `config`.
    pub fn new(unpacker: &'a dyn Unpacker, config: &ModConfig) -> Self {
        Self {
            unpacker,
            include: config.include.clone(),
            exclude: config.exclude.clone(),
            strict: config.strict_tools,
        }
    }

    /// Find all archives below `root`, in sorted path order.
    pub fn find_archives(&self, root: &Path) -> ModResult<Vec<PathBuf>> {
        Ok(fsutil::files_under(root)?
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(is_archive_name)
            })
            .collect())
    }

    /// Extract every archive below `input_root` into `output_root`.
    ///
    /// An archive at `input_root/a/b/x.cat` is unpacked into
    /// `output_root/a/b`. Archives directly under `input_root` unpack into
    /// `output_root` itself.
    pub fn extract_all(&self, input_root: &Path, output_root: &Path) -> ModResult<ExtractSummary> {
        let archives = self.find_archives(input_root)?;
        info!(
            count = archives.len(),
            root = %input_root.display(),
            "Found archives"
        );

        let mut summary = ExtractSummary::default();
        for archive in archives {
            let out_dir = mirrored_dir(input_root, &archive, output_root);
            if let Some(status) = self.extract_one(&archive, &out_dir)? {
                summary.failures.push(status);
            }
            summary.archives.push(archive);
        }

        Ok(summary)
    }

    /// Extract one archive, returning the status if the tool failed.
    fn extract_one(&self, archive: &Path, out_dir: &Path) -> ModResult<Option<ToolStatus>> {
        info!("Extracting {} to {}", archive.display(), out_dir.display());
        fsutil::create_dir_all(out_dir)?;

        let status = self
            .unpacker
            .unpack(archive, out_dir, &self.include, &self.exclude)?
            .enforce(self.strict)?;

        debug!(code = ?status.code, "Unpacker finished");
        Ok((!status.is_success()).then_some(status))
    }
}

/// Directory under `output_root` mirroring the archive's parent directory.
fn mirrored_dir(input_root: &Path, archive: &Path, output_root: &Path) -> PathBuf {
    let parent = archive.parent().unwrap_or(input_root);
    match parent.strip_prefix(input_root) {
        Ok(rel) if !rel.as_os_str().is_empty() => output_root.join(rel),
        _ => output_root.to_path_buf(),
    }
}
