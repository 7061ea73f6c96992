//! End-to-end extract and build orchestration.
//!
//! A run has two phases:
//!
//! 1. **Extract** (once): clean the extract directory, unpack every archive
//!    of the game, filter down to cargo-bearing definitions.
//! 2. **Build** (per factor): clean the output root, then for each factor
//!    generate patches, stamp and install the manifest, pack the archive,
//!    remove intermediate directories and optionally upload.
//!
//! Factors run sequentially in isolated directories. A factor that fails is
//! recorded in the [`BuildReport`] and the remaining factors still run; its
//! directory is left as it was when the error occurred.

mod report;

use tracing::{info, info_span, warn};

use crate::config::ModConfig;
use crate::error::ModResult;
use crate::extract::{ArchiveExtractor, DefinitionFilter};
use crate::fsutil;
use crate::manifest::{install_manifest, VersionStamper};
use crate::package::{publish, ArchiveBuilder, DirectoryCleaner};
use crate::patch::CargoPatchGenerator;
use crate::tools::{CatTool, Packer, Unpacker, Uploader, WorkshopTool};

pub use report::{BuildReport, ExtractReport, FactorOutcome, FactorReport};

/// The real external tools named by a configuration.
#[derive(Debug, Clone)]
pub struct SystemTools {
    pub cat: CatTool,
    pub workshop: WorkshopTool,
}

impl SystemTools {
    /// Wrap the executables configured in `config`.
    pub fn from_config(config: &ModConfig) -> Self {
        Self {
            cat: CatTool::new(&config.cat_tool),
            workshop: WorkshopTool::new(&config.upload_tool),
        }
    }
}

/// Drives the extract and build phases.
pub struct Pipeline<'a> {
    config: ModConfig,
    unpacker: &'a dyn Unpacker,
    packer: &'a dyn Packer,
    uploader: &'a dyn Uploader,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline with explicit tool implementations.
    pub fn new(
        config: ModConfig,
        unpacker: &'a dyn Unpacker,
        packer: &'a dyn Packer,
        uploader: &'a dyn Uploader,
    ) -> Self {
        Self {
            config,
            unpacker,
            packer,
            uploader,
        }
    }

    /// Create a pipeline backed by the real executables.
    pub fn with_system_tools(config: ModConfig, tools: &'a SystemTools) -> Self {
        Self::new(config, &tools.cat, &tools.cat, &tools.workshop)
    }

    /// The configuration in use.
    pub fn config(&self) -> &ModConfig {
        &self.config
    }

    /// Rebuild the filtered definition tree from the game archives.
    pub fn extract(&self) -> ModResult<ExtractReport> {
        self.config.validate_for_extract()?;
        let extract_dir = &self.config.extract_dir;

        if fsutil::remove_dir_if_exists(extract_dir)? {
            info!("Removed previous extraction at {}", extract_dir.display());
        }
        fsutil::create_dir_all(extract_dir)?;

        let extractor = ArchiveExtractor::new(self.unpacker, &self.config);
        let extract = extractor.extract_all(&self.config.game_dir, extract_dir)?;
        if !extract.failures.is_empty() {
            warn!(
                failures = extract.failures.len(),
                "Some archives did not extract cleanly"
            );
        }

        let filter = DefinitionFilter::new(self.config.generated_marker.clone()).run(extract_dir)?;

        Ok(ExtractReport { extract, filter })
    }

    /// Build every configured factor from the filtered tree.
    ///
    /// Only configuration and output-root errors are returned as `Err`.
    pub fn build(&self) -> ModResult<BuildReport> {
        self.config.validate_for_build()?;

        let output_dir = &self.config.output_dir;
        if fsutil::remove_dir_if_exists(output_dir)? {
            info!("Cleaned output root {}", output_dir.display());
        }
        fsutil::create_dir_all(output_dir)?;

        let mut report = BuildReport::default();
        for &factor in &self.config.factors {
            let result = self.build_factor(factor);
            if let Err(e) = &result {
                warn!(factor, error = %e, "Factor aborted");
            }
            report.factors.push(FactorOutcome { factor, result });
        }

        Ok(report)
    }

    /// Build a single factor into its own output directory.
    pub fn build_factor(&self, factor: u32) -> ModResult<FactorReport> {
        let _span = info_span!("factor", factor).entered();
        let generator = CargoPatchGenerator::new(factor)?;

        let output_dir = self.config.factor_dir(factor);
        fsutil::remove_dir_if_exists(&output_dir)?;
        fsutil::create_dir_all(&output_dir)?;

        let patches = generator.generate(&self.config.extract_dir, &output_dir)?;

        let manifest = self.config.manifest_source(factor);
        let version = VersionStamper::new().stamp(&manifest)?;
        install_manifest(&manifest, &output_dir)?;

        let archive = ArchiveBuilder::new(
            self.packer,
            self.config.archive_name.clone(),
            self.config.strict_tools,
        )
        .build(&output_dir)?;

        let dirs_removed = DirectoryCleaner::new().clean(&output_dir)?;

        let upload = if self.config.upload {
            Some(publish(
                self.uploader,
                &output_dir,
                &self.config.change_note,
                self.config.strict_tools,
            )?)
        } else {
            None
        };

        info!(
            patches = patches.len(),
            version = version.current,
            "Built {}",
            output_dir.display()
        );

        Ok(FactorReport {
            factor,
            output_dir,
            patches: patches.len(),
            version,
            archive,
            dirs_removed,
            upload,
        })
    }
}
