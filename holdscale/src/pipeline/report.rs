//! Reports returned by pipeline runs.

use std::path::PathBuf;

use crate::error::ModError;
use crate::extract::{ExtractSummary, FilterSummary};
use crate::manifest::VersionBump;
use crate::package::ArchiveBuildResult;
use crate::tools::ToolStatus;

/// Outcome of the extract phase.
#[derive(Debug, Clone)]
pub struct ExtractReport {
    pub extract: ExtractSummary,
    pub filter: FilterSummary,
}

/// Details of a factor that built successfully.
#[derive(Debug, Clone)]
pub struct FactorReport {
    pub factor: u32,
    pub output_dir: PathBuf,
    /// Number of patch files written.
    pub patches: usize,
    pub version: VersionBump,
    pub archive: ArchiveBuildResult,
    /// Subdirectories removed after packing.
    pub dirs_removed: usize,
    /// Uploader status, when uploading is enabled.
    pub upload: Option<ToolStatus>,
}

impl FactorReport {
    /// Tool runs for this factor that exited unsuccessfully.
    pub fn tool_failures(&self) -> Vec<&ToolStatus> {
        std::iter::once(&self.archive.status)
            .chain(self.upload.as_ref())
            .filter(|status| !status.is_success())
            .collect()
    }
}

/// Result of building one factor.
#[derive(Debug)]
pub struct FactorOutcome {
    pub factor: u32,
    pub result: Result<FactorReport, ModError>,
}

/// Outcome of the build phase, one entry per factor in configured order.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub factors: Vec<FactorOutcome>,
}

impl BuildReport {
    /// Factors that built.
    pub fn succeeded(&self) -> impl Iterator<Item = &FactorReport> {
        self.factors.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// Factors that aborted, with their error.
    pub fn failed(&self) -> impl Iterator<Item = (u32, &ModError)> {
        self.factors
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.factor, e)))
    }

    /// Whether every factor built.
    pub fn is_success(&self) -> bool {
        self.factors.iter().all(|o| o.result.is_ok())
    }
}
