//! Configuration for the extract and build pipeline.
//!
//! [`ModConfig`] is the explicit configuration handed to every component.
//! [`ConfigFile`] is its persisted INI form, edited through [`ConfigKey`].

mod file;
mod keys;

use std::path::{Component, Path, PathBuf};

use regex::Regex;
use thiserror::Error;

pub use file::{config_file_path, ConfigFile};
pub use keys::ConfigKey;

/// Scaling factors built when none are configured.
pub const DEFAULT_FACTORS: [u32; 4] = [2, 3, 5, 10];

/// Archive entries worth extracting: large storage macros.
pub const DEFAULT_INCLUDE: &str = "storage_.*_l_.*macro.xml";

/// Storage variants excluded from extraction.
pub const DEFAULT_EXCLUDE: [&str; 3] = [".*_l_liquid.*", ".*_l_container.*", ".*_l_solid.*"];

/// Name fragment identifying this tool's own published output.
pub const DEFAULT_GENERATED_MARKER: &str = "lf_cargo_extension";

/// Prefix of the per-factor output directories.
pub const DEFAULT_OUTPUT_PREFIX: &str = "lf_cargo_extension_";

/// Archive file written into each output directory.
pub const DEFAULT_ARCHIVE_NAME: &str = "ext_01.cat";

/// Manifest file name inside each output directory.
pub const MANIFEST_FILE_NAME: &str = "content.xml";

/// Errors raised while loading, editing or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    #[error("failed to write config file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("{0} is not set")]
    MissingPath(&'static str),

    #[error("no scaling factors configured")]
    NoFactors,

    #[error("scaling factor must be greater than zero")]
    ZeroFactor,

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("{key} ({}) must not be or contain {other}", .path.display())]
    Overlap {
        key: &'static str,
        path: PathBuf,
        other: &'static str,
    },
}

/// Configuration for one extract/build run.
#[derive(Debug, Clone)]
pub struct ModConfig {
    /// Game installation holding the packed archives.
    pub game_dir: PathBuf,

    /// Where archives are extracted and filtered.
    ///
    /// Acts as the source tree for the build phase.
    pub extract_dir: PathBuf,

    /// Root of the per-factor output directories.
    pub output_dir: PathBuf,

    /// Directory holding the `content_<factor>.xml` manifests.
    pub manifest_dir: PathBuf,

    /// XRCatTool executable.
    pub cat_tool: PathBuf,

    /// WorkshopTool executable.
    pub upload_tool: PathBuf,

    /// Inclusion pattern handed to the unpacker.
    pub include: String,

    /// Exclusion patterns handed to the unpacker.
    pub exclude: Vec<String>,

    /// Extracted files whose relative path contains this are discarded.
    pub generated_marker: String,

    /// Scaling factors, built in order.
    pub factors: Vec<u32>,

    /// Prefix of each factor's output directory name.
    pub output_prefix: String,

    /// Archive file name written by the packer.
    pub archive_name: String,

    /// Change note passed to the uploader.
    pub change_note: String,

    /// Whether to upload each finished factor.
    pub upload: bool,

    /// Treat non-zero tool exits as errors instead of warnings.
    pub strict_tools: bool,
}

impl Default for ModConfig {
    fn default() -> Self {
        Self {
            game_dir: PathBuf::new(),
            extract_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            manifest_dir: PathBuf::from("."),
            cat_tool: PathBuf::from("XRCatTool"),
            upload_tool: PathBuf::from("WorkshopTool"),
            include: DEFAULT_INCLUDE.to_string(),
            exclude: DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect(),
            generated_marker: DEFAULT_GENERATED_MARKER.to_string(),
            factors: DEFAULT_FACTORS.to_vec(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            change_note: "Update for TimeLines".to_string(),
            upload: false,
            strict_tools: false,
        }
    }
}

impl ModConfig {
    /// Create a configuration with the three working directories set.
    pub fn new(
        game_dir: impl Into<PathBuf>,
        extract_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            game_dir: game_dir.into(),
            extract_dir: extract_dir.into(),
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// Set the manifest directory.
    pub fn with_manifest_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_dir = path.into();
        self
    }

    /// Set the XRCatTool executable.
    pub fn with_cat_tool(mut self, path: impl Into<PathBuf>) -> Self {
        self.cat_tool = path.into();
        self
    }

    /// Set the WorkshopTool executable.
    pub fn with_upload_tool(mut self, path: impl Into<PathBuf>) -> Self {
        self.upload_tool = path.into();
        self
    }

    /// Replace the scaling factors.
    pub fn with_factors(mut self, factors: impl Into<Vec<u32>>) -> Self {
        self.factors = factors.into();
        self
    }

    /// Set the uploader change note.
    pub fn with_change_note(mut self, note: impl Into<String>) -> Self {
        self.change_note = note.into();
        self
    }

    /// Enable or disable uploading.
    pub fn with_upload(mut self, upload: bool) -> Self {
        self.upload = upload;
        self
    }

    /// Enable or disable strict tool exit handling.
    pub fn with_strict_tools(mut self, strict: bool) -> Self {
        self.strict_tools = strict;
        self
    }

    /// Set the self-generated output marker.
    pub fn with_generated_marker(mut self, marker: impl Into<String>) -> Self {
        self.generated_marker = marker.into();
        self
    }

    /// Output directory for one factor.
    pub fn factor_dir(&self, factor: u32) -> PathBuf {
        self.output_dir
            .join(format!("{}{}", self.output_prefix, factor))
    }

    /// Source manifest kept between runs for one factor.
    pub fn manifest_source(&self, factor: u32) -> PathBuf {
        self.manifest_dir.join(format!("content_{}.xml", factor))
    }

    /// Check the settings the extract phase depends on.
    pub fn validate_for_extract(&self) -> Result<(), ConfigError> {
        require_path(&self.game_dir, "paths.game_dir")?;
        require_path(&self.extract_dir, "paths.extract_dir")?;
        // the extract dir is wiped before unpacking
        ensure_outside(
            (self.extract_dir.as_path(), "paths.extract_dir"),
            (self.game_dir.as_path(), "paths.game_dir"),
        )?;
        compile_pattern(&self.include)?;
        for pattern in &self.exclude {
            compile_pattern(pattern)?;
        }
        Ok(())
    }

    /// Check the settings the build phase depends on.
    pub fn validate_for_build(&self) -> Result<(), ConfigError> {
        require_path(&self.extract_dir, "paths.extract_dir")?;
        require_path(&self.output_dir, "paths.output_dir")?;
        // the output root is wiped before building
        ensure_outside(
            (self.output_dir.as_path(), "paths.output_dir"),
            (self.extract_dir.as_path(), "paths.extract_dir"),
        )?;
        ensure_outside(
            (self.output_dir.as_path(), "paths.output_dir"),
            (self.manifest_dir.as_path(), "paths.manifest_dir"),
        )?;
        ensure_outside(
            (self.extract_dir.as_path(), "paths.extract_dir"),
            (self.output_dir.as_path(), "paths.output_dir"),
        )?;
        if self.factors.is_empty() {
            return Err(ConfigError::NoFactors);
        }
        if self.factors.contains(&0) {
            return Err(ConfigError::ZeroFactor);
        }
        Ok(())
    }
}

fn require_path(path: &Path, key: &'static str) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        Err(ConfigError::MissingPath(key))
    } else {
        Ok(())
    }
}

/// Fail if `outer` is `inner` or one of its ancestors.
fn ensure_outside(
    (outer, outer_key): (&Path, &'static str),
    (inner, inner_key): (&Path, &'static str),
) -> Result<(), ConfigError> {
    if normalized(inner).starts_with(normalized(outer)) {
        Err(ConfigError::Overlap {
            key: outer_key,
            path: outer.to_path_buf(),
            other: inner_key,
        })
    } else {
        Ok(())
    }
}

/// Absolute form of `path` with `.` and `..` resolved lexically.
fn normalized(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn compile_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}
