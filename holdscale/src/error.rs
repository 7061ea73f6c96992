//! Error types for the mod build pipeline.

use std::io;
use std::path::PathBuf;

use crate::config::ConfigError;
use crate::definition::DefinitionError;
use crate::manifest::ManifestError;
use crate::tools::ToolError;

/// Result type for pipeline operations.
pub type ModResult<T> = Result<T, ModError>;

/// Errors that can occur while extracting, patching or packaging a mod.
#[derive(Debug)]
pub enum ModError {
    /// Failed to read a file or directory.
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a file.
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to create a directory.
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// Failed to remove a file or directory.
    RemoveFailed { path: PathBuf, source: io::Error },

    /// Failed to copy a file.
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// A definition file could not be read or lacked a usable cargo value.
    Definition(DefinitionError),

    /// The manifest could not be stamped.
    Manifest(ManifestError),

    /// An external tool could not be run or reported failure.
    Tool(ToolError),

    /// Invalid configuration.
    InvalidConfig(String),
}

impl std::fmt::Display for ModError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadFailed { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            Self::WriteFailed { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            Self::CreateDirFailed { path, source } => {
                write!(
                    f,
                    "failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::RemoveFailed { path, source } => {
                write!(f, "failed to remove {}: {}", path.display(), source)
            }
            Self::CopyFailed { from, to, source } => {
                write!(
                    f,
                    "failed to copy {} to {}: {}",
                    from.display(),
                    to.display(),
                    source
                )
            }
            Self::Definition(e) => write!(f, "{}", e),
            Self::Manifest(e) => write!(f, "{}", e),
            Self::Tool(e) => write!(f, "{}", e),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ModError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFailed { source, .. } => Some(source),
            Self::WriteFailed { source, .. } => Some(source),
            Self::CreateDirFailed { source, .. } => Some(source),
            Self::RemoveFailed { source, .. } => Some(source),
            Self::CopyFailed { source, .. } => Some(source),
            Self::Definition(e) => Some(e),
            Self::Manifest(e) => Some(e),
            Self::Tool(e) => Some(e),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl From<DefinitionError> for ModError {
    fn from(e: DefinitionError) -> Self {
        ModError::Definition(e)
    }
}

impl From<ManifestError> for ModError {
    fn from(e: ManifestError) -> Self {
        ModError::Manifest(e)
    }
}

impl From<ToolError> for ModError {
    fn from(e: ToolError) -> Self {
        ModError::Tool(e)
    }
}

impl From<ConfigError> for ModError {
    fn from(e: ConfigError) -> Self {
        ModError::InvalidConfig(e.to_string())
    }
}
