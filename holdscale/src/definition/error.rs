//! Errors raised while reading cargo values from definition files.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for definition reads.
pub type DefinitionResult<T> = Result<T, DefinitionError>;

/// Errors that can occur while reading a definition's cargo value.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// The file could not be read from disk.
    #[error("failed to read definition {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not well-formed XML.
    #[error("failed to parse {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    /// No `properties/cargo` element below the root.
    #[error("did not find a cargo element in {}", .path.display())]
    MissingCargo { path: PathBuf },

    /// The cargo element has no `max` attribute.
    #[error("did not find a max value for {}", .path.display())]
    MissingMax { path: PathBuf },

    /// The `max` attribute is not an integer.
    #[error("cargo max '{value}' in {} is not an integer", .path.display())]
    InvalidNumber { path: PathBuf, value: String },

    /// Scaling the value does not fit in 64 bits.
    #[error("cargo max {max} in {} overflows when scaled by {factor}", .path.display())]
    Overflow {
        path: PathBuf,
        max: i64,
        factor: u32,
    },
}

impl DefinitionError {
    /// Whether the error came from the filesystem rather than the file content.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Read { .. })
    }
}
