//! External tool capabilities.
//!
//! The pipeline never runs a binary directly. Unpacking, packing and
//! uploading go through the [`Unpacker`], [`Packer`] and [`Uploader`] traits
//! so that tests can substitute fakes. [`CatTool`] and [`WorkshopTool`] are
//! the real implementations.
//!
//! A tool that starts but exits non-zero is not an error at this level: the
//! invocation returns a [`ToolStatus`] and the caller decides. A tool that
//! cannot be started at all is a [`ToolError::Spawn`].

mod cat_tool;
mod workshop;

use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;

pub use cat_tool::CatTool;
pub use workshop::WorkshopTool;

/// Errors raised by external tool invocations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool binary could not be started.
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool exited unsuccessfully and strict mode is enabled.
    #[error("{tool} exited with {}: {stderr}", describe_code(.code))]
    Failed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Outcome of a completed tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    /// Name of the tool that ran.
    pub tool: String,
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
    /// Captured standard error, trimmed.
    pub stderr: String,
}

impl ToolStatus {
    /// A successful run with no diagnostics.
    pub fn success(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            code: Some(0),
            stderr: String::new(),
        }
    }

    /// A run that exited with the given code.
    pub fn exited(tool: impl Into<String>, code: i32, stderr: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            code: Some(code),
            stderr: stderr.into(),
        }
    }

    /// Whether the tool exited with status zero.
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Apply the exit-status policy.
    ///
    /// Non-strict mode logs a failed status and hands it back; strict mode
    /// turns it into [`ToolError::Failed`].
    pub fn enforce(self, strict: bool) -> Result<ToolStatus, ToolError> {
        if self.is_success() {
            return Ok(self);
        }
        if strict {
            return self.into_result();
        }
        tracing::warn!(
            tool = %self.tool,
            code = ?self.code,
            stderr = %self.stderr,
            "External tool reported failure, continuing"
        );
        Ok(self)
    }

    /// Convert a failed status into an error.
    pub fn into_result(self) -> Result<ToolStatus, ToolError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ToolError::Failed {
                tool: self.tool,
                code: self.code,
                stderr: self.stderr,
            })
        }
    }
}

/// Extracts matching files from a packed archive.
pub trait Unpacker {
    /// Unpack files from `archive` into `out_dir`.
    ///
    /// Only entries matching `include` and none of `exclude` are extracted.
    fn unpack(
        &self,
        archive: &Path,
        out_dir: &Path,
        include: &str,
        exclude: &[String],
    ) -> Result<ToolStatus, ToolError>;
}

/// Bundles a directory tree into a packed archive.
pub trait Packer {
    /// Pack every file under `in_dir` into `archive`.
    fn pack(&self, in_dir: &Path, archive: &Path) -> Result<ToolStatus, ToolError>;
}

/// Publishes a finished mod directory.
pub trait Uploader {
    /// Upload the mod in `mod_dir` with the given change note.
    fn upload(&self, mod_dir: &Path, change_note: &str) -> Result<ToolStatus, ToolError>;
}

/// Run a prepared command to completion.
///
/// Stdout is discarded and stderr captured. No timeout is applied.
pub(crate) fn run_command(tool: &str, mut command: Command) -> Result<ToolStatus, ToolError> {
    tracing::debug!(command = ?command, "Calling external tool");

    let output = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| ToolError::Spawn {
            tool: tool.to_string(),
            source: e,
        })?;

    Ok(ToolStatus {
        tool: tool.to_string(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// Display name of a tool path (its file name).
pub(crate) fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| program.display().to_string())
}
