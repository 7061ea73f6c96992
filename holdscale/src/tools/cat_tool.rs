//! XRCatTool, the game's archive packer and unpacker.
//!
//! ```text
//! XRCatTool -in <archive> -out <dir> -include <pattern> -exclude <pattern>...
//! XRCatTool -in <dir> -out <archive>
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{run_command, tool_name, Packer, ToolError, ToolStatus, Unpacker};

/// Shell-free wrapper around the XRCatTool executable.
#[derive(Debug, Clone)]
pub struct CatTool {
    program: PathBuf,
}

impl CatTool {
    /// Create a wrapper for the executable at `program`.
    ///
    /// A bare name is resolved through `PATH`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Path of the wrapped executable.
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn unpack_args(
        archive: &Path,
        out_dir: &Path,
        include: &str,
        exclude: &[String],
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-in".into(),
            archive.as_os_str().to_owned(),
            "-out".into(),
            out_dir.as_os_str().to_owned(),
            "-include".into(),
            include.into(),
        ];
        if !exclude.is_empty() {
            args.push("-exclude".into());
            args.extend(exclude.iter().map(OsString::from));
        }
        args
    }

    fn pack_args(in_dir: &Path, archive: &Path) -> Vec<OsString> {
        vec![
            "-in".into(),
            in_dir.as_os_str().to_owned(),
            "-out".into(),
            archive.as_os_str().to_owned(),
        ]
    }
}

impl Unpacker for CatTool {
    fn unpack(
        &self,
        archive: &Path,
        out_dir: &Path,
        include: &str,
        exclude: &[String],
    ) -> Result<ToolStatus, ToolError> {
        let mut command = Command::new(&self.program);
        command.args(Self::unpack_args(archive, out_dir, include, exclude));
        run_command(&tool_name(&self.program), command)
    }
}

impl Packer for CatTool {
    fn pack(&self, in_dir: &Path, archive: &Path) -> Result<ToolStatus, ToolError> {
        let mut command = Command::new(&self.program);
        command.args(Self::pack_args(in_dir, archive));
        run_command(&tool_name(&self.program), command)
    }
}
