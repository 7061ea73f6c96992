//! WorkshopTool, the content-distribution uploader.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{run_command, tool_name, ToolError, ToolStatus, Uploader};

/// Wrapper around `WorkshopTool update -path <dir> -changenote <note>`.
#[derive(Debug, Clone)]
pub struct WorkshopTool {
    program: PathBuf,
}

impl WorkshopTool {
    /// Create a wrapper for the executable at `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn update_args(mod_dir: &Path, change_note: &str) -> Vec<OsString> {
        vec![
            "update".into(),
            "-path".into(),
            mod_dir.as_os_str().to_owned(),
            "-changenote".into(),
            change_note.into(),
        ]
    }
}

impl Uploader for WorkshopTool {
    fn upload(&self, mod_dir: &Path, change_note: &str) -> Result<ToolStatus, ToolError> {
        let mut command = Command::new(&self.program);
        command.args(Self::update_args(mod_dir, change_note));
        run_command(&tool_name(&self.program), command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_args_keep_note_as_one_argument() {
        let args = WorkshopTool::update_args(
            Path::new("/mods/lf_cargo_extension_3"),
            "Update for \"TimeLines\"",
        );
        assert_eq!(args.len(), 5);
        assert_eq!(args[0], "update");
        assert_eq!(args[4], "Update for \"TimeLines\"");
    }
}
