//! Filesystem helpers that attach paths to I/O errors.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{ModError, ModResult};

/// Create a directory and its parents.
pub(crate) fn create_dir_all(path: &Path) -> ModResult<()> {
    fs::create_dir_all(path).map_err(|e| ModError::CreateDirFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Remove a directory tree if it exists.
///
/// Returns whether anything was removed.
pub(crate) fn remove_dir_if_exists(path: &Path) -> ModResult<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ModError::RemoveFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// All regular files below `root`, in sorted order.
pub(crate) fn files_under(root: &Path) -> ModResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// All directories below `root`, children before their parents.
pub(crate) fn dirs_deepest_first(root: &Path) -> ModResult<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    Ok(dirs)
}

/// Whether a directory has no entries.
pub(crate) fn is_empty_dir(path: &Path) -> ModResult<bool> {
    let mut entries = fs::read_dir(path).map_err(|e| ModError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(entries.next().is_none())
}

fn walk_error(root: &Path, e: walkdir::Error) -> ModError {
    let path = e.path().unwrap_or(root).to_path_buf();
    ModError::ReadFailed {
        path,
        source: io::Error::from(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_remove_dir_if_exists() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("gone");
        fs::create_dir_all(dir.join("inner")).unwrap();

        assert!(remove_dir_if_exists(&dir).unwrap());
        assert!(!dir.exists());
        assert!(!remove_dir_if_exists(&dir).unwrap());
    }

    #[test]
    fn test_files_under_sorted_and_recursive() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("b")).unwrap();
        fs::write(temp.path().join("b").join("z.xml"), "").unwrap();
        fs::write(temp.path().join("a.xml"), "").unwrap();

        let files = files_under(temp.path()).unwrap();
        assert_eq!(
            files,
            vec![temp.path().join("a.xml"), temp.path().join("b").join("z.xml")]
        );
    }

    #[test]
    fn test_files_under_missing_root() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            files_under(&temp.path().join("absent")),
            Err(ModError::ReadFailed { .. })
        ));
    }

    #[test]
    fn test_dirs_deepest_first() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a").join("b")).unwrap();

        let dirs = dirs_deepest_first(temp.path()).unwrap();
        assert_eq!(
            dirs,
            vec![temp.path().join("a").join("b"), temp.path().join("a")]
        );
    }

    #[test]
    fn test_is_empty_dir() {
        let temp = TempDir::new().unwrap();
        assert!(is_empty_dir(temp.path()).unwrap());
        fs::write(temp.path().join("f"), "").unwrap();
        assert!(!is_empty_dir(temp.path()).unwrap());
    }
}
