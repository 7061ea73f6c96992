//! Reduction of an extracted tree to cargo-bearing definitions.
//!
//! Filtering runs in two phases. [`DefinitionFilter::scan`] classifies every
//! file without touching the tree and [`DefinitionFilter::apply`] deletes
//! what the scan marked. Empty directories are pruned in a separate pass.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::definition::{self, DefinitionError};
use crate::error::{ModError, ModResult};
use crate::fsutil;

/// Why a file is removed from the extracted tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalReason {
    /// The path belongs to output this tool generated earlier.
    GeneratedOutput,
    /// Not well-formed XML.
    Unparseable(String),
    /// No `properties/cargo` element.
    NoCargo,
    /// Cargo element without a `max` attribute.
    MissingMax,
    /// `max` is not an integer.
    NotNumeric(String),
}

impl std::fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GeneratedOutput => write!(f, "generated by a previous run"),
            Self::Unparseable(reason) => write!(f, "not valid XML ({})", reason),
            Self::NoCargo => write!(f, "no cargo value is found"),
            Self::MissingMax => write!(f, "cargo has no max value"),
            Self::NotNumeric(value) => write!(f, "cargo max '{}' is not a number", value),
        }
    }
}

/// Classification of an extracted tree, before anything is deleted.
#[derive(Debug, Clone, Default)]
pub struct FilterPlan {
    /// Definitions that carry a numeric cargo value.
    pub keep: Vec<PathBuf>,
    /// Files to delete, with the reason.
    pub remove: Vec<(PathBuf, RemovalReason)>,
}

/// Outcome of filtering an extracted tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSummary {
    /// Files left in place.
    pub kept: usize,
    /// Files deleted.
    pub removed: usize,
    /// Directories deleted because they became empty.
    pub empty_dirs_removed: usize,
}

/// Deletes extracted files that are not cargo-bearing definitions.
#[derive(Debug, Clone)]
pub struct DefinitionFilter {
    generated_marker: String,
}

impl DefinitionFilter {
    /// Create a filter that also discards paths containing `generated_marker`.
    ///
    /// An empty marker disables that check.
    pub fn new(generated_marker: impl Into<String>) -> Self {
        Self {
            generated_marker: generated_marker.into(),
        }
    }

    /// Scan, delete, then prune empty directories.
    pub fn run(&self, root: &Path) -> ModResult<FilterSummary> {
        let plan = self.scan(root)?;
        let mut summary = self.apply(&plan)?;
        summary.empty_dirs_removed = remove_empty_dirs(root)?;

        info!(
            kept = summary.kept,
            removed = summary.removed,
            empty_dirs = summary.empty_dirs_removed,
            "Filtered extracted definitions"
        );
        Ok(summary)
    }

    /// Classify every file below `root`.
    pub fn scan(&self, root: &Path) -> ModResult<FilterPlan> {
        let mut plan = FilterPlan::default();
        for path in fsutil::files_under(root)? {
            match self.classify(root, &path)? {
                None => plan.keep.push(path),
                Some(reason) => plan.remove.push((path, reason)),
            }
        }
        Ok(plan)
    }

    /// Delete the files a scan marked for removal.
    pub fn apply(&self, plan: &FilterPlan) -> ModResult<FilterSummary> {
        for (path, reason) in &plan.remove {
            if matches!(reason, RemovalReason::Unparseable(_)) {
                warn!("Removed {} as it is {}", path.display(), reason);
            } else {
                info!("Removed {} as {}", path.display(), reason);
            }
            fs::remove_file(path).map_err(|e| ModError::RemoveFailed {
                path: path.clone(),
                source: e,
            })?;
        }

        Ok(FilterSummary {
            kept: plan.keep.len(),
            removed: plan.remove.len(),
            empty_dirs_removed: 0,
        })
    }

    /// `None` keeps the file. Filesystem errors propagate.
    fn classify(&self, root: &Path, path: &Path) -> ModResult<Option<RemovalReason>> {
        if self.is_generated(root, path) {
            return Ok(Some(RemovalReason::GeneratedOutput));
        }

        match definition::read_cargo_max(path) {
            Ok(max) => {
                debug!(path = %path.display(), max, "Keeping definition");
                Ok(None)
            }
            Err(e @ DefinitionError::Read { .. }) => Err(e.into()),
            Err(DefinitionError::Parse { reason, .. }) => {
                Ok(Some(RemovalReason::Unparseable(reason)))
            }
            Err(DefinitionError::MissingCargo { .. }) => Ok(Some(RemovalReason::NoCargo)),
            Err(DefinitionError::MissingMax { .. }) => Ok(Some(RemovalReason::MissingMax)),
            Err(DefinitionError::InvalidNumber { value, .. }) => {
                Ok(Some(RemovalReason::NotNumeric(value)))
            }
            Err(e @ DefinitionError::Overflow { .. }) => Err(e.into()),
        }
    }

    fn is_generated(&self, root: &Path, path: &Path) -> bool {
        if self.generated_marker.is_empty() {
            return false;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        relative
            .to_string_lossy()
            .contains(self.generated_marker.as_str())
    }
}

/// Remove directories below `root` that contain nothing, deepest first.
///
/// `root` itself is kept even when empty. Returns the number removed.
pub fn remove_empty_dirs(root: &Path) -> ModResult<usize> {
    let mut removed = 0;
    for dir in fsutil::dirs_deepest_first(root)? {
        if fsutil::is_empty_dir(&dir)? {
            fs::remove_dir(&dir).map_err(|e| ModError::RemoveFailed {
                path: dir.clone(),
                source: e,
            })?;
            debug!("Removed empty directory: {}", dir.display());
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const WITH_CARGO: &str =
        r#"<macros><macro><properties><cargo max="100"/></properties></macro></macros>"#;
    const WITHOUT_CARGO: &str =
        r#"<macros><macro><properties><hull max="9"/></properties></macro></macros>"#;

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_scan_classifies_without_deleting() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let keep = write(root, "assets/storage_a_macro.xml", WITH_CARGO);
        let drop = write(root, "assets/storage_b_macro.xml", WITHOUT_CARGO);

        let plan = DefinitionFilter::new("lf_cargo_extension").scan(root).unwrap();
        assert_eq!(plan.keep, vec![keep]);
        assert_eq!(plan.remove, vec![(drop.clone(), RemovalReason::NoCargo)]);
        assert!(drop.exists());
    }

    #[test]
    fn test_run_removes_and_prunes() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let keep = write(root, "a/storage_a_macro.xml", WITH_CARGO);
        write(root, "b/c/storage_b_macro.xml", WITHOUT_CARGO);
        write(root, "b/broken.xml", "<macros><properties>");
        write(root, "d/no_max.xml", r#"<m><properties><cargo/></properties></m>"#);
        write(root, "d/nan.xml", r#"<m><properties><cargo max="x"/></properties></m>"#);

        let summary = DefinitionFilter::new("lf_cargo_extension").run(root).unwrap();
        assert_eq!(
            summary,
            FilterSummary {
                kept: 1,
                removed: 4,
                empty_dirs_removed: 3,
            }
        );
        assert!(keep.exists());
        assert!(!root.join("b").exists());
        assert!(!root.join("d").exists());
        assert!(root.exists());
    }

    #[test]
    fn test_generated_output_is_removed_even_with_cargo() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let generated = write(
            root,
            "extensions/lf_cargo_extension_2/storage_a_macro.xml",
            WITH_CARGO,
        );

        let plan = DefinitionFilter::new("lf_cargo_extension").scan(root).unwrap();
        assert_eq!(
            plan.remove,
            vec![(generated, RemovalReason::GeneratedOutput)]
        );
    }

    #[test]
    fn test_marker_only_checks_relative_path() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("lf_cargo_extension_work");
        write(&root, "storage_a_macro.xml", WITH_CARGO);

        let plan = DefinitionFilter::new("lf_cargo_extension").scan(&root).unwrap();
        assert_eq!(plan.keep.len(), 1);
    }

    #[test]
    fn test_empty_marker_disables_check() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "lf_cargo_extension_2/a.xml", WITH_CARGO);

        let plan = DefinitionFilter::new("").scan(root).unwrap();
        assert_eq!(plan.keep.len(), 1);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "a/storage_a_macro.xml", WITH_CARGO);
        write(root, "a/storage_b_macro.xml", WITHOUT_CARGO);
        write(root, "e/f/storage_c_macro.xml", WITHOUT_CARGO);

        let filter = DefinitionFilter::new("lf_cargo_extension");
        let first = filter.run(root).unwrap();
        assert_eq!(first.removed, 2);

        let second = filter.run(root).unwrap();
        assert_eq!(
            second,
            FilterSummary {
                kept: 1,
                removed: 0,
                empty_dirs_removed: 0,
            }
        );
    }

    #[test]
    fn test_survivors_all_have_cargo() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        for (i, content) in [WITH_CARGO, WITHOUT_CARGO, "garbage", WITH_CARGO]
            .iter()
            .enumerate()
        {
            write(root, &format!("dir{}/file{}.xml", i % 2, i), content);
        }

        DefinitionFilter::new("lf_cargo_extension").run(root).unwrap();
        for path in fsutil::files_under(root).unwrap() {
            assert!(definition::read_cargo_max(&path).is_ok());
        }
    }

    #[test]
    fn test_non_utf8_content_does_not_abort_filter() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let latin1 = root.join("storage_latin1_macro.xml");
        fs::write(
            &latin1,
            b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\
              <macros><macro name=\"Lagerger\xe4t\"><properties>\
              <cargo max=\"80\"/></properties></macro></macros>",
        )
        .unwrap();
        let binary = root.join("storage_binary_macro.xml");
        fs::write(&binary, b"\x80\x81\xfe\xff").unwrap();

        let summary = DefinitionFilter::new("lf_cargo_extension").run(root).unwrap();
        assert_eq!(summary.kept, 1);
        assert_eq!(summary.removed, 1);
        assert!(latin1.exists());
        assert!(!binary.exists());
    }

    #[test]
    fn test_remove_empty_dirs_keeps_root() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("x").join("y").join("z")).unwrap();

        assert_eq!(remove_empty_dirs(temp.path()).unwrap(), 3);
        assert!(temp.path().exists());
        assert!(fsutil::is_empty_dir(temp.path()).unwrap());
    }
}
