//! Cargo patch generation.
//!
//! Each surviving definition gets a diff patch at the same relative path:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <diff><replace sel="//cargo/@max">200</replace></diff>
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::{debug, info};

use crate::definition;
use crate::error::{ModError, ModResult};
use crate::fsutil;

/// Selector every patch replaces.
pub const CARGO_SELECTOR: &str = "//cargo/@max";

/// A patch written for one definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPatch {
    /// Path relative to both the source and destination roots.
    pub relative: PathBuf,
    /// Cargo value in the source definition.
    pub original: i64,
    /// Value the patch writes.
    pub scaled: i64,
}

/// Render the patch document replacing the cargo value with `new_max`.
pub fn render_patch(new_max: i64) -> quick_xml::Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    let value = new_max.to_string();

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Text(BytesText::new("\n")))?;
    writer.write_event(Event::Start(BytesStart::new("diff")))?;
    writer.write_event(Event::Start(
        BytesStart::new("replace").with_attributes([("sel", CARGO_SELECTOR)]),
    ))?;
    writer.write_event(Event::Text(BytesText::new(&value)))?;
    writer.write_event(Event::End(BytesEnd::new("replace")))?;
    writer.write_event(Event::End(BytesEnd::new("diff")))?;

    Ok(writer.into_inner())
}

/// Write a patch file, creating parent directories on demand.
pub fn write_patch_file(path: &Path, new_max: i64) -> ModResult<()> {
    debug!("Writing to {}, new cargo {}", path.display(), new_max);
    if let Some(parent) = path.parent() {
        fsutil::create_dir_all(parent)?;
    }

    let write_failed = |source: io::Error| ModError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let patch = render_patch(new_max).map_err(|e| write_failed(io::Error::other(e)))?;
    fs::write(path, patch).map_err(write_failed)
}

/// Writes one scaled patch tree from a filtered definition tree.
#[derive(Debug, Clone, Copy)]
pub struct CargoPatchGenerator {
    factor: u32,
}

impl CargoPatchGenerator {
    /// Create a generator for a factor greater than zero.
    pub fn new(factor: u32) -> ModResult<Self> {
        if factor == 0 {
            return Err(ModError::InvalidConfig(
                "scaling factor must be greater than zero".to_string(),
            ));
        }
        Ok(Self { factor })
    }

    /// The scaling factor.
    pub fn factor(&self) -> u32 {
        self.factor
    }

    /// Write a patch under `dest_root` for every file under `source_root`.
    ///
    /// Stops at the first definition that fails to parse or lacks a numeric
    /// cargo value; patches written before that point remain on disk.
    pub fn generate(&self, source_root: &Path, dest_root: &Path) -> ModResult<Vec<WrittenPatch>> {
        let mut written = Vec::new();

        for source in fsutil::files_under(source_root)? {
            let relative = source
                .strip_prefix(source_root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| PathBuf::from(source.file_name().unwrap_or_default()));

            let original = definition::read_cargo_max(&source)?;
            let scaled = definition::scale_cargo(&source, original, self.factor)?;
            write_patch_file(&dest_root.join(&relative), scaled)?;

            written.push(WrittenPatch {
                relative,
                original,
                scaled,
            });
        }

        info!(
            factor = self.factor,
            patches = written.len(),
            dest = %dest_root.display(),
            "Generated cargo patches"
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::DefinitionError;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn definition(max: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<macros>
  <macro name="storage_arg_l_trans_container_01_a_macro" class="storage">
    <properties>
      <cargo max="{}" tags="container" />
    </properties>
  </macro>
</macros>
"#,
            max
        )
    }

    #[test]
    fn test_render_patch() {
        let xml = String::from_utf8(render_patch(200).unwrap()).unwrap();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <diff><replace sel=\"//cargo/@max\">200</replace></diff>"
        );
    }

    #[test]
    fn test_write_patch_file_reports_path() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("assets");
        fs::write(&blocker, "").unwrap();

        let target = blocker.join("storage_a_macro.xml");
        assert!(matches!(
            write_patch_file(&target, 10),
            Err(ModError::CreateDirFailed { .. })
        ));

        let dir_target = temp.path().join("as_dir");
        fs::create_dir_all(&dir_target).unwrap();
        match write_patch_file(&dir_target, 10) {
            Err(ModError::WriteFailed { path, .. }) => assert_eq!(path, dir_target),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_zero_factor_rejected() {
        assert!(CargoPatchGenerator::new(0).is_err());
        assert_eq!(CargoPatchGenerator::new(3).unwrap().factor(), 3);
    }

    #[test]
    fn test_generate_mirrors_tree() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("extracted");
        let dest = temp.path().join("lf_cargo_extension_2");
        fs::create_dir_all(source.join("assets").join("props")).unwrap();
        fs::write(source.join("storage_root_macro.xml"), definition("10")).unwrap();
        fs::write(
            source.join("assets").join("props").join("storage_a_macro.xml"),
            definition("100"),
        )
        .unwrap();

        let written = CargoPatchGenerator::new(2)
            .unwrap()
            .generate(&source, &dest)
            .unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(
            written[0],
            WrittenPatch {
                relative: PathBuf::from("assets/props/storage_a_macro.xml"),
                original: 100,
                scaled: 200,
            }
        );

        let patch = fs::read_to_string(
            dest.join("assets").join("props").join("storage_a_macro.xml"),
        )
        .unwrap();
        assert!(patch.contains(r#"<replace sel="//cargo/@max">200</replace>"#));
        assert!(dest.join("storage_root_macro.xml").exists());
    }

    #[test]
    fn test_generate_revalidates_definitions() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("extracted");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("a.xml"), definition("5")).unwrap();
        fs::write(source.join("b.xml"), "<macros><properties/></macros>").unwrap();

        let err = CargoPatchGenerator::new(2)
            .unwrap()
            .generate(&source, &temp.path().join("out"))
            .unwrap_err();

        assert!(matches!(
            err,
            ModError::Definition(DefinitionError::MissingCargo { .. })
        ));
        assert!(temp.path().join("out").join("a.xml").exists());
        assert!(!temp.path().join("out").join("b.xml").exists());
    }

    #[test]
    fn test_generate_reports_parse_errors() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("extracted");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("a.xml"), "<macros><properties>").unwrap();

        let err = CargoPatchGenerator::new(2)
            .unwrap()
            .generate(&source, &temp.path().join("out"))
            .unwrap_err();
        assert!(matches!(
            err,
            ModError::Definition(DefinitionError::Parse { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_patch_value_is_product(max in 0i64..10_000_000, factor in 1u32..1000) {
            let temp = TempDir::new().unwrap();
            let source = temp.path().join("src");
            fs::create_dir_all(&source).unwrap();
            fs::write(source.join("storage_macro.xml"), definition(&max.to_string())).unwrap();

            let written = CargoPatchGenerator::new(factor)
                .unwrap()
                .generate(&source, &temp.path().join("dst"))
                .unwrap();

            prop_assert_eq!(written[0].scaled, max * i64::from(factor));
            let patch = fs::read_to_string(temp.path().join("dst").join("storage_macro.xml")).unwrap();
            let expected = format!(">{}</replace>", max * i64::from(factor));
            prop_assert!(patch.contains(&expected));
        }
    }
}
