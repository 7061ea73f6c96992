//! Mod manifest (`content.xml`) version stamping.
//!
//! Each factor keeps its own manifest between runs. Every build bumps the
//! root `version` attribute by [`VERSION_STEP`] and copies the manifest into
//! the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;
use tracing::info;

use crate::config::MANIFEST_FILE_NAME;
use crate::definition::strip_bom;
use crate::error::{ModError, ModResult};

/// Amount added to the manifest version per stamp.
pub const VERSION_STEP: i64 = 10;

const VERSION_ATTR: &[u8] = b"version";

/// Errors raised while stamping a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to parse manifest {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("manifest {} has no root element", .path.display())]
    NoRoot { path: PathBuf },

    #[error("manifest {} has no version attribute", .path.display())]
    MissingVersion { path: PathBuf },

    #[error("manifest version '{value}' in {} is not an integer", .path.display())]
    InvalidVersion { path: PathBuf, value: String },

    #[error("manifest version {version} in {} cannot be advanced", .path.display())]
    Overflow { path: PathBuf, version: i64 },
}

/// Version change made by one stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionBump {
    pub previous: i64,
    pub current: i64,
}

/// Advances the version of a manifest file in place.
#[derive(Debug, Clone, Copy)]
pub struct VersionStamper {
    step: i64,
}

impl Default for VersionStamper {
    fn default() -> Self {
        Self { step: VERSION_STEP }
    }
}

impl VersionStamper {
    /// Create a stamper using the standard step.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump the version of the manifest at `path` and rewrite it.
    ///
    /// Every call advances the version, including repeated calls in one run.
    pub fn stamp(&self, path: &Path) -> ModResult<VersionBump> {
        let xml = fs::read_to_string(path).map_err(|e| ModError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let (rewritten, bump) = self.rewrite(path, &xml)?;

        fs::write(path, rewritten).map_err(|e| ModError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!("Updating {} to version {}", path.display(), bump.current);
        Ok(bump)
    }

    /// Produce the stamped document.
    ///
    /// Any existing declaration is replaced with a UTF-8 one. Everything
    /// else is written back as read.
    fn rewrite(&self, path: &Path, xml: &str) -> Result<(Vec<u8>, VersionBump), ManifestError> {
        let xml_error = |reason: String| ManifestError::Parse {
            path: path.to_path_buf(),
            reason,
        };

        let mut reader = Reader::from_str(strip_bom(xml));
        let mut writer = Writer::new(Vec::new());
        let mut bump: Option<VersionBump> = None;
        let mut had_decl = false;
        let mut started = false;
        let mut depth = 0usize;

        write(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
        )
        .map_err(xml_error)?;

        loop {
            let event = reader.read_event().map_err(|e| xml_error(e.to_string()))?;

            match &event {
                Event::Start(_) => depth += 1,
                Event::End(_) => depth = depth.saturating_sub(1),
                _ => {}
            }

            let event = match event {
                Event::Eof => break,
                Event::Decl(_) => {
                    had_decl = true;
                    continue;
                }
                Event::Start(e) if bump.is_none() => {
                    let (root, b) = self.stamp_root(path, &e, reader.decoder())?;
                    bump = Some(b);
                    Event::Start(root)
                }
                Event::Empty(e) if bump.is_none() => {
                    let (root, b) = self.stamp_root(path, &e, reader.decoder())?;
                    bump = Some(b);
                    Event::Empty(root)
                }
                other => other,
            };

            if !started {
                started = true;
                if !had_decl {
                    // root on its own line; an existing declaration brings its own newline
                    write(&mut writer, Event::Text(BytesText::new("\n"))).map_err(xml_error)?;
                }
            }
            write(&mut writer, event).map_err(xml_error)?;
        }

        let bump = bump.ok_or_else(|| ManifestError::NoRoot {
            path: path.to_path_buf(),
        })?;
        if depth != 0 {
            return Err(xml_error(format!(
                "unexpected end of document with {} unclosed element(s)",
                depth
            )));
        }
        Ok((writer.into_inner(), bump))
    }

    /// Copy of the root element with its version advanced.
    fn stamp_root(
        &self,
        path: &Path,
        root: &BytesStart<'_>,
        decoder: Decoder,
    ) -> Result<(BytesStart<'static>, VersionBump), ManifestError> {
        let name = String::from_utf8_lossy(root.name().as_ref()).into_owned();
        let mut stamped = BytesStart::new(name);
        let mut bump = None;

        for attr in root.attributes() {
            let attr = attr.map_err(|e| ManifestError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .decode_and_unescape_value(decoder)
                .map_err(|e| ManifestError::Parse {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?
                .into_owned();

            if attr.key.as_ref() == VERSION_ATTR && bump.is_none() {
                let previous =
                    value
                        .trim()
                        .parse::<i64>()
                        .map_err(|_| ManifestError::InvalidVersion {
                            path: path.to_path_buf(),
                            value: value.clone(),
                        })?;
                let current = previous.checked_add(self.step).ok_or_else(|| {
                    ManifestError::Overflow {
                        path: path.to_path_buf(),
                        version: previous,
                    }
                })?;
                stamped.push_attribute((key.as_str(), current.to_string().as_str()));
                bump = Some(VersionBump { previous, current });
            } else {
                stamped.push_attribute((key.as_str(), value.as_str()));
            }
        }

        let bump = bump.ok_or_else(|| ManifestError::MissingVersion {
            path: path.to_path_buf(),
        })?;
        Ok((stamped, bump))
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), String> {
    writer.write_event(event).map_err(|e| e.to_string())
}

/// Copy the stamped manifest into `out_dir` as `content.xml`.
pub fn install_manifest(source: &Path, out_dir: &Path) -> ModResult<PathBuf> {
    let dest = out_dir.join(MANIFEST_FILE_NAME);
    fs::copy(source, &dest).map_err(|e| ModError::CopyFailed {
        from: source.to_path_buf(),
        to: dest.clone(),
        source: e,
    })?;
    Ok(dest)
}
