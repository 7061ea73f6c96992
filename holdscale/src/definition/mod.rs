//! Cargo lookup in macro definition files.
//!
//! A storage macro carries its capacity at `.//properties/cargo/@max`:
//!
//! ```xml
//! <macros>
//!   <macro name="storage_par_l_trans_container_03_a_macro" class="storage">
//!     <component ref="generic_storage" />
//!     <properties>
//!       <cargo max="25000" tags="container" />
//!     </properties>
//!   </macro>
//! </macros>
//! ```
//!
//! The `properties` element must sit below the root and `cargo` must be its
//! direct child. The first match in document order is used. The whole
//! document is always parsed, so a hit in a truncated file is still an error.

mod error;

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::encoding::Decoder;
use quick_xml::Reader;

pub use error::{DefinitionError, DefinitionResult};

const PROPERTIES: &[u8] = b"properties";
const CARGO: &[u8] = b"cargo";
const MAX_ATTR: &str = "max";

/// What a definition document says about its cargo element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CargoLookup {
    /// No `properties/cargo` element.
    Missing,
    /// A cargo element without a `max` attribute.
    NoMax,
    /// The raw, unescaped `max` attribute value.
    Max(String),
}

/// Scan an XML document for its cargo element.
///
/// The text encoding is taken from a byte order mark or the XML
/// declaration, defaulting to UTF-8. Returns an error message if the
/// document is not well-formed.
pub fn lookup_cargo(xml: impl AsRef<[u8]>) -> Result<CargoLookup, String> {
    let mut reader = Reader::from_reader(xml.as_ref());
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut seen_root = false;
    let mut root_closed = false;
    let mut found: Option<CargoLookup> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if root_closed {
                    return Err(junk_after_root(&e));
                }
                if found.is_none() && is_cargo(&e, &stack) {
                    found = Some(max_of(&e, reader.decoder())?);
                }
                seen_root = true;
                stack.push(e.name().as_ref().to_vec());
            }
            Ok(Event::Empty(e)) => {
                if root_closed {
                    return Err(junk_after_root(&e));
                }
                if found.is_none() && is_cargo(&e, &stack) {
                    found = Some(max_of(&e, reader.decoder())?);
                }
                seen_root = true;
                root_closed = stack.is_empty();
            }
            Ok(Event::End(_)) => {
                stack.pop();
                root_closed = stack.is_empty();
            }
            Ok(Event::Text(t)) if root_closed && !t.iter().all(u8::is_ascii_whitespace) => {
                return Err("junk after document element: text".to_string());
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(format!(
                    "{} (at byte {})",
                    e,
                    reader.buffer_position()
                ))
            }
        }
    }

    if !seen_root {
        return Err("document has no root element".to_string());
    }
    if let Some(open) = stack.last() {
        return Err(format!(
            "unexpected end of document inside <{}>",
            String::from_utf8_lossy(open)
        ));
    }

    Ok(found.unwrap_or(CargoLookup::Missing))
}

/// Read and validate the cargo `max` value of a definition file.
///
/// Only filesystem failures are [`DefinitionError::Read`]; undecodable
/// content is a [`DefinitionError::Parse`].
pub fn read_cargo_max(path: &Path) -> DefinitionResult<i64> {
    let xml = fs::read(path).map_err(|e| DefinitionError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let lookup = lookup_cargo(&xml).map_err(|reason| DefinitionError::Parse {
        path: path.to_path_buf(),
        reason,
    })?;

    match lookup {
        CargoLookup::Missing => Err(DefinitionError::MissingCargo {
            path: path.to_path_buf(),
        }),
        CargoLookup::NoMax => Err(DefinitionError::MissingMax {
            path: path.to_path_buf(),
        }),
        CargoLookup::Max(value) => {
            value
                .trim()
                .parse::<i64>()
                .map_err(|_| DefinitionError::InvalidNumber {
                    path: path.to_path_buf(),
                    value,
                })
        }
    }
}

/// Multiply a cargo value by a scaling factor.
pub fn scale_cargo(path: &Path, max: i64, factor: u32) -> DefinitionResult<i64> {
    max.checked_mul(i64::from(factor))
        .ok_or_else(|| DefinitionError::Overflow {
            path: path.to_path_buf(),
            max,
            factor,
        })
}

fn is_cargo(element: &BytesStart<'_>, stack: &[Vec<u8>]) -> bool {
    // stack[0] is the root; `properties` has to be a descendant of it
    element.name().as_ref() == CARGO
        && stack.len() >= 2
        && stack.last().is_some_and(|parent| parent == PROPERTIES)
}

fn max_of(element: &BytesStart<'_>, decoder: Decoder) -> Result<CargoLookup, String> {
    let attr = element
        .try_get_attribute(MAX_ATTR)
        .map_err(|e| e.to_string())?;

    match attr {
        Some(attr) => {
            let value = attr
                .decode_and_unescape_value(decoder)
                .map_err(|e| e.to_string())?;
            Ok(CargoLookup::Max(value.into_owned()))
        }
        None => Ok(CargoLookup::NoMax),
    }
}

fn junk_after_root(element: &BytesStart<'_>) -> String {
    format!(
        "junk after document element: <{}>",
        String::from_utf8_lossy(element.name().as_ref())
    )
}

pub(crate) fn strip_bom(xml: &str) -> &str {
    xml.strip_prefix('\u{feff}').unwrap_or(xml)
}
