//! holdscale - cargo capacity mods for X4 storage modules
//!
//! This library extracts storage macro definitions from the game's packed
//! `.cat` archives, generates diff patches that scale each module's cargo
//! capacity by a set of factors, and packages one mod per factor.
//!
//! # Overview
//!
//! The workflow:
//! 1. Unpack storage macros from every archive ([`extract::ArchiveExtractor`])
//! 2. Keep only definitions with a cargo value ([`extract::DefinitionFilter`])
//! 3. Per factor, write scaled patches ([`patch::CargoPatchGenerator`])
//! 4. Bump and install the mod manifest ([`manifest::VersionStamper`])
//! 5. Pack the patch tree and drop intermediate directories ([`package`])
//! 6. Optionally upload the mod ([`tools::Uploader`])
//!
//! [`pipeline::Pipeline`] ties the steps together. External executables are
//! reached through the traits in [`tools`].

pub mod config;
pub mod definition;
pub mod error;
pub mod extract;
mod fsutil;
pub mod logging;
pub mod manifest;
pub mod package;
pub mod patch;
pub mod pipeline;
pub mod tools;

pub use error::{ModError, ModResult};

/// Version of the library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
