//! CLI command implementations.

pub mod build;
pub mod common;
pub mod config;
pub mod extract;
pub mod init;
mod output;
pub mod run;
