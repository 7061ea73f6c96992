//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, and `config path` commands
//! for viewing and modifying configuration settings from the command line.

use std::path::Path;

use clap::Subcommand;
use holdscale::config::ConfigKey;

use crate::error::CliError;
use crate::runner::load_config;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., build.factors)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., build.factors)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand against the file at `config_path`.
pub fn run(config_path: &Path, command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(config_path, &key),
        ConfigCommands::Set { key, value } => run_set(config_path, &key, &value),
        ConfigCommands::List => run_list(config_path),
        ConfigCommands::Path => run_path(config_path),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'holdscale config list' to see available keys.",
            key
        ))
    })
}

/// Get a configuration value.
fn run_get(config_path: &Path, key: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let config = load_config(config_path)?;
    let value = config_key.get(&config);

    if value.is_empty() {
        println!("(not set)");
    } else {
        println!("{}", value);
    }

    Ok(())
}

/// Set a configuration value.
fn run_set(config_path: &Path, key: &str, value: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;

    let mut config = load_config(config_path)?;
    config_key.set(&mut config, value)?;
    config.save_to(config_path)?;

    println!("Set {} = {}", config_key.name(), config_key.get(&config));

    Ok(())
}

/// List all configuration settings.
fn run_list(config_path: &Path) -> Result<(), CliError> {
    let config = load_config(config_path)?;

    println!("Configuration Settings");
    println!("======================");
    println!();

    let mut current_section = "";

    for key in ConfigKey::all() {
        let section = key.section();

        if section != current_section {
            if !current_section.is_empty() {
                println!();
            }
            println!("[{}]", section);
            current_section = section;
        }

        let value = key.get(&config);
        let key_name = key.key_name();

        if value.is_empty() {
            println!("  {} = (not set)", key_name);
        } else {
            println!("  {} = {}", key_name, value);
        }
    }

    Ok(())
}

/// Show the configuration file path.
fn run_path(config_path: &Path) -> Result<(), CliError> {
    println!("{}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_persists_value() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");

        run_set(&path, "build.factors", "4, 8").unwrap();
        run_set(&path, "paths.game_dir", "/games/X4").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.factors, vec![4, 8]);
        assert_eq!(
            config.game_dir.as_deref(),
            Some(std::path::Path::new("/games/X4"))
        );
    }

    #[test]
    fn test_unknown_key() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        assert!(matches!(
            run_get(&path, "build.nope"),
            Err(CliError::Config(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_invalid_value_not_saved() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        assert!(run_set(&path, "tools.strict", "maybe").is_err());
        assert!(!path.exists());
    }
}
