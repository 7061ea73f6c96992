//! Init command - initialize configuration file.

use std::path::Path;

use holdscale::config::ConfigFile;

use crate::error::CliError;

/// Run the init command.
pub fn run(config_path: &Path) -> Result<(), CliError> {
    if config_path.exists() {
        println!("Configuration file already exists:");
        println!("  {}", config_path.display());
        println!();
        println!("Use 'holdscale config set' to change individual settings.");
        return Ok(());
    }

    ConfigFile::default().save_to(config_path)?;

    println!("Configuration file: {}", config_path.display());
    println!();
    println!("Set paths.game_dir, paths.extract_dir and paths.output_dir before running.");
    println!("CLI arguments override config file values when specified.");
    Ok(())
}
