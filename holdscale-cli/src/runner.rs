//! Shared setup for commands that run the pipeline.

use std::path::{Path, PathBuf};

use holdscale::config::{ConfigFile, ModConfig};
use holdscale::logging::{self, WorkerGuard};
use tracing::info;

use crate::error::CliError;

/// Loaded configuration plus the logging it configured.
pub struct CliRunner {
    config_path: PathBuf,
    config: ConfigFile,
    _log_guard: Option<WorkerGuard>,
}

impl CliRunner {
    /// Load configuration from `config_path` and install logging.
    pub fn new(config_path: &Path, verbose: bool) -> Result<Self, CliError> {
        let config = load_config(config_path)?;
        let log_guard = logging::init(verbose, config.log_dir.as_deref());

        Ok(Self {
            config_path: config_path.to_path_buf(),
            config,
            _log_guard: log_guard,
        })
    }

    /// Log the command being run.
    pub fn log_startup(&self, command: &str) {
        info!(
            version = holdscale::VERSION,
            command,
            config = %self.config_path.display(),
            "holdscale starting"
        );
    }

    /// Pipeline configuration from the file, before CLI overrides.
    pub fn mod_config(&self) -> ModConfig {
        self.config.to_mod_config()
    }
}

/// Load the configuration file, or defaults when it does not exist.
pub fn load_config(path: &Path) -> Result<ConfigFile, CliError> {
    if path.exists() {
        Ok(ConfigFile::load_from(path)?)
    } else {
        Ok(ConfigFile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(&temp.path().join("config.ini")).unwrap();
        assert_eq!(config.factors, vec![2, 3, 5, 10]);
        assert!(config.game_dir.is_none());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[build]\nfactors = 2,zero\n").unwrap();
        assert!(matches!(load_config(&path), Err(CliError::Config(_))));
    }
}
