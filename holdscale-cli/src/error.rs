//! CLI error type.

use std::fmt;

use holdscale::config::ConfigError;
use holdscale::ModError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded, saved or understood.
    Config(String),

    /// A pipeline phase failed.
    Pipeline(ModError),

    /// One or more factors did not build.
    FactorsFailed(Vec<u32>),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Pipeline(e) => write!(f, "{}", e),
            CliError::FactorsFailed(factors) => {
                let list: Vec<String> = factors.iter().map(|f| f.to_string()).collect();
                write!(f, "Failed to build factor(s): {}", list.join(", "))
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<ModError> for CliError {
    fn from(e: ModError) -> Self {
        CliError::Pipeline(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factors_failed_display() {
        let err = CliError::FactorsFailed(vec![3, 10]);
        assert_eq!(err.to_string(), "Failed to build factor(s): 3, 10");
    }

    #[test]
    fn test_from_config_error() {
        let err: CliError = ConfigError::NoFactors.into();
        assert!(matches!(err, CliError::Config(_)));
    }
}
