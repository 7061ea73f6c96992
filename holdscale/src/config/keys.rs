//! Typed access to configuration keys by `section.key` name.

use std::path::PathBuf;
use std::str::FromStr;

use super::{ConfigError, ConfigFile};

/// A single configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    GameDir,
    ExtractDir,
    OutputDir,
    ManifestDir,
    LogDir,
    CatTool,
    UploadTool,
    Strict,
    Include,
    Exclude,
    GeneratedMarker,
    Factors,
    OutputPrefix,
    ArchiveName,
    Upload,
    ChangeNote,
}

impl ConfigKey {
    /// Every key, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            Self::GameDir,
            Self::ExtractDir,
            Self::OutputDir,
            Self::ManifestDir,
            Self::LogDir,
            Self::CatTool,
            Self::UploadTool,
            Self::Strict,
            Self::Include,
            Self::Exclude,
            Self::GeneratedMarker,
            Self::Factors,
            Self::OutputPrefix,
            Self::ArchiveName,
            Self::Upload,
            Self::ChangeNote,
        ]
    }

    /// INI section holding this key.
    pub fn section(&self) -> &'static str {
        match self {
            Self::GameDir | Self::ExtractDir | Self::OutputDir | Self::ManifestDir | Self::LogDir => {
                "paths"
            }
            Self::CatTool | Self::UploadTool | Self::Strict => "tools",
            Self::Include | Self::Exclude | Self::GeneratedMarker => "extract",
            Self::Factors | Self::OutputPrefix | Self::ArchiveName | Self::Upload | Self::ChangeNote => {
                "build"
            }
        }
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            Self::GameDir => "game_dir",
            Self::ExtractDir => "extract_dir",
            Self::OutputDir => "output_dir",
            Self::ManifestDir => "manifest_dir",
            Self::LogDir => "log_dir",
            Self::CatTool => "cat_tool",
            Self::UploadTool => "upload_tool",
            Self::Strict => "strict",
            Self::Include => "include",
            Self::Exclude => "exclude",
            Self::GeneratedMarker => "generated_marker",
            Self::Factors => "factors",
            Self::OutputPrefix => "output_prefix",
            Self::ArchiveName => "archive_name",
            Self::Upload => "upload",
            Self::ChangeNote => "change_note",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text. Unset paths are empty.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            Self::GameDir => optional_path(&config.game_dir),
            Self::ExtractDir => optional_path(&config.extract_dir),
            Self::OutputDir => optional_path(&config.output_dir),
            Self::ManifestDir => config.manifest_dir.display().to_string(),
            Self::LogDir => optional_path(&config.log_dir),
            Self::CatTool => config.cat_tool.display().to_string(),
            Self::UploadTool => config.upload_tool.display().to_string(),
            Self::Strict => config.strict.to_string(),
            Self::Include => config.include.clone(),
            Self::Exclude => config.exclude.join(" "),
            Self::GeneratedMarker => config.generated_marker.clone(),
            Self::Factors => config
                .factors
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join(","),
            Self::OutputPrefix => config.output_prefix.clone(),
            Self::ArchiveName => config.archive_name.clone(),
            Self::Upload => config.upload.to_string(),
            Self::ChangeNote => config.change_note.clone(),
        }
    }

    /// Parse `value` and store it.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            Self::GameDir => config.game_dir = parse_optional_path(value),
            Self::ExtractDir => config.extract_dir = parse_optional_path(value),
            Self::OutputDir => config.output_dir = parse_optional_path(value),
            Self::ManifestDir => config.manifest_dir = self.parse_required_path(value)?,
            Self::LogDir => config.log_dir = parse_optional_path(value),
            Self::CatTool => config.cat_tool = self.parse_required_path(value)?,
            Self::UploadTool => config.upload_tool = self.parse_required_path(value)?,
            Self::Strict => config.strict = self.parse_bool(value)?,
            Self::Include => config.include = self.parse_required(value)?,
            Self::Exclude => {
                config.exclude = value.split_whitespace().map(str::to_string).collect()
            }
            Self::GeneratedMarker => config.generated_marker = value.to_string(),
            Self::Factors => config.factors = self.parse_factors(value)?,
            Self::OutputPrefix => config.output_prefix = self.parse_required(value)?,
            Self::ArchiveName => config.archive_name = self.parse_required(value)?,
            Self::Upload => config.upload = self.parse_bool(value)?,
            Self::ChangeNote => config.change_note = value.to_string(),
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    fn parse_required(&self, value: &str) -> Result<String, ConfigError> {
        if value.is_empty() {
            Err(self.invalid(value, "value must not be empty"))
        } else {
            Ok(value.to_string())
        }
    }

    fn parse_required_path(&self, value: &str) -> Result<PathBuf, ConfigError> {
        self.parse_required(value).map(PathBuf::from)
    }

    fn parse_bool(&self, value: &str) -> Result<bool, ConfigError> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(self.invalid(value, "expected true or false")),
        }
    }

    fn parse_factors(&self, value: &str) -> Result<Vec<u32>, ConfigError> {
        let factors = value
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(|part| match part.parse::<u32>() {
                Ok(0) => Err(self.invalid(value, "factors must be greater than zero")),
                Ok(factor) => Ok(factor),
                Err(_) => Err(self.invalid(value, format!("'{}' is not an integer", part))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        if factors.is_empty() {
            return Err(self.invalid(value, "at least one factor is required"));
        }
        Ok(factors)
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

fn optional_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

fn parse_optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_names() {
        assert_eq!("build.factors".parse::<ConfigKey>().unwrap(), ConfigKey::Factors);
        assert_eq!("paths.game_dir".parse::<ConfigKey>().unwrap(), ConfigKey::GameDir);
        assert!(matches!(
            "build.nope".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<String> = ConfigKey::all().iter().map(|k| k.name()).collect();
        let count = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), count);
    }

    #[test]
    fn test_factors_round_trip_text() {
        let mut config = ConfigFile::default();
        ConfigKey::Factors.set(&mut config, "2, 4 8").unwrap();
        assert_eq!(config.factors, vec![2, 4, 8]);
        assert_eq!(ConfigKey::Factors.get(&config), "2,4,8");
    }

    #[test]
    fn test_factors_reject_zero_and_garbage() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::Factors.set(&mut config, "2,0").is_err());
        assert!(ConfigKey::Factors.set(&mut config, "two").is_err());
        assert!(ConfigKey::Factors.set(&mut config, " , ").is_err());
        assert_eq!(config.factors, vec![2, 3, 5, 10]);
    }

    #[test]
    fn test_empty_path_unsets() {
        let mut config = ConfigFile::default();
        ConfigKey::OutputDir.set(&mut config, "/mods").unwrap();
        assert_eq!(config.output_dir, Some(PathBuf::from("/mods")));
        ConfigKey::OutputDir.set(&mut config, "").unwrap();
        assert_eq!(config.output_dir, None);
        assert_eq!(ConfigKey::OutputDir.get(&config), "");
    }

    #[test]
    fn test_empty_generated_marker_allowed() {
        let mut config = ConfigFile::default();
        ConfigKey::GeneratedMarker.set(&mut config, "").unwrap();
        assert_eq!(config.generated_marker, "");
        assert_eq!(config.to_mod_config().generated_marker, "");
    }

    #[test]
    fn test_exclude_is_space_separated() {
        let mut config = ConfigFile::default();
        ConfigKey::Exclude.set(&mut config, ".*_a.*   .*_b.*").unwrap();
        assert_eq!(config.exclude, vec![".*_a.*", ".*_b.*"]);
    }

    #[test]
    fn test_bool_values() {
        let mut config = ConfigFile::default();
        ConfigKey::Upload.set(&mut config, "Yes").unwrap();
        assert!(config.upload);
        ConfigKey::Upload.set(&mut config, "off").unwrap();
        assert!(!config.upload);
        assert!(ConfigKey::Upload.set(&mut config, "sometimes").is_err());
    }
}
