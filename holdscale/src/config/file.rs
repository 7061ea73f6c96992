//! INI configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;

use super::{ConfigError, ConfigKey, ModConfig};

/// Default location of the configuration file.
///
/// `<config_dir>/holdscale/config.ini`, falling back to the working
/// directory when the platform has no configuration directory.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("holdscale")
        .join("config.ini")
}

/// Persisted settings, one field per [`ConfigKey`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub game_dir: Option<PathBuf>,
    pub extract_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub manifest_dir: PathBuf,
    /// Directory for the rolling log file; no file logging when unset.
    pub log_dir: Option<PathBuf>,
    pub cat_tool: PathBuf,
    pub upload_tool: PathBuf,
    pub strict: bool,
    pub include: String,
    pub exclude: Vec<String>,
    pub generated_marker: String,
    pub factors: Vec<u32>,
    pub output_prefix: String,
    pub archive_name: String,
    pub upload: bool,
    pub change_note: String,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let defaults = ModConfig::default();
        Self {
            game_dir: None,
            extract_dir: None,
            output_dir: None,
            manifest_dir: defaults.manifest_dir,
            log_dir: None,
            cat_tool: defaults.cat_tool,
            upload_tool: defaults.upload_tool,
            strict: defaults.strict_tools,
            include: defaults.include,
            exclude: defaults.exclude,
            generated_marker: defaults.generated_marker,
            factors: defaults.factors,
            output_prefix: defaults.output_prefix,
            archive_name: defaults.archive_name,
            upload: defaults.upload,
            change_note: defaults.change_note,
        }
    }
}

impl ConfigFile {
    /// Load the configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load the configuration from `path`.
    ///
    /// Keys missing from the file keep their defaults. Unknown keys are
    /// ignored so that older binaries can read newer files.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }

        ini.write_to_file(path).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Build the pipeline configuration these settings describe.
    ///
    /// Unset paths stay empty and are caught by the phase validators.
    pub fn to_mod_config(&self) -> ModConfig {
        ModConfig {
            game_dir: self.game_dir.clone().unwrap_or_default(),
            extract_dir: self.extract_dir.clone().unwrap_or_default(),
            output_dir: self.output_dir.clone().unwrap_or_default(),
            manifest_dir: self.manifest_dir.clone(),
            cat_tool: self.cat_tool.clone(),
            upload_tool: self.upload_tool.clone(),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            generated_marker: self.generated_marker.clone(),
            factors: self.factors.clone(),
            output_prefix: self.output_prefix.clone(),
            archive_name: self.archive_name.clone(),
            change_note: self.change_note.clone(),
            upload: self.upload,
            strict_tools: self.strict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.game_dir = Some(PathBuf::from("/games/X4 Foundations"));
        config.factors = vec![3, 7];
        config.upload = true;
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded.game_dir, Some(PathBuf::from("/games/X4 Foundations")));
        assert_eq!(loaded.extract_dir, None);
        assert_eq!(loaded.factors, vec![3, 7]);
        assert!(loaded.upload);
        assert_eq!(loaded.exclude, config.exclude);
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(&path, "[build]\nfactors = 4\n\n[other]\nunknown = 1\n").unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded.factors, vec![4]);
        assert_eq!(loaded.archive_name, "ext_01.cat");
        assert_eq!(loaded.cat_tool, PathBuf::from("XRCatTool"));
    }

    #[test]
    fn test_empty_generated_marker_loads() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(&path, "[extract]\ngenerated_marker =\n").unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded.generated_marker, "");
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(&path, "[tools]\nstrict = maybe\n").unwrap();

        let err = ConfigFile::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = ConfigFile::load_from(&temp.path().join("absent.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_to_mod_config() {
        let mut file = ConfigFile::default();
        file.extract_dir = Some(PathBuf::from("/extracted"));
        file.strict = true;

        let config = file.to_mod_config();
        assert_eq!(config.extract_dir, PathBuf::from("/extracted"));
        assert!(config.game_dir.as_os_str().is_empty());
        assert!(config.strict_tools);
    }
}
