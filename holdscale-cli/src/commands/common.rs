//! Arguments shared across CLI commands.
//!
//! Each flag overrides the matching configuration file value when given.

use std::path::PathBuf;

use clap::Args;
use holdscale::config::ModConfig;

/// Locations of the game archives and the extracted tree.
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Game installation holding the packed archives
    #[arg(long, value_name = "DIR")]
    pub game_dir: Option<PathBuf>,

    /// Directory for the extracted and filtered definitions
    #[arg(long, value_name = "DIR")]
    pub extract_dir: Option<PathBuf>,
}

impl SourceArgs {
    /// Apply the overrides to `config`.
    pub fn apply(&self, mut config: ModConfig) -> ModConfig {
        if let Some(ref dir) = self.game_dir {
            config.game_dir = dir.clone();
        }
        if let Some(ref dir) = self.extract_dir {
            config.extract_dir = dir.clone();
        }
        config
    }
}

/// Options of the per-factor build phase.
#[derive(Debug, Clone, Default, Args)]
pub struct BuildArgs {
    /// Root directory for the per-factor mods
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory holding content_<factor>.xml manifests
    #[arg(long, value_name = "DIR")]
    pub manifest_dir: Option<PathBuf>,

    /// Scaling factor to build; repeat for several (default: from config)
    #[arg(long = "factor", value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub factors: Vec<u32>,

    /// Upload each finished mod
    #[arg(long)]
    pub upload: bool,

    /// Change note passed to the uploader
    #[arg(long, value_name = "TEXT")]
    pub change_note: Option<String>,
}

impl BuildArgs {
    /// Apply the overrides to `config`.
    pub fn apply(&self, mut config: ModConfig) -> ModConfig {
        if let Some(ref dir) = self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(ref dir) = self.manifest_dir {
            config = config.with_manifest_dir(dir);
        }
        if !self.factors.is_empty() {
            config = config.with_factors(self.factors.clone());
        }
        if self.upload {
            config = config.with_upload(true);
        }
        if let Some(ref note) = self.change_note {
            config = config.with_change_note(note);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_args_keep_config() {
        let config = ModConfig::new("/game", "/extracted", "/out").with_upload(true);
        let applied = BuildArgs::default().apply(SourceArgs::default().apply(config.clone()));

        assert_eq!(applied.game_dir, config.game_dir);
        assert_eq!(applied.factors, config.factors);
        assert!(applied.upload);
        assert_eq!(applied.change_note, "Update for TimeLines");
    }

    #[test]
    fn test_args_override_config() {
        let source = SourceArgs {
            game_dir: Some(PathBuf::from("/other/game")),
            extract_dir: None,
        };
        let build = BuildArgs {
            output_dir: Some(PathBuf::from("/other/out")),
            manifest_dir: Some(PathBuf::from("/manifests")),
            factors: vec![4],
            upload: true,
            change_note: Some("Update for 7.0".to_string()),
        };

        let config = build.apply(source.apply(ModConfig::new("/game", "/extracted", "/out")));
        assert_eq!(config.game_dir, PathBuf::from("/other/game"));
        assert_eq!(config.extract_dir, PathBuf::from("/extracted"));
        assert_eq!(config.output_dir, PathBuf::from("/other/out"));
        assert_eq!(config.manifest_source(4), PathBuf::from("/manifests/content_4.xml"));
        assert_eq!(config.factors, vec![4]);
        assert!(config.upload);
        assert_eq!(config.change_note, "Update for 7.0");
    }
}
