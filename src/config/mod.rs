use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::core::{
    errors::{Result, TrackerError},
    utils::{ensure_dir, replace_file, PathResolver},
};

/// User preferences for the tracker engine and its storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "Config::default_pinned_section_title")]
    pub pinned_section_title: String,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
    #[serde(default = "Config::default_backup_on_save")]
    pub backup_on_save: bool,
}

impl Config {
    fn default_pinned_section_title() -> String {
        "Pinned".into()
    }

    fn default_backup_retention() -> usize {
        5
    }

    fn default_backup_on_save() -> bool {
        true
    }

    /// Data directory: explicit override, then `HABIT_CORE_HOME`, then `~/.habit_core`.
    pub fn resolve_data_dir(&self) -> PathBuf {
        PathResolver::resolve_base(self.data_dir.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            pinned_section_title: Self::default_pinned_section_title(),
            backup_retention: Self::default_backup_retention(),
            backup_on_save: Self::default_backup_on_save(),
        }
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self::new(PathResolver::config_file_in(&base)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| {
            TrackerError::Config(format!("{}: {}", self.path.display(), err))
        })
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| TrackerError::Config(err.to_string()))?;
        replace_file(&self.path, &json)
    }
}
