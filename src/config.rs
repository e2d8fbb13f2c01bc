use crate::error::ConfigError;
use crate::phase::PhaseSchedule;
use crate::settings::{AnimationSettings, ViewportMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TEXT: &str = "Sandesh K";

/// Complete application configuration for export/import
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Version field for future compatibility
    pub version: u32,
    /// Text to turn into particles
    pub text: String,
    pub viewport: ViewportMode,
    /// When each later phase begins
    pub schedule: PhaseSchedule,
    /// Per-frame physics constants
    pub settings: AnimationSettings,
    /// Fixed RNG seed for reproducible scatter and sparks
    pub seed: Option<u64>,
    /// Show the status bar under the canvas
    pub show_status: bool,
}

impl AppConfig {
    /// Default location: `<config dir>/particle-text/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("particle-text").join("config.json"))
    }

    /// Export config to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Import config from a JSON file; settings are clamped and the schedule validated
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: AppConfig = serde_json::from_str(&content)?;
        config.schedule.validate()?;
        config.settings = config.settings.sanitized();
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            text: DEFAULT_TEXT.to_string(),
            viewport: ViewportMode::default(),
            schedule: PhaseSchedule::default(),
            settings: AnimationSettings::default(),
            seed: None,
            show_status: false,
        }
    }
}
