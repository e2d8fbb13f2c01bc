use crate::error::ConfigError;
use crate::phase::PhaseSchedule;
use crate::settings::AnimationSettings;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A named pacing: phase schedule plus physics constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub schedule: PhaseSchedule,
    pub settings: AnimationSettings,
}

impl Preset {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schedule: PhaseSchedule,
        settings: AnimationSettings,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schedule,
            settings,
        }
    }
}

/// Manager for loading and saving presets
pub struct PresetManager {
    /// Built-in presets that ship with the app
    pub builtin: Vec<Preset>,
    /// User-created presets loaded from disk
    pub user: Vec<Preset>,
    dir: Option<PathBuf>,
}

impl Default for PresetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetManager {
    /// Built-ins plus user presets from the standard config directory
    pub fn new() -> Self {
        Self::with_dir(Self::default_dir())
    }

    /// Built-ins plus user presets from `dir` (None disables user presets)
    pub fn with_dir(dir: Option<PathBuf>) -> Self {
        let mut manager = Self {
            builtin: builtin_presets(),
            user: Vec::new(),
            dir,
        };
        manager.load_user_presets();
        manager
    }

    /// Get the presets directory path
    fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("particle-text").join("presets"))
    }

    /// Load user presets from disk, skipping files that do not parse
    fn load_user_presets(&mut self) {
        let Some(dir) = self.dir.as_ref() else {
            return;
        };
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            match fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|content| serde_json::from_str::<Preset>(&content).map_err(|e| e.to_string()))
            {
                Ok(preset) if preset.schedule.validate().is_ok() => self.user.push(Preset {
                    settings: preset.settings.sanitized(),
                    ..preset
                }),
                Ok(preset) => warn!("skipping preset {:?}: invalid schedule", preset.name),
                Err(e) => warn!("skipping preset file {}: {}", path.display(), e),
            }
        }
        self.user.sort_by(|a, b| a.name.cmp(&b.name));
    }

    fn preset_path(dir: &Path, name: &str) -> PathBuf {
        let filename = name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect::<String>();
        dir.join(format!("{}.json", filename))
    }

    /// Save a preset to disk, replacing a user preset of the same name
    pub fn save_preset(&mut self, mut preset: Preset) -> Result<(), ConfigError> {
        preset.schedule.validate()?;
        preset.settings = preset.settings.sanitized();
        let dir = self.dir.clone().ok_or(ConfigError::NoConfigDir)?;

        fs::create_dir_all(&dir).map_err(|source| ConfigError::Io {
            path: dir.clone(),
            source,
        })?;

        let path = Self::preset_path(&dir, &preset.name);
        let json = serde_json::to_string_pretty(&preset)?;
        fs::write(&path, json).map_err(|source| ConfigError::Io { path, source })?;

        self.user.retain(|p| p.name != preset.name);
        self.user.push(preset);
        Ok(())
    }

    /// Delete a user preset
    pub fn delete_preset(&mut self, name: &str) -> Result<(), ConfigError> {
        let dir = self.dir.clone().ok_or(ConfigError::NoConfigDir)?;
        self.user.retain(|p| p.name != name);

        let path = Self::preset_path(&dir, name);
        if path.exists() {
            fs::remove_file(&path).map_err(|source| ConfigError::Io { path, source })?;
        }
        Ok(())
    }

    /// Get all presets (builtin + user)
    pub fn all_presets(&self) -> impl Iterator<Item = &Preset> {
        self.builtin.iter().chain(self.user.iter())
    }

    /// Find a preset by name; user presets shadow built-ins
    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.user
            .iter()
            .chain(self.builtin.iter())
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

fn builtin_presets() -> Vec<Preset> {
    vec![
        Preset::new(
            "Brisk",
            "1s forming, 2s glowing, 2.5s dispersing",
            PhaseSchedule::BRISK,
            AnimationSettings::default(),
        ),
        Preset::new(
            "Classic",
            "The slower 6.5s landing sequence",
            PhaseSchedule::CLASSIC,
            AnimationSettings::default(),
        ),
        Preset::new(
            "Lingering",
            "Long glow with a gentle pulse",
            PhaseSchedule {
                glow_at_ms: 1200,
                disperse_at_ms: 5200,
                complete_at_ms: 7500,
            },
            AnimationSettings {
                glow_amplitude: 0.04,
                glow_frequency: 3.0,
                spark_probability: 0.005,
                ..Default::default()
            },
        ),
        Preset::new(
            "Storm",
            "Frequent sparks and a hard burst",
            PhaseSchedule::BRISK,
            AnimationSettings {
                spark_probability: 0.06,
                spark_spread: 1.0,
                disperse_force: 0.5,
                fade_factor: 0.97,
                ..Default::default()
            },
        ),
    ]
}
