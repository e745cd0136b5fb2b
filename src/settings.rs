//! Persistent user settings (`save.json` in the config directory).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::i18n::Language;

const APP_DIR: &str = "image-crop-studio";
const SETTINGS_FILE: &str = "save.json";

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Folder opened most recently.
    #[serde(default)]
    pub last_image_dir: Option<PathBuf>,

    #[serde(default)]
    pub language: Language,

    #[serde(default)]
    pub log_level: LogLevel,

    /// Width and height the target inputs start with.
    #[serde(default = "default_target")]
    pub default_target: (u32, u32),
}

fn default_target() -> (u32, u32) {
    (1024, 1024)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_image_dir: None,
            language: Language::default(),
            log_level: LogLevel::default(),
            default_target: default_target(),
        }
    }
}

impl Settings {
    /// `<config dir>/image-crop-studio/save.json`, falling back to
    /// `~/.config` when the platform has no config dir.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join(APP_DIR).join(SETTINGS_FILE))
        } else {
            dirs::home_dir().map(|home| home.join(".config").join(APP_DIR).join(SETTINGS_FILE))
        }
    }

    /// Reads settings from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            log::debug!("No settings file at {:?}", path);
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::debug!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn save_to_default_path(&self) -> Result<(), SettingsError> {
        let path = Self::default_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }
}
