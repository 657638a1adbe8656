//! TOML-based application configuration.
//!
//! Stores the reminder settings consumed by the suggestion engine and the
//! notification scheduler:
//! - bedtime and the offset used by the bedtime strategy
//! - the fixed fallback start time
//! - the smart-reminder mode and on/off switch
//!
//! Configuration is stored at `~/.config/fastwatch/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::data_dir;

/// Strategy selection for the suggested-start engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionMode {
    /// Moving average when enough history exists, else bedtime.
    Auto,
    /// Moving average, with an annotated bedtime fallback when history is thin.
    MovingAverageOnly,
    /// Always derive from the configured bedtime.
    BedtimeOnly,
    /// Always the configured fixed start time.
    FixedTime,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/fastwatch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bedtime as minutes since local midnight, if the user configured one.
    #[serde(default)]
    pub bedtime_minutes: Option<u32>,
    /// Hours before bedtime that the bedtime strategy suggests starting.
    #[serde(default = "default_bedtime_offset_hours")]
    pub bedtime_offset_hours: u32,
    /// Fixed fallback start time as minutes since local midnight.
    #[serde(default = "default_fixed_start_minutes")]
    pub fixed_fasting_start_minutes: u32,
    #[serde(default = "default_mode")]
    pub smart_reminder_mode: SuggestionMode,
    #[serde(default)]
    pub smart_reminders_enabled: bool,
    /// Goal used when starting a fast without naming one.
    #[serde(default = "default_goal_id")]
    pub default_goal_id: String,
}

fn default_bedtime_offset_hours() -> u32 {
    3
}
fn default_fixed_start_minutes() -> u32 {
    19 * 60 // 19:00
}
fn default_mode() -> SuggestionMode {
    SuggestionMode::Auto
}
fn default_goal_id() -> String {
    "16:8".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bedtime_minutes: None,
            bedtime_offset_hours: default_bedtime_offset_hours(),
            fixed_fasting_start_minutes: default_fixed_start_minutes(),
            smart_reminder_mode: default_mode(),
            smart_reminders_enabled: false,
            default_goal_id: default_goal_id(),
        }
    }
}

impl Config {
    /// Load configuration from the default path, or defaults if absent.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from an explicit path, or defaults if absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from(path),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from(path),
            message: e.to_string(),
        })
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: PathBuf::from(path),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: PathBuf::from(path),
            message: e.to_string(),
        })
    }

    fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("<data_dir>"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.bedtime_minutes, None);
        assert_eq!(config.bedtime_offset_hours, 3);
        assert_eq!(config.fixed_fasting_start_minutes, 19 * 60);
        assert_eq!(config.smart_reminder_mode, SuggestionMode::Auto);
        assert!(!config.smart_reminders_enabled);
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.bedtime_minutes = Some(22 * 60 + 30);
        config.smart_reminder_mode = SuggestionMode::BedtimeOnly;
        config.smart_reminders_enabled = true;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.bedtime_minutes, Some(22 * 60 + 30));
        assert_eq!(loaded.smart_reminder_mode, SuggestionMode::BedtimeOnly);
        assert!(loaded.smart_reminders_enabled);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "bedtime_minutes = 1380\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.bedtime_minutes, Some(1380));
        assert_eq!(loaded.bedtime_offset_hours, 3);
        assert_eq!(loaded.default_goal_id, "16:8");
    }
}
