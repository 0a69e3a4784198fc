//! Settings file for the labeler.
//!
//! Stored as versioned JSON under the user's config directory. Missing fields
//! take their defaults, so older files keep loading.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_UNDO_HISTORY;

/// Format version written by this build. Files with a higher version are
/// rejected.
pub const CONFIG_VERSION: u32 = 1;

const CONFIG_DIR: &str = "cascade-labeler";
const CONFIG_FILE: &str = "cascade-labeler.json";

/// Verbosity for the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub version: u32,
    #[serde(default)]
    pub preferences: UserPreferences,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    pub log_level: LogLevel,
    /// Annotation edits kept for undo.
    pub undo_history: usize,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            undo_history: DEFAULT_UNDO_HISTORY,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: UserPreferences::default(),
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion(config.version));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// `<config dir>/cascade-labeler/cascade-labeler.json`, falling back to
    /// `~/.config` when the platform has no config dir.
    pub fn default_path() -> Option<PathBuf> {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))?;
        Some(base.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::from_json(&std::fs::read_to_string(path)?)?;
        log::debug!("Config loaded from {}", path.display());
        Ok(config)
    }

    /// Load the file at [`AppConfig::default_path`].
    ///
    /// `Ok(None)` when there is no file; a file that exists but cannot be read
    /// or parsed is an error, so the caller can report it.
    pub fn load_from_default_path() -> Result<Option<Self>, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path).map(Some),
            _ => Ok(None),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::debug!("Config saved to {}", path.display());
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Config version {0} is newer than this build supports")]
    UnsupportedVersion(u32),
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
