//! Bellhop configuration system.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BellhopError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BellhopConfig {
    /// Path to the reminders database.
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// IANA timezone name used to interpret time expressions and render
    /// reminder times. Defaults to UTC; set yours (e.g. "Asia/Kolkata").
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_db_path() -> String {
    BellhopConfig::home_dir()
        .join("reminders.db")
        .to_string_lossy()
        .into_owned()
}

fn default_timezone() -> String {
    "UTC".into()
}

impl Default for BellhopConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            timezone: default_timezone(),
        }
    }
}

impl BellhopConfig {
    /// Load config from the default path (~/.bellhop/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BellhopError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| BellhopError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| BellhopError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Resolve the configured timezone.
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        chrono_tz::Tz::from_str(&self.timezone)
            .map_err(|_| BellhopError::Config(format!("Unknown timezone: {}", self.timezone)))
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Bellhop home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".bellhop")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve() {
        let config = BellhopConfig::default();
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.tz().unwrap(), chrono_tz::UTC);
        assert!(config.db_path.ends_with("reminders.db"));
    }

    #[test]
    fn parses_partial_toml() {
        let config: BellhopConfig = toml::from_str("timezone = \"Asia/Kolkata\"").unwrap();
        assert_eq!(config.tz().unwrap(), chrono_tz::Asia::Kolkata);
        // db_path falls back to the default
        assert!(config.db_path.ends_with("reminders.db"));
    }

    #[test]
    fn rejects_unknown_timezone() {
        let config: BellhopConfig = toml::from_str("timezone = \"Mars/Olympus\"").unwrap();
        assert!(config.tz().is_err());
    }
}
