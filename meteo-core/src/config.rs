use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

use crate::error::WeatherError;

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Top-level configuration stored on disk.
///
/// A single OpenWeather credential serves the forecast, geocoding and tile
/// endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Example TOML:
    /// api_key = "..."
    pub api_key: Option<String>,
}

impl Config {
    /// Resolved API key: environment override first, then the config file.
    /// Blank values count as absent.
    pub fn api_key(&self) -> Option<String> {
        env::var(API_KEY_ENV)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .or_else(|| {
                self.api_key
                    .as_ref()
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
            })
    }

    /// The credential precondition: checked eagerly, before any network call.
    pub fn require_api_key(&self) -> Result<String, WeatherError> {
        self.api_key().ok_or(WeatherError::MissingCredential)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn set_api_key(&mut self, key: String) {
        self.api_key = Some(key);
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "meteo", "meteo-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.require_api_key().unwrap_err();

        assert!(matches!(err, WeatherError::MissingCredential));
        assert!(err.to_string().contains("meteo configure"));
    }

    #[test]
    fn blank_api_key_counts_as_absent() {
        let cfg = Config {
            api_key: Some("   ".to_string()),
        };
        assert!(!cfg.has_api_key());
    }

    #[test]
    fn set_api_key_and_resolve() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        assert!(cfg.has_api_key());
        assert_eq!(cfg.require_api_key().expect("key must resolve"), "KEY");
    }

    #[test]
    fn stored_key_is_trimmed() {
        let cfg = Config {
            api_key: Some("  KEY \n".to_string()),
        };
        assert_eq!(cfg.api_key().as_deref(), Some("KEY"));
    }
}
