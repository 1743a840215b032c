//! Configuration loader.
//!
//! Reads an optional TOML file and deserializes it into [`Config`]. Missing
//! keys take their defaults; a missing or malformed file yields the defaults
//! with a warning.

use crate::domain::ConfigError;
use chrono::TimeDelta;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 10;
const DEFAULT_RESET_GRACE_MILLIS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Webhook receiving completed forms.
    pub webhook_url: Option<String>,
    /// File holding the autosaved snapshot.
    pub storage_path: PathBuf,
    pub log_path: PathBuf,
    pub autosave_interval_secs: u64,
    /// How long autosave and restore stay suppressed after a reset.
    pub reset_grace_millis: u64,
}

impl Default for Config {
    fn default() -> Self {
        let dir = data_dir();
        Self {
            webhook_url: None,
            storage_path: dir.join("form.json"),
            log_path: dir.join("cosmicnav.log"),
            autosave_interval_secs: DEFAULT_AUTOSAVE_INTERVAL_SECS,
            reset_grace_millis: DEFAULT_RESET_GRACE_MILLIS,
        }
    }
}

/// Per-user data directory for the application, falling back to the working directory.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cosmicnav")
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cosmicnav")
        .join("config.toml")
}

impl Config {
    /// Loads `path`. A missing file is not an error and yields the defaults.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config found at {}, using defaults", path.display());
                return Ok(Config::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Like [`load`](Self::load), but falls back to the defaults on any error.
    pub fn load_or_default(path: &Path) -> Config {
        Self::load(path).unwrap_or_else(|err| {
            tracing::warn!("{err}, using defaults");
            Config::default()
        })
    }

    pub fn autosave_interval(&self) -> TimeDelta {
        TimeDelta::seconds(self.autosave_interval_secs.clamp(1, 86_400) as i64)
    }

    pub fn reset_grace(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.reset_grace_millis.min(60_000) as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.autosave_interval(), TimeDelta::seconds(10));
        assert_eq!(config.reset_grace(), TimeDelta::milliseconds(500));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
webhook_url = "https://hooks.example.com/chart"
autosave_interval_secs = 30
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.webhook_url.as_deref(),
            Some("https://hooks.example.com/chart")
        );
        assert_eq!(config.autosave_interval(), TimeDelta::seconds(30));
        assert_eq!(config.reset_grace_millis, 500);
        assert_eq!(config.storage_path, Config::default().storage_path);
    }

    #[test]
    fn test_invalid_file_is_parse_error_and_falls_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "this is not { valid toml !!!").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
        assert_eq!(Config::load_or_default(&path), Config::default());
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = Config {
            autosave_interval_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.autosave_interval(), TimeDelta::seconds(1));
    }
}
