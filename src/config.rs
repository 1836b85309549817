use std::{
    env,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(s) = path.to_str() {
        if let Some(stripped) = s.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if s == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

/// Configuration for the delivery-tracker CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackerConfig {
    /// Directory holding persisted expand state
    #[serde(default = "defaults::state_dir")]
    pub state_dir: PathBuf,
    /// Record kind opened when a line is activated
    #[serde(default = "defaults::record_model")]
    pub record_model: String,
    /// Summary text the backend sends when there are no deliveries
    #[serde(default = "defaults::empty_summary_text")]
    pub empty_summary_text: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            state_dir: defaults::state_dir(),
            record_model: defaults::record_model(),
            empty_summary_text: defaults::empty_summary_text(),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from the config file (if any) and environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_file_path()?,
        };
        tracing::debug!("loading delivery-tracker config from {:?}", config_path);

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else if path.is_some() {
            return Err(Error::Config(format!(
                "config file not found at {:?}",
                config_path
            )));
        } else {
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(path) = env::var("DELIVERY_TRACKER_STATE_DIR") {
            self.state_dir = expand_tilde(&PathBuf::from(path));
        }

        if let Ok(model) = env::var("DELIVERY_TRACKER_RECORD_MODEL") {
            self.record_model = model;
        }
    }

    /// Load configuration from a file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: TrackerConfig = serde_yaml::from_str(&content)?;

        config.state_dir = expand_tilde(&config.state_dir);
        if config.record_model.trim().is_empty() {
            return Err(Error::Config(format!(
                "record_model must not be empty in {:?}",
                path
            )));
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get default config file path
    pub fn config_file_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".config/delivery-tracker/config.yaml"))
            .ok_or_else(|| {
                Error::Config("could not determine home directory for config file".to_string())
            })
    }
}

mod defaults {
    use std::path::PathBuf;

    pub(crate) fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".local/state")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("delivery-tracker")
    }

    pub(crate) fn record_model() -> String {
        crate::navigation::DEFAULT_RECORD_MODEL.to_string()
    }

    pub(crate) fn empty_summary_text() -> String {
        crate::badge::EMPTY_SUMMARY_TEXT.to_string()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");

        let config = TrackerConfig {
            state_dir: dir.path().join("state"),
            record_model: "stock.picking".to_string(),
            empty_summary_text: "No deliveries".to_string(),
        };
        config.save(&config_path).unwrap();

        let loaded = TrackerConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        std::fs::write(&config_path, "empty_summary_text: Nothing yet\n").unwrap();

        let loaded = TrackerConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.empty_summary_text, "Nothing yet");
        assert_eq!(loaded.record_model, "stock.picking");
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        std::fs::write(&config_path, "colour: blue\n").unwrap();

        assert!(TrackerConfig::load_from_file(&config_path).is_err());
    }

    #[test]
    fn test_empty_record_model_rejected() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        std::fs::write(&config_path, "record_model: ''\n").unwrap();

        assert!(matches!(
            TrackerConfig::load_from_file(&config_path),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let result = TrackerConfig::load(Some(dir.path().join("missing.yaml").as_path()));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_tilde_expansion() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        std::fs::write(&config_path, "state_dir: ~/tracker-state\n").unwrap();

        let loaded = TrackerConfig::load_from_file(&config_path).unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(loaded.state_dir, home.join("tracker-state"));
        }
    }
}
