//! Configuration management for skylight.
//!
//! The config file holds the user's trigger. A missing file or a missing
//! field means the built-in default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::APP_NAME;
use crate::state_file;
use crate::trigger::Trigger;

/// Configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Global trigger, e.g. "option+space"
    #[serde(default, skip_serializing_if = "is_default_trigger")]
    pub trigger: Trigger,
}

fn is_default_trigger(trigger: &Trigger) -> bool {
    *trigger == Trigger::default()
}

impl Config {
    pub fn trigger(&self) -> Trigger {
        self.trigger
    }
}

/// Reads and writes `skylight.toml`.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager for the file in the user's config directory.
    pub fn new() -> Result<Self> {
        Ok(Self::with_config_dir(Self::default_config_dir()?))
    }

    pub fn with_config_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            config_path: dir.as_ref().join(format!("{APP_NAME}.toml")),
        }
    }

    /// Directory holding the config file and other persisted state.
    pub fn default_config_dir() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to retrieve configuration directory")?;
        Ok(config_dir.join(APP_NAME))
    }

    /// The config, or the defaults when no file exists yet. A file that does
    /// not parse is an error rather than silently reset.
    pub fn load(&self) -> Result<Config> {
        let config: Config = state_file::read(&self.config_path)
            .context("Failed to load config")?
            .unwrap_or_default();

        if config.trigger.modifiers.is_empty() {
            warn!(
                trigger = %config.trigger,
                "Configured trigger has no modifiers, every press of that key toggles the overlay"
            );
        }
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        state_file::write(&self.config_path, config).context("Failed to save config")
    }

    /// Stores a newly captured trigger, keeping `config` in step with the file.
    pub fn save_trigger(&self, config: &mut Config, trigger: Trigger) -> Result<()> {
        let previous = std::mem::replace(&mut config.trigger, trigger);
        self.save(config)?;
        info!(%previous, %trigger, "Trigger saved");
        Ok(())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::trigger::Modifiers;

    #[test]
    fn test_load_default_config() {
        let temp = tempdir().expect("Failed to create temp dir");
        let manager = ConfigManager::with_config_dir(temp.path());
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.trigger(), Trigger::default());
    }

    #[test]
    fn test_save_and_load_trigger() {
        let temp = tempdir().expect("Failed to create temp dir");
        let manager = ConfigManager::with_config_dir(temp.path());

        let config = Config {
            trigger: Trigger::new(Modifiers::CONTROL | Modifiers::SHIFT, 0),
        };
        manager.save(&config).unwrap();

        let written = fs::read_to_string(manager.config_path()).unwrap();
        assert_eq!(written.trim(), r#"trigger = "control+shift+a""#);

        let loaded = manager.load().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_default_trigger_is_not_written() {
        let temp = tempdir().expect("Failed to create temp dir");
        let manager = ConfigManager::with_config_dir(temp.path().join("nested"));

        manager.save(&Config::default()).unwrap();

        assert!(manager.config_path().exists());
        let written = fs::read_to_string(manager.config_path()).unwrap();
        assert!(written.trim().is_empty());
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_trigger_is_an_error() {
        let temp = tempdir().expect("Failed to create temp dir");
        let manager = ConfigManager::with_config_dir(temp.path());
        fs::write(manager.config_path(), r#"trigger = "hyper+space""#).unwrap();
        assert!(manager.load().is_err());
    }

    #[test]
    fn test_save_trigger_updates_file_and_config() {
        let temp = tempdir().expect("Failed to create temp dir");
        let manager = ConfigManager::with_config_dir(temp.path());
        let mut config = manager.load().unwrap();

        let captured = Trigger::new(Modifiers::COMMAND | Modifiers::SHIFT, 49);
        manager.save_trigger(&mut config, captured).unwrap();

        assert_eq!(config.trigger(), captured);
        assert_eq!(manager.load().unwrap().trigger(), captured);
    }
}
