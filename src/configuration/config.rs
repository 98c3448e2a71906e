use super::types::*;
use crate::error_handling::types::ConfigError;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Runtime configuration of the quote grabber.
///
/// Loaded from a TOML file with the following sections, every one of them
/// optional:
/// - `storage`: backend selection, data directory, per-channel file name and
///   the casemapping used to compare nicks and channel names
/// - `history`: how many recent messages `grab` may look back through
/// - `random_grabber`: global auto-grab settings
/// - `channels."<name>".random_grabber`: per-channel overrides
///
/// # Examples
///
/// ```
/// use quotegrabs::configuration::config::Config;
///
/// let config: Config = r##"
///     [storage]
///     backend = "orm"
///
///     [channels."#rust".random_grabber]
///     enabled = true
/// "##.parse().unwrap();
/// assert!(config.random_grabber("#RUST").enabled);
/// assert!(!config.random_grabber("#other").enabled);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub history: HistoryConfig,
    pub random_grabber: RandomGrabberConfig,
    pub channels: HashMap<String, ChannelConfig>,
}

impl Config {
    /// Reads and validates a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        content.parse()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.filename.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "storage.filename must not be empty".into(),
            ));
        }
        if self.storage.filename.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue(format!(
                "storage.filename '{}' must be a bare file name",
                self.storage.filename
            )));
        }
        if self.history.size == 0 {
            return Err(ConfigError::InvalidValue(
                "history.size must be at least 1".into(),
            ));
        }
        let mut seen = HashSet::new();
        for name in self.channels.keys() {
            if !seen.insert(self.storage.casemapping.to_lower(name)) {
                return Err(ConfigError::InvalidValue(format!(
                    "channel '{}' is configured more than once",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Auto-grab settings for `channel`, channel overrides applied.
    pub fn random_grabber(&self, channel: &str) -> RandomGrabberConfig {
        let casemapping = self.storage.casemapping;
        self.channels
            .iter()
            .find(|(name, _)| casemapping.nick_eq(name, channel))
            .map(|(_, chan)| chan.random_grabber.apply(&self.random_grabber))
            .unwrap_or_else(|| self.random_grabber.clone())
    }
}

impl std::str::FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(s).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
