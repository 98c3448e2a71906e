use std::path::PathBuf;

use serde::Deserialize;

use crate::irc::Casemapping;

/// Which store implementation backs every channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// One rusqlite file per channel.
    #[default]
    Sqlite,
    /// SeaORM over sqlx, one connection per channel.
    #[serde(alias = "sqlalchemy")]
    Orm,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(BackendKind::Sqlite),
            "orm" | "sqlalchemy" => Ok(BackendKind::Orm),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: BackendKind,
    /// Root under which one directory per channel is created.
    pub data_dir: PathBuf,
    /// File name of the store inside each channel directory.
    pub filename: String,
    /// Connection string prefix for the orm backend; the channel file is appended.
    pub connection: String,
    pub casemapping: Casemapping,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            data_dir: PathBuf::from("data"),
            filename: String::from("QuoteGrabs.db"),
            connection: String::from("sqlite://"),
            casemapping: Casemapping::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of messages `grab` can look back through.
    pub size: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { size: 1000 }
    }
}

/// Effective auto-grab settings for one channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RandomGrabberConfig {
    pub enabled: bool,
    pub minimum_words: usize,
    pub minimum_characters: usize,
    /// Seconds; the grabber aims for roughly one grab per speaker per period.
    pub average_time_between_grabs: u64,
}

impl Default for RandomGrabberConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            minimum_words: 3,
            minimum_characters: 8,
            average_time_between_grabs: 864_000,
        }
    }
}

/// Per-channel overrides; unset fields fall back to the global section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RandomGrabberOverride {
    pub enabled: Option<bool>,
    pub minimum_words: Option<usize>,
    pub minimum_characters: Option<usize>,
    pub average_time_between_grabs: Option<u64>,
}

impl RandomGrabberOverride {
    pub fn apply(&self, base: &RandomGrabberConfig) -> RandomGrabberConfig {
        RandomGrabberConfig {
            enabled: self.enabled.unwrap_or(base.enabled),
            minimum_words: self.minimum_words.unwrap_or(base.minimum_words),
            minimum_characters: self.minimum_characters.unwrap_or(base.minimum_characters),
            average_time_between_grabs: self
                .average_time_between_grabs
                .unwrap_or(base.average_time_between_grabs),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub random_grabber: RandomGrabberOverride,
}
