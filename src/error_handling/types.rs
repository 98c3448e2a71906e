use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::InvalidValue(e) => write!(f, "Invalid configuration value: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Failures raised by the quote stores.
///
/// `NotFound` is the only variant callers are expected to recover from; it
/// means the query matched no row. `ConnectionFailed`, `ReadFailed` and
/// `WriteFailed` describe engine or file failures for a single request.
#[derive(Debug)]
pub enum StorageError {
    NotFound,
    MissingCapability(String),
    ConnectionFailed(String),
    ReadFailed(String),
    WriteFailed(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound)
    }

    pub(crate) fn write(err: impl fmt::Display) -> Self {
        StorageError::WriteFailed(err.to_string())
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound => write!(f, "No matching record"),
            StorageError::MissingCapability(e) => write!(f, "Missing storage capability: {}", e),
            StorageError::ConnectionFailed(e) => write!(f, "Storage connection failed: {}", e),
            StorageError::ReadFailed(e) => write!(f, "Storage read failed: {}", e),
            StorageError::WriteFailed(e) => write!(f, "Storage write failed: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => StorageError::NotFound,
            e => StorageError::ReadFailed(e.to_string()),
        }
    }
}

#[cfg(feature = "orm")]
impl From<sea_orm::DbErr> for StorageError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::RecordNotFound(_) => StorageError::NotFound,
            sea_orm::DbErr::Conn(e) => StorageError::ConnectionFailed(e.to_string()),
            e => StorageError::ReadFailed(e.to_string()),
        }
    }
}

/// Errors surfaced by the command layer.
///
/// `User` errors are meant to be shown verbatim to whoever issued the
/// command; `raise` marks replies that short-circuit further processing.
#[derive(Debug)]
pub enum CommandError {
    User { message: String, raise: bool },
    Storage(StorageError),
}

impl CommandError {
    pub fn user(message: impl Into<String>) -> Self {
        CommandError::User {
            message: message.into(),
            raise: false,
        }
    }

    pub fn raised(message: impl Into<String>) -> Self {
        CommandError::User {
            message: message.into(),
            raise: true,
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::User { message, .. } => write!(f, "{}", message),
            CommandError::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<StorageError> for CommandError {
    fn from(err: StorageError) -> Self {
        CommandError::Storage(err)
    }
}
