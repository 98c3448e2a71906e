//! Error types shared across the crate.

pub mod types;

pub use types::{CommandError, ConfigError, StorageError};
