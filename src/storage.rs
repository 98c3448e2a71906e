//! Storage subsystem
//!
//! This module provides the per-channel quote grab stores.
//!
//! Components:
//! - `storage_trait`: the QuoteStorage trait defining the uniform contract.
//! - `types`: the `QuoteGrab` record shared by all backends.
//! - `sqlite_storage`: embedded rusqlite implementation with an in-SQL nick comparison.
//! - `database_storage`: ORM-based SQLite implementation using SeaORM (`orm` feature).
//! - `db_entities`: SeaORM entity model and timestamp adapter for the ORM backend.
//! - `channel_files`: mapping from channel names to store files.
//! - `registry`: backend selection and lifetime management.

pub mod channel_files;
#[cfg(feature = "orm")]
pub mod database_storage;
#[cfg(feature = "orm")]
pub mod db_entities;
pub mod registry;
pub mod sqlite_storage;
pub mod storage_trait;
#[cfg(test)]
mod tests;
pub mod types;

pub use registry::StorageRegistry;
pub use storage_trait::QuoteStorage;
pub use types::QuoteGrab;
