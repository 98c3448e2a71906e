//! Storage Trait
//!
//! This module defines the `QuoteStorage` trait, the contract shared by every
//! quote grab backend.
//!
//! Implementors of this trait are responsible for:
//! - Opening (and caching) one store per channel on first use
//! - Comparing nicks under the configured casemapping
//! - Suppressing consecutive duplicate grabs for the same nick
//! - Releasing every open handle on `close`
//!
//! All methods return a `Result`; `StorageError::NotFound` is reserved for
//! queries that matched nothing, every other variant is a real failure.

use crate::error_handling::types::StorageError;
use crate::irc::IrcMessage;
use crate::storage::types::QuoteGrab;

pub trait QuoteStorage: Send + Sync {
    /// Exact lookup by id.
    fn get(&self, channel: &str, id: i64) -> Result<QuoteGrab, StorageError>;

    /// Text of a uniformly random grab, optionally restricted to `nick`.
    fn random(&self, channel: &str, nick: Option<&str>) -> Result<String, StorageError>;

    /// Every grab of `nick`, most recent first.
    fn list(&self, channel: &str, nick: &str) -> Result<Vec<QuoteGrab>, StorageError>;

    /// Text of the most recent grab of `nick`.
    fn get_quote(&self, channel: &str, nick: &str) -> Result<String, StorageError>;

    /// Timestamp (epoch seconds) of the most recent grab of `nick`.
    fn select(&self, channel: &str, nick: &str) -> Result<i64, StorageError>;

    /// Stores `msg` as grabbed by `by`.
    ///
    /// Silently does nothing if the latest grab of the same nick has the
    /// same pretty-printed text.
    fn add(&self, channel: &str, msg: &IrcMessage, by: &str) -> Result<(), StorageError>;

    /// Deletes grab `id`, or the most recent grab of the channel when `None`.
    fn remove(&self, channel: &str, id: Option<i64>) -> Result<(), StorageError>;

    /// Grabs whose text contains `text` (case-sensitive), most recent first.
    fn search(&self, channel: &str, text: &str) -> Result<Vec<QuoteGrab>, StorageError>;

    /// Drops every cached per-channel handle.
    fn close(&self);
}
