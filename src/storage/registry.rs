//! Process-wide entry point to the quote stores.
//!
//! The backend kind is fixed when the registry is built; the backend itself
//! is constructed on first use and then shared. Each backend keeps its own
//! per-channel handle cache, which `close` empties.

use std::sync::{Arc, Mutex};

use log::{error, info};

use crate::configuration::types::{BackendKind, StorageConfig};
use crate::error_handling::types::StorageError;
use crate::irc::IrcMessage;
use crate::storage::sqlite_storage::SqliteStorage;
use crate::storage::storage_trait::QuoteStorage;
use crate::storage::types::QuoteGrab;

#[cfg(feature = "orm")]
use crate::storage::database_storage::DatabaseStorage;

pub struct StorageRegistry {
    config: StorageConfig,
    backend: Mutex<Option<Arc<dyn QuoteStorage>>>,
}

impl StorageRegistry {
    pub fn new(config: StorageConfig) -> Self {
        info!("Using {:?} quote storage backend", config.backend);
        Self {
            config,
            backend: Mutex::new(None),
        }
    }

    /// Registry around an already constructed backend.
    pub fn with_backend(config: StorageConfig, backend: Arc<dyn QuoteStorage>) -> Self {
        Self {
            config,
            backend: Mutex::new(Some(backend)),
        }
    }

    pub fn kind(&self) -> BackendKind {
        self.config.backend
    }

    /// The active backend, built on first call.
    ///
    /// A failed construction is not remembered, so the error is reported
    /// again on the next access.
    pub fn backend(&self) -> Result<Arc<dyn QuoteStorage>, StorageError> {
        let mut slot = self
            .backend
            .lock()
            .map_err(|_| StorageError::ConnectionFailed("backend lock poisoned".into()))?;
        if let Some(backend) = slot.as_ref() {
            return Ok(Arc::clone(backend));
        }
        let backend = build_backend(&self.config).map_err(|e| {
            error!("Unable to build {:?} backend: {}", self.config.backend, e);
            e
        })?;
        *slot = Some(Arc::clone(&backend));
        Ok(backend)
    }
}

fn build_backend(config: &StorageConfig) -> Result<Arc<dyn QuoteStorage>, StorageError> {
    match config.backend {
        BackendKind::Sqlite => Ok(Arc::new(SqliteStorage::new(config))),
        #[cfg(feature = "orm")]
        BackendKind::Orm => Ok(Arc::new(DatabaseStorage::new(config)?)),
        #[cfg(not(feature = "orm"))]
        BackendKind::Orm => Err(StorageError::MissingCapability(
            "the orm backend needs quotegrabs built with the `orm` feature; \
             rebuild with `--features orm` or set storage.backend = \"sqlite\""
                .into(),
        )),
    }
}

impl QuoteStorage for StorageRegistry {
    fn get(&self, channel: &str, id: i64) -> Result<QuoteGrab, StorageError> {
        self.backend()?.get(channel, id)
    }

    fn random(&self, channel: &str, nick: Option<&str>) -> Result<String, StorageError> {
        self.backend()?.random(channel, nick)
    }

    fn list(&self, channel: &str, nick: &str) -> Result<Vec<QuoteGrab>, StorageError> {
        self.backend()?.list(channel, nick)
    }

    fn get_quote(&self, channel: &str, nick: &str) -> Result<String, StorageError> {
        self.backend()?.get_quote(channel, nick)
    }

    fn select(&self, channel: &str, nick: &str) -> Result<i64, StorageError> {
        self.backend()?.select(channel, nick)
    }

    fn add(&self, channel: &str, msg: &IrcMessage, by: &str) -> Result<(), StorageError> {
        self.backend()?.add(channel, msg, by)
    }

    fn remove(&self, channel: &str, id: Option<i64>) -> Result<(), StorageError> {
        self.backend()?.remove(channel, id)
    }

    fn search(&self, channel: &str, text: &str) -> Result<Vec<QuoteGrab>, StorageError> {
        self.backend()?.search(channel, text)
    }

    fn close(&self) {
        let backend = match self.backend.lock() {
            Ok(slot) => slot.clone(),
            Err(_) => {
                error!("Backend lock poisoned, cannot close stores");
                return;
            }
        };
        if let Some(backend) = backend {
            info!("Closing {:?} quote stores", self.config.backend);
            backend.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(dir: &TempDir, backend: BackendKind) -> StorageConfig {
        StorageConfig {
            backend,
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_backend_is_built_once() {
        let dir = TempDir::new().unwrap();
        let registry = StorageRegistry::new(config(&dir, BackendKind::Sqlite));
        let a = registry.backend().unwrap();
        let b = registry.backend().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_registry_delegates_and_reopens_after_close() {
        let dir = TempDir::new().unwrap();
        let registry = StorageRegistry::new(config(&dir, BackendKind::Sqlite));
        registry
            .add("#c", &IrcMessage::privmsg("bob!b@h", "#c", "hello"), "carol")
            .unwrap();
        registry.close();
        assert_eq!(registry.get_quote("#c", "bob").unwrap(), "<bob> hello");
    }

    #[test]
    fn test_close_before_first_use_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let registry = StorageRegistry::new(config(&dir, BackendKind::Sqlite));
        registry.close();
        assert!(registry.backend.lock().unwrap().is_none());
    }

    #[cfg(feature = "orm")]
    #[test]
    fn test_orm_backend_selected_by_config() {
        let dir = TempDir::new().unwrap();
        let registry = StorageRegistry::new(config(&dir, BackendKind::Orm));
        assert_eq!(registry.kind(), BackendKind::Orm);
        registry
            .add("#c", &IrcMessage::privmsg("bob!b@h", "#c", "hello"), "carol")
            .unwrap();
        assert_eq!(registry.random("#c", Some("BOB")).unwrap(), "<bob> hello");
    }

    #[cfg(not(feature = "orm"))]
    #[test]
    fn test_missing_orm_capability_is_reported_on_every_access() {
        let dir = TempDir::new().unwrap();
        let registry = StorageRegistry::new(config(&dir, BackendKind::Orm));
        for _ in 0..2 {
            let err = registry.random("#c", None).unwrap_err();
            assert!(matches!(err, StorageError::MissingCapability(_)));
        }
    }
}
