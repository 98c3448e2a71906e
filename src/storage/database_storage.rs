use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::Utc;
use log::{debug, error, info, warn};
use sea_orm::sea_query::{Expr, Order};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, NotSet,
    QueryFilter, QueryOrder, QuerySelect, Schema, Set, SqlxSqliteConnector,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::ConnectOptions as _;

use crate::configuration::types::StorageConfig;
use crate::error_handling::types::StorageError;
use crate::irc::{Casemapping, IrcMessage};
use crate::storage::channel_files::channel_filename;
use crate::storage::db_entities as quotegrabs;
use crate::storage::storage_trait::QuoteStorage;
use crate::storage::types::QuoteGrab;

/// SeaORM backed store, one SQLite connection per channel.
///
/// Nick filters are evaluated in process with the configured casemapping;
/// a `LIKE` filter would fold ASCII case only and disagree with the
/// embedded backend on `[]\~`.
pub struct DatabaseStorage {
    rt: tokio::runtime::Runtime,
    data_dir: PathBuf,
    filename: String,
    connection: String,
    casemapping: Casemapping,
    dbs: Mutex<HashMap<String, DatabaseConnection>>, // keyed by lowercased channel
}

impl DatabaseStorage {
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;
        info!(
            "DatabaseStorage initialized at {} ({}{})",
            config.data_dir.display(),
            config.connection,
            config.filename
        );
        Ok(Self {
            rt,
            data_dir: config.data_dir.clone(),
            filename: config.filename.clone(),
            connection: config.connection.clone(),
            casemapping: config.casemapping,
            dbs: Mutex::new(HashMap::new()),
        })
    }

    /// Connection for `channel`, created together with its table on first use.
    fn db(&self, channel: &str) -> Result<DatabaseConnection, StorageError> {
        let key = self.casemapping.to_lower(channel);
        let mut dbs = self
            .dbs
            .lock()
            .map_err(|_| StorageError::ConnectionFailed("store cache lock poisoned".into()))?;
        if let Some(db) = dbs.get(&key) {
            return Ok(db.clone());
        }
        let path = channel_filename(&self.data_dir, &self.filename, self.casemapping, channel)?;
        // the file name is set on the options, never spliced into the URL
        let opts = SqliteConnectOptions::from_str(&self.connection)
            .map_err(|e| StorageError::ConnectionFailed(format!("{}: {}", self.connection, e)))?
            .filename(&path)
            .create_if_missing(true)
            .disable_statement_logging();
        let db = self.rt.block_on(async {
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(opts)
                .await
                .map_err(|e| {
                    error!("Failed to connect to {}: {}", path.display(), e);
                    StorageError::ConnectionFailed(format!("{}: {}", path.display(), e))
                })?;
            let db = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);
            let backend = db.get_database_backend();
            let mut table = Schema::new(backend).create_table_from_entity(quotegrabs::Entity);
            table.if_not_exists();
            db.execute(backend.build(&table)).await.map_err(|e| {
                error!("Failed to create schema in {}: {}", path.display(), e);
                StorageError::write(e)
            })?;
            Ok::<_, StorageError>(db)
        })?;
        info!("Opened quote store {}", path.display());
        dbs.insert(key, db.clone());
        Ok(db)
    }

    /// Ids of the grabs spoken by `nick`, most recent first.
    async fn matching_ids(
        db: &DatabaseConnection,
        casemapping: Casemapping,
        nick: &str,
    ) -> Result<Vec<i32>, StorageError> {
        let rows: Vec<(i32, String)> = quotegrabs::Entity::find()
            .select_only()
            .column(quotegrabs::Column::Id)
            .column(quotegrabs::Column::Nick)
            .order_by_desc(quotegrabs::Column::Id)
            .into_tuple()
            .all(db)
            .await?;
        Ok(rows
            .into_iter()
            .filter(|(_, n)| casemapping.nick_eq(n, nick))
            .map(|(id, _)| id)
            .collect())
    }

    async fn latest_for_nick(
        db: &DatabaseConnection,
        casemapping: Casemapping,
        nick: &str,
    ) -> Result<Option<quotegrabs::Model>, StorageError> {
        match Self::matching_ids(db, casemapping, nick).await?.first() {
            Some(id) => Ok(quotegrabs::Entity::find_by_id(*id).one(db).await?),
            None => Ok(None),
        }
    }
}

fn row_id(id: i64) -> Result<i32, StorageError> {
    // ids beyond the column range cannot exist
    i32::try_from(id).map_err(|_| StorageError::NotFound)
}

impl QuoteStorage for DatabaseStorage {
    fn get(&self, channel: &str, id: i64) -> Result<QuoteGrab, StorageError> {
        debug!("get {} #{}", channel, id);
        let id = row_id(id)?;
        let db = self.db(channel)?;
        self.rt.block_on(async {
            let model = quotegrabs::Entity::find_by_id(id).one(&db).await?;
            model.map(QuoteGrab::from).ok_or(StorageError::NotFound)
        })
    }

    fn random(&self, channel: &str, nick: Option<&str>) -> Result<String, StorageError> {
        debug!("random {} nick={:?}", channel, nick);
        let db = self.db(channel)?;
        self.rt.block_on(async {
            let model = match nick {
                Some(nick) => {
                    // drawn in process; binding every id would hit SQLite's variable cap
                    let ids = Self::matching_ids(&db, self.casemapping, nick).await?;
                    if ids.is_empty() {
                        return Err(StorageError::NotFound);
                    }
                    let id = ids[fastrand::usize(..ids.len())];
                    quotegrabs::Entity::find_by_id(id).one(&db).await?
                }
                None => {
                    quotegrabs::Entity::find()
                        .order_by(Expr::cust("RANDOM()"), Order::Asc)
                        .one(&db)
                        .await?
                }
            };
            model.map(|m| m.quote).ok_or(StorageError::NotFound)
        })
    }

    fn list(&self, channel: &str, nick: &str) -> Result<Vec<QuoteGrab>, StorageError> {
        debug!("list {} nick={}", channel, nick);
        let db = self.db(channel)?;
        self.rt.block_on(async {
            let models = quotegrabs::Entity::find()
                .order_by_desc(quotegrabs::Column::Id)
                .all(&db)
                .await?;
            let grabs: Vec<QuoteGrab> = models
                .into_iter()
                .filter(|m| self.casemapping.nick_eq(&m.nick, nick))
                .map(QuoteGrab::from)
                .collect();
            if grabs.is_empty() {
                return Err(StorageError::NotFound);
            }
            Ok(grabs)
        })
    }

    fn get_quote(&self, channel: &str, nick: &str) -> Result<String, StorageError> {
        debug!("get_quote {} nick={}", channel, nick);
        let db = self.db(channel)?;
        self.rt.block_on(async {
            let latest = Self::latest_for_nick(&db, self.casemapping, nick).await?;
            latest.map(|m| m.quote).ok_or(StorageError::NotFound)
        })
    }

    fn select(&self, channel: &str, nick: &str) -> Result<i64, StorageError> {
        debug!("select {} nick={}", channel, nick);
        let db = self.db(channel)?;
        self.rt.block_on(async {
            let latest = Self::latest_for_nick(&db, self.casemapping, nick).await?;
            latest
                .map(|m| quotegrabs::epoch_seconds(&m.added_at))
                .ok_or(StorageError::NotFound)
        })
    }

    fn add(&self, channel: &str, msg: &IrcMessage, by: &str) -> Result<(), StorageError> {
        let text = msg.pretty_print();
        let db = self.db(channel)?;
        self.rt.block_on(async {
            if let Some(latest) = Self::latest_for_nick(&db, self.casemapping, msg.nick()).await? {
                if latest.quote == text {
                    warn!(
                        "Skipping duplicate grab for {} in {} (matches #{})",
                        msg.nick(),
                        channel,
                        latest.id
                    );
                    return Ok(());
                }
            }
            let added_at = quotegrabs::from_epoch_seconds(Utc::now().timestamp())
                .ok_or_else(|| StorageError::WriteFailed("clock out of range".into()))?;
            let grab = quotegrabs::ActiveModel {
                id: NotSet,
                nick: Set(msg.nick().to_string()),
                hostmask: Set(msg.prefix.clone()),
                added_by: Set(by.to_string()),
                added_at: Set(added_at),
                quote: Set(text.clone()),
            };
            let inserted = grab.insert(&db).await.map_err(|e| {
                error!("Failed to insert grab in {}: {}", channel, e);
                StorageError::write(e)
            })?;
            debug!("Grabbed #{} for {} in {}", inserted.id, msg.nick(), channel);
            Ok(())
        })
    }

    fn remove(&self, channel: &str, id: Option<i64>) -> Result<(), StorageError> {
        debug!("remove {} id={:?}", channel, id);
        let target = id.map(row_id).transpose()?;
        let db = self.db(channel)?;
        self.rt.block_on(async {
            let id = match target {
                Some(id) => id,
                None => quotegrabs::Entity::find()
                    .order_by_desc(quotegrabs::Column::Id)
                    .one(&db)
                    .await?
                    .map(|m| m.id)
                    .ok_or(StorageError::NotFound)?,
            };
            let result = quotegrabs::Entity::delete_by_id(id)
                .exec(&db)
                .await
                .map_err(StorageError::write)?;
            if result.rows_affected == 0 {
                return Err(StorageError::NotFound);
            }
            Ok(())
        })
    }

    fn search(&self, channel: &str, text: &str) -> Result<Vec<QuoteGrab>, StorageError> {
        debug!("search {} text={:?}", channel, text);
        let db = self.db(channel)?;
        self.rt.block_on(async {
            // LIKE narrows the candidates; the exact match below makes it case-sensitive
            let models = quotegrabs::Entity::find()
                .filter(quotegrabs::Column::Quote.contains(text))
                .order_by_desc(quotegrabs::Column::Id)
                .all(&db)
                .await?;
            let grabs: Vec<QuoteGrab> = models
                .into_iter()
                .filter(|m| m.quote.contains(text))
                .map(QuoteGrab::from)
                .collect();
            if grabs.is_empty() {
                return Err(StorageError::NotFound);
            }
            Ok(grabs)
        })
    }

    fn close(&self) {
        let drained: Vec<(String, DatabaseConnection)> = match self.dbs.lock() {
            Ok(mut dbs) => dbs.drain().collect(),
            Err(_) => {
                error!("Store cache lock poisoned, cannot close handles");
                return;
            }
        };
        for (channel, db) in drained {
            if let Err(e) = self.rt.block_on(db.close()) {
                warn!("Failed to close store for {}: {}", channel, e);
            }
        }
    }
}
