//! Embedded SQLite backend.
//!
//! Every channel gets its own database file, opened on first use and kept
//! open until [`QuoteStorage::close`]. Each connection carries a `nickeq`
//! scalar function so nick filters compare under the configured casemapping
//! inside the query itself.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use log::{debug, error, info, warn};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::configuration::types::StorageConfig;
use crate::error_handling::types::StorageError;
use crate::irc::{Casemapping, IrcMessage};
use crate::storage::channel_files::channel_filename;
use crate::storage::storage_trait::QuoteStorage;
use crate::storage::types::QuoteGrab;

const COLUMNS: &str = "id, nick, hostmask, added_by, added_at, quote";

fn row_to_grab(row: &Row<'_>) -> rusqlite::Result<QuoteGrab> {
    Ok(QuoteGrab {
        id: row.get(0)?,
        by: row.get(1)?,
        hostmask: row.get(2)?,
        grabber: row.get(3)?,
        at: row.get(4)?,
        text: row.get(5)?,
    })
}

pub struct SqliteStorage {
    data_dir: PathBuf,
    filename: String,
    casemapping: Casemapping,
    dbs: Mutex<HashMap<PathBuf, Connection>>, // keyed by resolved channel file
}

impl SqliteStorage {
    pub fn new(config: &StorageConfig) -> Self {
        info!(
            "SqliteStorage initialized at {} ({})",
            config.data_dir.display(),
            config.filename
        );
        Self {
            data_dir: config.data_dir.clone(),
            filename: config.filename.clone(),
            casemapping: config.casemapping,
            dbs: Mutex::new(HashMap::new()),
        }
    }

    /// Registers `nickeq(a, b)` on `conn`.
    fn register_nickeq(conn: &Connection, casemapping: Casemapping) -> rusqlite::Result<()> {
        conn.create_scalar_function(
            "nickeq",
            2,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            move |ctx| {
                let a: Option<String> = ctx.get(0)?;
                let b: Option<String> = ctx.get(1)?;
                Ok(match (a, b) {
                    (Some(a), Some(b)) => casemapping.nick_eq(&a, &b),
                    _ => false,
                })
            },
        )
    }

    fn open(path: &Path, casemapping: Casemapping) -> Result<Connection, StorageError> {
        let existed = path.exists();
        let conn = Connection::open(path).map_err(|e| {
            error!("Failed to open {}: {}", path.display(), e);
            StorageError::ConnectionFailed(format!("{}: {}", path.display(), e))
        })?;
        Self::register_nickeq(&conn, casemapping)
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS quotegrabs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nick TEXT,
                hostmask TEXT,
                added_by TEXT,
                added_at INTEGER,
                quote TEXT
            );",
        )
        .map_err(|e| {
            error!("Failed to create schema in {}: {}", path.display(), e);
            StorageError::write(e)
        })?;
        if existed {
            info!("Opened quote store {}", path.display());
        } else {
            info!("Created quote store {}", path.display());
        }
        Ok(conn)
    }

    /// Runs `f` against the channel's connection, opening it if needed.
    fn with_db<T>(
        &self,
        channel: &str,
        f: impl FnOnce(&Connection) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let path = channel_filename(&self.data_dir, &self.filename, self.casemapping, channel)?;
        let mut dbs = self
            .dbs
            .lock()
            .map_err(|_| StorageError::ConnectionFailed("store cache lock poisoned".into()))?;
        let conn = match dbs.entry(path) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let conn = Self::open(entry.key(), self.casemapping)?;
                entry.insert(conn)
            }
        };
        f(conn)
    }

    fn latest_for_nick(conn: &Connection, nick: &str) -> Result<Option<QuoteGrab>, StorageError> {
        let sql = format!(
            "SELECT {} FROM quotegrabs WHERE nickeq(nick, ?1) ORDER BY id DESC LIMIT 1",
            COLUMNS
        );
        Ok(conn.query_row(&sql, params![nick], row_to_grab).optional()?)
    }

    fn query_grabs(
        conn: &Connection,
        sql: &str,
        arg: &str,
    ) -> Result<Vec<QuoteGrab>, StorageError> {
        let mut stmt = conn.prepare(sql)?;
        let grabs = stmt
            .query_map(params![arg], row_to_grab)?
            .collect::<Result<Vec<_>, _>>()?;
        if grabs.is_empty() {
            return Err(StorageError::NotFound);
        }
        Ok(grabs)
    }
}

impl QuoteStorage for SqliteStorage {
    fn get(&self, channel: &str, id: i64) -> Result<QuoteGrab, StorageError> {
        debug!("get {} #{}", channel, id);
        self.with_db(channel, |conn| {
            let sql = format!("SELECT {} FROM quotegrabs WHERE id = ?1", COLUMNS);
            conn.query_row(&sql, params![id], row_to_grab)
                .optional()?
                .ok_or(StorageError::NotFound)
        })
    }

    fn random(&self, channel: &str, nick: Option<&str>) -> Result<String, StorageError> {
        debug!("random {} nick={:?}", channel, nick);
        self.with_db(channel, |conn| {
            let quote = match nick {
                Some(nick) => conn
                    .query_row(
                        "SELECT quote FROM quotegrabs WHERE nickeq(nick, ?1)
                         ORDER BY random() LIMIT 1",
                        params![nick],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?,
                None => conn
                    .query_row(
                        "SELECT quote FROM quotegrabs ORDER BY random() LIMIT 1",
                        [],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?,
            };
            quote.ok_or(StorageError::NotFound)
        })
    }

    fn list(&self, channel: &str, nick: &str) -> Result<Vec<QuoteGrab>, StorageError> {
        debug!("list {} nick={}", channel, nick);
        self.with_db(channel, |conn| {
            let sql = format!(
                "SELECT {} FROM quotegrabs WHERE nickeq(nick, ?1) ORDER BY id DESC",
                COLUMNS
            );
            Self::query_grabs(conn, &sql, nick)
        })
    }

    fn get_quote(&self, channel: &str, nick: &str) -> Result<String, StorageError> {
        debug!("get_quote {} nick={}", channel, nick);
        self.with_db(channel, |conn| {
            Self::latest_for_nick(conn, nick)?
                .map(|g| g.text)
                .ok_or(StorageError::NotFound)
        })
    }

    fn select(&self, channel: &str, nick: &str) -> Result<i64, StorageError> {
        debug!("select {} nick={}", channel, nick);
        self.with_db(channel, |conn| {
            Self::latest_for_nick(conn, nick)?
                .map(|g| g.at)
                .ok_or(StorageError::NotFound)
        })
    }

    fn add(&self, channel: &str, msg: &IrcMessage, by: &str) -> Result<(), StorageError> {
        let text = msg.pretty_print();
        self.with_db(channel, |conn| {
            if let Some(latest) = Self::latest_for_nick(conn, msg.nick())? {
                if latest.text == text {
                    warn!(
                        "Skipping duplicate grab for {} in {} (matches #{})",
                        msg.nick(),
                        channel,
                        latest.id
                    );
                    return Ok(());
                }
            }
            conn.execute(
                "INSERT INTO quotegrabs (nick, hostmask, added_by, added_at, quote)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![msg.nick(), msg.prefix, by, Utc::now().timestamp(), text],
            )
            .map_err(|e| {
                error!("Failed to insert grab in {}: {}", channel, e);
                StorageError::write(e)
            })?;
            debug!("Grabbed #{} for {} in {}", conn.last_insert_rowid(), msg.nick(), channel);
            Ok(())
        })
    }

    fn remove(&self, channel: &str, id: Option<i64>) -> Result<(), StorageError> {
        debug!("remove {} id={:?}", channel, id);
        self.with_db(channel, |conn| {
            let deleted = match id {
                Some(id) => conn.execute("DELETE FROM quotegrabs WHERE id = ?1", params![id]),
                None => conn.execute(
                    "DELETE FROM quotegrabs WHERE id = (SELECT MAX(id) FROM quotegrabs)",
                    [],
                ),
            }
            .map_err(StorageError::write)?;
            if deleted == 0 {
                return Err(StorageError::NotFound);
            }
            Ok(())
        })
    }

    fn search(&self, channel: &str, text: &str) -> Result<Vec<QuoteGrab>, StorageError> {
        debug!("search {} text={:?}", channel, text);
        self.with_db(channel, |conn| {
            // instr() is byte-exact, unlike LIKE which folds ASCII case
            let sql = format!(
                "SELECT {} FROM quotegrabs WHERE instr(quote, ?1) > 0 ORDER BY id DESC",
                COLUMNS
            );
            Self::query_grabs(conn, &sql, text)
        })
    }

    fn close(&self) {
        let drained: Vec<(PathBuf, Connection)> = match self.dbs.lock() {
            Ok(mut dbs) => dbs.drain().collect(),
            Err(_) => {
                error!("Store cache lock poisoned, cannot close handles");
                return;
            }
        };
        for (path, conn) in drained {
            if let Err((_, e)) = conn.close() {
                warn!("Failed to close {}: {}", path.display(), e);
            }
        }
    }
}
