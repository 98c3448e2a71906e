//! SeaORM entity model used by the database storage backend.
//!
//! This maps to the `quotegrabs` table that `database_storage` creates from
//! the entity metadata in each channel database.

use sea_orm::entity::prelude::*;

use crate::storage::types::QuoteGrab;

/// Quotegrabs table entity model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "quotegrabs")]
pub struct Model {
    /// Auto-increment row id
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Speaker nick at grab time
    pub nick: String,
    /// Speaker hostmask at grab time
    pub hostmask: String,
    /// Grabber identity
    pub added_by: String,
    /// Native timestamp; see [`epoch_seconds`] for what callers get back
    pub added_at: DateTimeUtc,
    /// Pretty-printed quote
    pub quote: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Decodes a stored timestamp into seconds since the epoch.
pub fn epoch_seconds(at: &DateTimeUtc) -> i64 {
    at.timestamp()
}

/// Encodes epoch seconds into the stored timestamp type.
pub fn from_epoch_seconds(secs: i64) -> Option<DateTimeUtc> {
    chrono::DateTime::from_timestamp(secs, 0)
}

impl From<Model> for QuoteGrab {
    fn from(model: Model) -> Self {
        QuoteGrab {
            id: i64::from(model.id),
            at: epoch_seconds(&model.added_at),
            by: model.nick,
            hostmask: model.hostmask,
            grabber: model.added_by,
            text: model.quote,
        }
    }
}
