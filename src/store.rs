use crate::store::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub mod error;
pub mod sqlite;

pub use sqlite::SqliteStore;

/// A persisted chat message. Immutable once stored, only ever appended and
/// read back.
#[derive(FromRow, Clone, Debug, PartialEq, Eq)]
pub struct StoredMessage {
	pub uuid: Uuid,
	pub room: String,
	pub sender: String,
	pub body: String,
	pub kind: MessageKind,
	pub created_at: DateTime<Utc>,
}

/// Only text messages are persisted right now, but the column is part of
/// the read API so clients don't have to guess.
#[derive(sqlx::Type, Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
	Text,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewMessage {
	pub room: String,
	pub sender: String,
	pub body: String,
	pub kind: MessageKind,
}

#[async_trait]
pub trait MessageStore: Send + Sync {
	/// Persist a message. The relay only broadcasts after this succeeded.
	async fn append(&self, message: NewMessage) -> Result<StoredMessage, StoreError>;
	/// Up to `limit` most recent messages of a room in chronological
	/// (oldest first) order. Unknown rooms yield an empty list.
	async fn recent_history(&self, room: &str, limit: u32) -> Result<Vec<StoredMessage>, StoreError>;
	/// Best-effort bookkeeping on disconnect.
	async fn mark_offline(&self, user_id: &str, last_seen: DateTime<Utc>) -> Result<(), StoreError>;
}
