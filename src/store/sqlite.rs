use crate::store::error::{IntoStoreResult, StoreError};
use crate::store::{MessageStore, NewMessage, StoredMessage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{SqlitePool, migrate, query, query_as};
use uuid::Uuid;

#[derive(Clone)]
pub struct SqliteStore {
	pool: SqlitePool,
}

impl SqliteStore {
	pub async fn new(database_url: &str) -> Result<Self, StoreError> {
		let mut options = SqlitePoolOptions::new();
		if database_url.contains(":memory:") {
			// Every connection to `sqlite::memory:` gets its own database,
			// so the pool must never open a second one.
			options = options.max_connections(1);
		}
		let pool = options
			.connect(database_url)
			.await
			.connection_error("Failed to connect to database")?;
		let store = Self { pool };
		store.migrate().await?;

		Ok(store)
	}

	async fn migrate(&self) -> Result<(), StoreError> {
		migrate!().run(&self.pool).await.map_err(Into::into)
	}
}

#[async_trait]
impl MessageStore for SqliteStore {
	async fn append(&self, message: NewMessage) -> Result<StoredMessage, StoreError> {
		if message.room.trim().is_empty() {
			return Err(StoreError::Constraint("room must not be empty".to_string()));
		}
		if message.sender.trim().is_empty() {
			return Err(StoreError::Constraint("sender must not be empty".to_string()));
		}

		let uuid = Uuid::new_v4();
		let created_at = Utc::now();
		query_as(
			r"INSERT INTO messages (uuid, room, sender, body, kind, created_at)
			VALUES (?1, ?2, ?3, ?4, ?5, ?6)
			RETURNING
				uuid,
				room,
				sender,
				body,
				kind,
				created_at",
		)
		.bind(uuid)
		.bind(message.room)
		.bind(message.sender)
		.bind(message.body)
		.bind(message.kind)
		.bind(created_at)
		.fetch_one(&self.pool)
		.await
		.map_err(Into::into)
	}

	async fn recent_history(&self, room: &str, limit: u32) -> Result<Vec<StoredMessage>, StoreError> {
		// Newest first in the query, reversed so callers always see
		// chronological order.
		let mut messages: Vec<StoredMessage> = query_as(
			r"SELECT uuid, room, sender, body, kind, created_at
			FROM messages
			WHERE room = ?1
			ORDER BY created_at DESC, rowid DESC
			LIMIT ?2",
		)
		.bind(room)
		.bind(limit)
		.fetch_all(&self.pool)
		.await?;

		messages.reverse();
		Ok(messages)
	}

	async fn mark_offline(&self, user_id: &str, last_seen: DateTime<Utc>) -> Result<(), StoreError> {
		query(
			r"INSERT INTO user_status (user_id, is_online, last_seen)
			VALUES (?1, FALSE, ?2)
			ON CONFLICT (user_id) DO UPDATE SET
				is_online = FALSE,
				last_seen = excluded.last_seen",
		)
		.bind(user_id)
		.bind(last_seen)
		.execute(&self.pool)
		.await?;

		Ok(())
	}
}
