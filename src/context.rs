use crate::auth::TokenVerifier;
use crate::configuration::Configuration;
use crate::relay::Relay;
use crate::store::error::StoreError;
use crate::store::{MessageStore, SqliteStore};
use axum::extract::FromRef;
use std::sync::Arc;

#[derive(Clone, FromRef)]
pub struct ApplicationContext {
	pub configuration: Configuration,
	pub token_verifier: TokenVerifier,
	pub store: Arc<dyn MessageStore>,
	pub relay: Arc<Relay>,
}

impl ApplicationContext {
	pub async fn new(configuration: Configuration) -> Result<Self, StoreError> {
		let store: Arc<dyn MessageStore> = Arc::new(SqliteStore::new(&configuration.database_url).await?);
		let token_verifier = TokenVerifier::new(&configuration.jwt_secret);
		let relay = Arc::new(Relay::new(store.clone(), configuration.join_history_limit));

		Ok(Self {
			configuration,
			token_verifier,
			store,
			relay,
		})
	}
}
