use crate::store::error::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
	#[error("You need to join a room first.")]
	NotAuthenticated,
	#[error("You are not a member of room '{0}'.")]
	NotFound(String),
	#[error("Your message could not be saved: {0}")]
	Storage(#[from] StoreError),
}
