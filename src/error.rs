use crate::configuration::ConfigurationError;
use crate::store::error::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WavechatError {
	#[error("Failed to load configuration: {0}")]
	Configuration(#[from] ConfigurationError),
	#[error("Store error: {0}")]
	Store(#[from] StoreError),
	#[error("Failed to issue token: {0}")]
	Token(#[from] jsonwebtoken::errors::Error),
	#[error("Server error: {0}")]
	Server(#[from] std::io::Error),
}
