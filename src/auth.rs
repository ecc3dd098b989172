use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by the bearer token, see
/// [RFC7519, Section 4.1](https://www.rfc-editor.org/rfc/rfc7519.html#section-4.1)
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
	#[serde(rename = "userId")]
	pub user_id: String,
	pub username: String,
	pub exp: u64,
}

/// The identity a verified credential proves, everything the relay
/// needs to know about a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
	pub user_id: String,
	pub display_name: String,
}

#[derive(Error, Debug)]
pub enum AuthError {
	#[error("Missing bearer token.")]
	MissingToken,
	#[error("Token is expired.")]
	ExpiredToken,
	#[error("Invalid token: {0}")]
	InvalidToken(jsonwebtoken::errors::Error),
}

#[derive(Clone)]
pub struct TokenVerifier {
	decoding_key: DecodingKey,
}

impl TokenVerifier {
	pub fn new(secret: &str) -> Self {
		Self {
			decoding_key: DecodingKey::from_secret(secret.as_bytes()),
		}
	}

	pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
		let validation = Validation::new(Algorithm::HS256);

		let token_data =
			jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation).map_err(|error| {
				match error.kind() {
					ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
					_ => AuthError::InvalidToken(error),
				}
			})?;

		Ok(Identity {
			user_id: token_data.claims.user_id,
			display_name: token_data.claims.username,
		})
	}
}

pub struct TokenIssuer {
	encoding_key: EncodingKey,
}

/// Tokens minted by the `token` subcommand are valid for 7 days.
const TOKEN_VALIDITY_SECONDS: u64 = 7 * 24 * 60 * 60;

impl TokenIssuer {
	pub fn new(secret: &str) -> Self {
		Self {
			encoding_key: EncodingKey::from_secret(secret.as_bytes()),
		}
	}

	pub fn issue(&self, user_id: &str, username: &str) -> Result<String, jsonwebtoken::errors::Error> {
		let claims = Claims {
			user_id: user_id.to_string(),
			username: username.to_string(),
			exp: u64::try_from(Utc::now().timestamp()).unwrap_or_default() + TOKEN_VALIDITY_SECONDS,
		};
		jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn should_verify_a_freshly_issued_token() {
		let issuer = TokenIssuer::new("secret");
		let verifier = TokenVerifier::new("secret");

		let token = issuer.issue("42", "Ferris").expect("Failed to issue token");
		let identity = verifier.verify(&token).expect("Failed to verify token");

		assert_eq!(
			Identity {
				user_id: "42".to_string(),
				display_name: "Ferris".to_string(),
			},
			identity
		);
	}

	#[test]
	fn should_reject_a_token_signed_with_a_different_secret() {
		let issuer = TokenIssuer::new("secret");
		let verifier = TokenVerifier::new("other-secret");

		let token = issuer.issue("42", "Ferris").expect("Failed to issue token");
		let result = verifier.verify(&token);

		assert!(matches!(result, Err(AuthError::InvalidToken(_))));
	}

	#[test]
	fn should_reject_an_expired_token() {
		let encoding_key = EncodingKey::from_secret(b"secret");
		let claims = Claims {
			user_id: "42".to_string(),
			username: "Ferris".to_string(),
			exp: 0,
		};
		let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)
			.expect("Failed to encode token");

		let verifier = TokenVerifier::new("secret");
		let result = verifier.verify(&token);

		assert!(matches!(result, Err(AuthError::ExpiredToken)));
	}

	#[test]
	fn should_reject_garbage_tokens() {
		let verifier = TokenVerifier::new("secret");

		let result = verifier.verify("not-a-token");

		assert!(matches!(result, Err(AuthError::InvalidToken(_))));
	}
}
