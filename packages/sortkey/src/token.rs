use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContinuationTokenError {
	#[error("continuation token is not valid base64")]
	InvalidEncoding,
}

/// Opaque cursor (§3 "Query result chunk"): wraps the last included
/// candidate's encoded sort key, so resuming a query skips forward from
/// an actual key rather than a fragile row index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationToken(String);

impl ContinuationToken {
	pub fn encode(key: &[u8]) -> Self {
		ContinuationToken(STANDARD.encode(key))
	}

	pub fn decode(&self) -> Result<Vec<u8>, ContinuationTokenError> {
		STANDARD.decode(&self.0).map_err(|_| ContinuationTokenError::InvalidEncoding)
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn from_opaque(value: impl Into<String>) -> Self {
		ContinuationToken(value.into())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips_key_bytes() {
		let key = vec![1u8, 2, 0, 255, 3];
		let token = ContinuationToken::encode(&key);
		assert_eq!(token.decode().unwrap(), key);
	}

	#[test]
	fn rejects_malformed_token() {
		let token = ContinuationToken::from_opaque("not valid base64 ##");
		assert!(token.decode().is_err());
	}
}
