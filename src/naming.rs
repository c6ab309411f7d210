//! Unique bucket names for auto-created, auto-deleted buckets.

use thiserror::Error;
use uuid::Uuid;

/// Literal prefix of every generated bucket name.
pub const AUTO_BUCKET_NAME_PREFIX: &str = "tmp-s3fs-";

/// Raised when a generator cannot produce a token.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("token generation failed: {0}")]
pub struct TokenError(pub String);

/// Source of unique tokens used to suffix generated bucket names.
pub trait TokenGenerator: Send + Sync {
    /// Returns a fresh token. Successive calls must not repeat.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] when the generator cannot produce a token.
    fn new_token(&self) -> Result<String, TokenError>;
}

/// Generator backed by random (v4) UUIDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidTokenGenerator;

impl TokenGenerator for UuidTokenGenerator {
    fn new_token(&self) -> Result<String, TokenError> {
        Ok(Uuid::new_v4().to_string())
    }
}

/// Builds the bucket name for a token.
#[must_use]
pub fn generated_bucket_name(token: &str) -> String {
    format!("{AUTO_BUCKET_NAME_PREFIX}{token}")
}
