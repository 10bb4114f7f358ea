//! Error Types
//!
//! Typed failures for store construction and per-key operations.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Key was never written, was deleted, or was already removed after expiring
    #[error("key not found: '{key}'")]
    NotFound { key: String },

    /// Key was present but past its TTL when observed
    #[error("key expired: '{key}'")]
    Expired { key: String },

    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The store file could not be opened or locked at startup
    #[error("backend unavailable at {}: {source}", path.display())]
    BackendUnavailable {
        path: PathBuf,
        #[source]
        source: redb::DatabaseError,
    },

    #[error("bucket '{bucket}' does not exist")]
    MissingBucket { bucket: String },

    #[error("entry encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("backend transaction failed: {0}")]
    Backend(#[from] redb::Error),
}

impl StoreError {
    pub(crate) fn not_found(key: &str) -> Self {
        Self::NotFound {
            key: key.to_string(),
        }
    }

    pub(crate) fn expired(key: &str) -> Self {
        Self::Expired {
            key: key.to_string(),
        }
    }

    /// True for both a plain miss and an expired hit.
    ///
    /// Callers that only need "is the key there" should use this instead of
    /// matching on `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Expired { .. })
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            StoreError::not_found("name1").to_string(),
            "key not found: 'name1'"
        );
        assert_eq!(
            StoreError::expired("name1").to_string(),
            "key expired: 'name1'"
        );
        let err = StoreError::MissingBucket {
            bucket: "entries".to_string(),
        };
        assert_eq!(err.to_string(), "bucket 'entries' does not exist");
    }

    #[test]
    fn test_not_found_collapses_expired() {
        assert!(StoreError::not_found("k").is_not_found());
        assert!(StoreError::expired("k").is_not_found());
        assert!(!StoreError::InvalidKey("empty".into()).is_not_found());
    }

    #[test]
    fn test_encoding_error_conversion() {
        let json_err = serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err();
        let err: StoreError = json_err.into();
        assert!(matches!(err, StoreError::Encoding(_)));
        assert!(!err.is_not_found());
    }
}
