//! Error types for the document store.
//!
//! The diff engine and the renderer are total and never fail; only storage
//! operations return errors.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No document with this short id
    #[error("document not found: {0}")]
    NotFound(String),

    /// The document exists but its expiry time has passed
    #[error("document expired: {short_id} (expired at {expired_at})")]
    Expired {
        /// Short id of the document
        short_id: String,
        /// Expiry time in unix milliseconds
        expired_at: u64,
    },

    /// Private document requested without the matching access token
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The document was rejected before storing
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Create a not-found error for a short id.
    pub fn not_found(short_id: impl Into<String>) -> Self {
        Self::NotFound(short_id.into())
    }

    /// Create an invalid-document error with a message.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::Expired {
            short_id: "a1B2c3D4".to_string(),
            expired_at: 1000,
        };
        assert_eq!(err.to_string(), "document expired: a1B2c3D4 (expired at 1000)");

        let err = StoreError::invalid("expiry before creation");
        assert_eq!(err.to_string(), "invalid document: expiry before creation");

        assert_eq!(StoreError::not_found("x").to_string(), "document not found: x");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StoreError>();
    }
}
