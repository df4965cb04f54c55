//! Error types for wide-column store clients.

use std::time::Duration;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while talking to the underlying store.
///
/// Every implementation of [`crate::ColumnStore`] wraps its native failure
/// modes into this type; store-specific error types never cross this
/// boundary. A missing row or column is **not** an error — reads report
/// absence through `Option` or an empty collection.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A connection or protocol-level failure in the client.
    #[error("connection error: {0}")]
    Connection(String),

    /// The operation exceeded the client's configured timeout.
    #[error("operation timed out after {elapsed:?}")]
    Timeout {
        /// How long the operation ran before timing out.
        elapsed: Duration,
    },

    /// The request named a column family the store does not know.
    #[error("unknown column family: {0}")]
    UnknownColumnFamily(String),
}

impl StoreError {
    /// Creates a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(elapsed: Duration) -> Self {
        Self::Timeout { elapsed }
    }
}
