//! Error types for the adapter engine.

use gitdht_store::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Result type for adapter operations.
pub type DhtResult<T> = Result<T, Error>;

/// Errors surfaced by the adapter engine.
///
/// Table adapters translate client failures into this type and never
/// attempt recovery themselves; retry and failover belong to the policy
/// carried by the consistency router's handles. A missing row, column, or
/// repository is never an error.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying store failed.
    #[error("storage error: {0}")]
    Store(StoreError),

    /// The operation exceeded the store client's timeout.
    #[error("operation timed out after {elapsed:?}")]
    Timeout {
        /// How long the operation ran before timing out.
        elapsed: Duration,
    },

    /// A background task on the worker pool failed or was dropped.
    #[error("background task failed: {message}")]
    TaskFailed {
        /// Description of the failure.
        message: String,
    },

    /// A connection URI could not be parsed.
    #[error("invalid connection URI: {message}")]
    InvalidUri {
        /// Description of the problem.
        message: String,
    },

    /// A required argument was missing or inconsistent.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// A stored key could not be decoded.
    #[error("invalid key encoding: {message}")]
    InvalidKey {
        /// Description of the problem.
        message: String,
    },
}

impl Error {
    /// Creates a task failure error.
    pub fn task_failed(message: impl Into<String>) -> Self {
        Self::TaskFailed {
            message: message.into(),
        }
    }

    /// Creates an invalid URI error.
    pub fn invalid_uri(message: impl Into<String>) -> Self {
        Self::InvalidUri {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an invalid key error.
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        // Timeouts stay a distinct condition; everything else is wrapped.
        match err {
            StoreError::Timeout { elapsed } => Self::Timeout { elapsed },
            other => Self::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_stays_distinct() {
        let err: Error = StoreError::timeout(Duration::from_secs(3)).into();
        assert!(matches!(err, Error::Timeout { .. }));
    }

    #[test]
    fn other_store_errors_are_wrapped() {
        let err: Error = StoreError::connection("host down").into();
        assert!(matches!(err, Error::Store(StoreError::Connection(_))));
    }
}
