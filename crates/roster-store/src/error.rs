//! Storage error types.

use std::path::PathBuf;
use thiserror::Error;

/// Storage operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file could not be opened or created.
    #[error("failed to open database {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Schema creation or connection setup failed.
    #[error("failed to prepare database schema")]
    Schema {
        #[source]
        source: rusqlite::Error,
    },

    /// A statement failed.
    #[error("{operation} failed: {source}")]
    Sqlite {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

impl StoreError {
    /// Wraps a statement error with the operation that raised it.
    pub(crate) fn op(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> StoreError {
        move |source| StoreError::Sqlite { operation, source }
    }

    /// Whether the failure was lock contention that outlasted the busy timeout.
    pub fn is_busy(&self) -> bool {
        let source = match self {
            Self::Open { source, .. } | Self::Schema { source } | Self::Sqlite { source, .. } => {
                source
            }
        };
        matches!(
            source.sqlite_error_code(),
            Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked)
        )
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
