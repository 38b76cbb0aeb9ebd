//! Store error model.

use thiserror::Error;

use pharmatrack_core::DomainError;

/// Result type used across the store layer.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error surfaced by store operations.
///
/// Domain failures (validation, duplicate names, missing rows, overdrawn
/// stock) pass through unchanged; anything raised by the database driver is
/// wrapped as `Database`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// The domain failure, if this is one.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            StoreError::Domain(err) => Some(err),
            StoreError::Database(_) => None,
        }
    }
}
