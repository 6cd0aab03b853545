//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with the given key.
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// A uniqueness constraint would be violated.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// The backing store failed.
    #[error("database error: {0}")]
    Database(String),
}

impl StoreError {
    pub(crate) fn not_found(kind: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            kind,
            key: key.to_string(),
        }
    }
}

impl From<StoreError> for trustcircle_core::Error {
    fn from(err: StoreError) -> Self {
        use trustcircle_core::Error;

        match err {
            StoreError::NotFound { kind, .. } => Error::identification(format!("{kind} not found")),
            StoreError::Constraint(message) => Error::constraint(message),
            err @ StoreError::Database(_) => {
                Error::database("store operation failed").with_source(err)
            }
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
