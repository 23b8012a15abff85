//! Error types for point ledger storage.

use point_ledger_core::LedgerError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backend failed to serve the request.
    #[error("backend error: {0}")]
    Backend(String),

    /// The history id counter cannot issue another id.
    #[error("history id space exhausted")]
    IdSpaceExhausted,
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}
