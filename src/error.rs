//! Persistence error types.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures while writing settings or history to disk.
///
/// Reads never fail: unreadable or malformed files fall back to defaults.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
