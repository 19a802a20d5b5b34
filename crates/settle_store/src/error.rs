//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A session could not be acquired because another session holds
    /// the store's lock.
    #[error("store is locked by another session")]
    Locked,

    /// The store is unreachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
