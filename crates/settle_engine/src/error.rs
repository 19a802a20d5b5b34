//! Error types for the reconciliation engine.

use settle_codec::CodecError;
use settle_store::{StoreError, Timestamp};
use thiserror::Error;

/// Result type for reconciliation operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can abort a reconciliation cycle.
///
/// No error is swallowed and no retry happens at this layer; retry
/// policy belongs to the outer scheduler.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A snapshot store session could not be acquired, or snapshot I/O
    /// failed.
    #[error("snapshot store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    /// The snapshot blob could not be decoded (or, in degenerate cases,
    /// encoded).
    ///
    /// The snapshot must be treated as untrustworthy; it is never
    /// silently replaced with local-only data.
    #[error("snapshot codec error: {0}")]
    Codec(#[from] CodecError),

    /// The local store could not be enumerated.
    #[error("local store read failed: {0}")]
    LocalReadFailure(#[source] StoreError),

    /// A local add or remove batch failed. The cycle aborts with no
    /// compensation; a re-run converges.
    #[error("local store write failed: {0}")]
    LocalWriteFailure(#[source] StoreError),

    /// Another writer replaced the snapshot between download and
    /// upload; the cycle aborts instead of overwriting.
    #[error("snapshot modified concurrently (downloaded marker {downloaded:?}, current {current:?})")]
    ConcurrentModification {
        /// Marker observed when the cycle downloaded the snapshot.
        downloaded: Option<Timestamp>,
        /// Marker observed just before the upload.
        current: Option<Timestamp>,
    },

    /// A cycle is already running on this engine.
    #[error("a reconciliation cycle is already in progress")]
    CycleInProgress,
}

impl SyncError {
    /// True if re-running the whole cycle may succeed without operator
    /// intervention.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::ConcurrentModification { .. } | SyncError::CycleInProgress => true,
            SyncError::StoreUnavailable(source) => matches!(source, StoreError::Locked),
            _ => false,
        }
    }
}
