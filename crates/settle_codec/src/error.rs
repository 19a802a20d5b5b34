//! Error types for snapshot encoding and decoding.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding a snapshot.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The snapshot blob is structurally invalid.
    ///
    /// The blob must be treated as untrustworthy; callers abort the
    /// cycle rather than silently replacing it with local-only data.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// The snapshot was written by a newer format than this build
    /// understands.
    #[error("unsupported snapshot format version {found} (supported up to {supported})")]
    UnsupportedVersion {
        /// Version found in the blob.
        found: u16,
        /// Highest version this build can read.
        supported: u16,
    },

    /// Writing the encoded bytes failed.
    ///
    /// Encoding a well-formed in-memory collection cannot itself fail;
    /// this only surfaces writer plumbing errors.
    #[error("snapshot write failed: {0}")]
    Write(String),
}
