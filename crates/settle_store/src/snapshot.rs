//! Snapshot store trait definitions.

use crate::error::StoreResult;
use crate::timestamp::Timestamp;

/// A scoped store session.
///
/// Sessions are acquired per reconciliation cycle and released exactly
/// once: `close` consumes the session and reports release failures.
/// Implementations also release their resources on drop, covering
/// early-exit paths where `close` is never reached.
pub trait SnapshotSession {
    /// Releases the session.
    ///
    /// # Errors
    ///
    /// Returns an error if release-time I/O fails; the session is gone
    /// either way.
    fn close(self) -> StoreResult<()>;
}

/// A session for reading the snapshot blob.
pub trait DownloadSession: SnapshotSession {
    /// Reads the full snapshot blob.
    ///
    /// Returns `None` when no snapshot exists yet; the caller
    /// substitutes a fresh empty collection without failing.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be read.
    fn read_snapshot(&mut self) -> StoreResult<Option<Vec<u8>>>;
}

/// A session for replacing the snapshot blob.
pub trait UploadSession: SnapshotSession {
    /// Replaces the snapshot with `bytes`, atomically from the point of
    /// view of concurrent downloads.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be written.
    fn write_snapshot(&mut self, bytes: &[u8]) -> StoreResult<()>;
}

/// The durable remote snapshot: one versioned blob per synchronized
/// data kind, plus its last-modified marker.
///
/// The two associated session types let different transports plug in
/// without changing the merge algorithm; the engine only ever sees
/// paired acquire/release calls around whole-blob reads and writes.
pub trait SnapshotStore: Send + Sync {
    /// Session type for downloads.
    type Download: DownloadSession;
    /// Session type for uploads.
    type Upload: UploadSession;

    /// Acquires a download session.
    ///
    /// Acquisition succeeds even when no snapshot exists yet; the
    /// session's read then returns `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or locked.
    fn open_download(&self) -> StoreResult<Self::Download>;

    /// Acquires an upload session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or locked.
    fn open_upload(&self) -> StoreResult<Self::Upload>;

    /// Reads the snapshot's last-modified marker.
    ///
    /// Returns `None` when no snapshot exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker cannot be read.
    fn read_timestamp(&self) -> StoreResult<Option<Timestamp>>;

    /// Writes the snapshot's last-modified marker.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker cannot be written.
    fn write_timestamp(&self, timestamp: Timestamp) -> StoreResult<()>;
}
