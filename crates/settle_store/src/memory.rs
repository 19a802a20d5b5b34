//! In-memory snapshot store for testing.

use crate::error::{StoreError, StoreResult};
use crate::snapshot::{DownloadSession, SnapshotSession, SnapshotStore, UploadSession};
use crate::timestamp::Timestamp;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Default)]
struct MemoryState {
    blob: Option<Vec<u8>>,
    modified: Option<Timestamp>,
    unavailable: bool,
}

/// An in-memory snapshot store.
///
/// Suitable for unit and integration tests and for ephemeral
/// collections that never need to survive the process. Clones share the
/// same underlying state, so a test can hold one handle while the
/// engine owns another.
///
/// # Example
///
/// ```
/// use settle_store::{DownloadSession, MemorySnapshotStore, SnapshotSession, SnapshotStore};
///
/// let store = MemorySnapshotStore::new();
/// let mut session = store.open_download().unwrap();
/// assert_eq!(session.read_snapshot().unwrap(), None);
/// session.close().unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemorySnapshotStore {
    /// Creates an empty store with no snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding a pre-existing snapshot.
    #[must_use]
    pub fn with_snapshot(blob: Vec<u8>, modified: Timestamp) -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryState {
                blob: Some(blob),
                modified: Some(modified),
                unavailable: false,
            })),
        }
    }

    /// Simulates the store becoming unreachable; session acquisition
    /// and marker access fail until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unavailable = unavailable;
    }

    /// Returns a copy of the current snapshot blob, if any.
    #[must_use]
    pub fn blob(&self) -> Option<Vec<u8>> {
        self.state.read().blob.clone()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.state.read().unavailable {
            Err(StoreError::Unavailable("memory store offline".into()))
        } else {
            Ok(())
        }
    }
}

impl SnapshotStore for MemorySnapshotStore {
    type Download = MemoryDownloadSession;
    type Upload = MemoryUploadSession;

    fn open_download(&self) -> StoreResult<Self::Download> {
        self.check_available()?;
        Ok(MemoryDownloadSession {
            state: Arc::clone(&self.state),
        })
    }

    fn open_upload(&self) -> StoreResult<Self::Upload> {
        self.check_available()?;
        Ok(MemoryUploadSession {
            state: Arc::clone(&self.state),
        })
    }

    fn read_timestamp(&self) -> StoreResult<Option<Timestamp>> {
        self.check_available()?;
        Ok(self.state.read().modified)
    }

    fn write_timestamp(&self, timestamp: Timestamp) -> StoreResult<()> {
        self.check_available()?;
        self.state.write().modified = Some(timestamp);
        Ok(())
    }
}

/// Download session over the in-memory snapshot.
#[derive(Debug)]
pub struct MemoryDownloadSession {
    state: Arc<RwLock<MemoryState>>,
}

impl DownloadSession for MemoryDownloadSession {
    fn read_snapshot(&mut self) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.state.read().blob.clone())
    }
}

impl SnapshotSession for MemoryDownloadSession {
    fn close(self) -> StoreResult<()> {
        Ok(())
    }
}

/// Upload session over the in-memory snapshot.
#[derive(Debug)]
pub struct MemoryUploadSession {
    state: Arc<RwLock<MemoryState>>,
}

impl UploadSession for MemoryUploadSession {
    fn write_snapshot(&mut self, bytes: &[u8]) -> StoreResult<()> {
        self.state.write().blob = Some(bytes.to_vec());
        Ok(())
    }
}

impl SnapshotSession for MemoryUploadSession {
    fn close(self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_has_no_snapshot() {
        let store = MemorySnapshotStore::new();
        let mut session = store.open_download().unwrap();
        assert_eq!(session.read_snapshot().unwrap(), None);
        session.close().unwrap();
        assert_eq!(store.read_timestamp().unwrap(), None);
    }

    #[test]
    fn upload_is_visible_to_later_downloads() {
        let store = MemorySnapshotStore::new();

        let mut upload = store.open_upload().unwrap();
        upload.write_snapshot(b"blob").unwrap();
        upload.close().unwrap();
        store.write_timestamp(Timestamp::from_millis(42)).unwrap();

        let mut download = store.open_download().unwrap();
        assert_eq!(
            download.read_snapshot().unwrap().as_deref(),
            Some(b"blob".as_slice())
        );
        download.close().unwrap();
        assert_eq!(
            store.read_timestamp().unwrap(),
            Some(Timestamp::from_millis(42))
        );
    }

    #[test]
    fn clones_share_state() {
        let store = MemorySnapshotStore::new();
        let other = store.clone();

        let mut upload = store.open_upload().unwrap();
        upload.write_snapshot(b"shared").unwrap();
        upload.close().unwrap();

        assert_eq!(other.blob().as_deref(), Some(b"shared".as_slice()));
    }

    #[test]
    fn unavailable_store_refuses_sessions() {
        let store = MemorySnapshotStore::new();
        store.set_unavailable(true);

        assert!(matches!(
            store.open_download(),
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.open_upload(),
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.read_timestamp(),
            Err(StoreError::Unavailable(_))
        ));

        store.set_unavailable(false);
        assert!(store.open_download().is_ok());
    }
}
