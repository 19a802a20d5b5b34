//! File-based snapshot store.

use crate::error::{StoreError, StoreResult};
use crate::snapshot::{DownloadSession, SnapshotSession, SnapshotStore, UploadSession};
use crate::timestamp::Timestamp;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A snapshot store backed by one file per data kind:
///
/// ```text
/// <dir>/
/// ├─ <kind>.snapshot      # the versioned blob
/// ├─ <kind>.snapshot.tmp  # staging file for atomic replace
/// └─ <kind>.lock          # advisory lock taken by sessions
/// ```
///
/// Download sessions take a shared lock on the lock file, upload
/// sessions a non-blocking exclusive one; contention surfaces as
/// [`StoreError::Locked`]. Uploads stage into the temp file and rename
/// over the blob, so a concurrent download never observes a partial
/// write. The file's mtime is the snapshot's version marker.
#[derive(Debug)]
pub struct FileSnapshotStore {
    kind: String,
    path: PathBuf,
    temp_path: PathBuf,
    lock_path: PathBuf,
}

impl FileSnapshotStore {
    /// Opens a store for `kind` inside `dir`, creating the directory if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: &Path, kind: &str) -> StoreResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            kind: kind.to_owned(),
            path: dir.join(format!("{kind}.snapshot")),
            temp_path: dir.join(format!("{kind}.snapshot.tmp")),
            lock_path: dir.join(format!("{kind}.lock")),
        })
    }

    /// The data kind this store holds.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Path of the snapshot blob.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_lock_file(&self) -> StoreResult<File> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)?;
        Ok(file)
    }
}

impl SnapshotStore for FileSnapshotStore {
    type Download = FileDownloadSession;
    type Upload = FileUploadSession;

    fn open_download(&self) -> StoreResult<Self::Download> {
        let lock_file = self.open_lock_file()?;
        FileExt::try_lock_shared(&lock_file).map_err(|_| StoreError::Locked)?;

        let snapshot = match File::open(&self.path) {
            Ok(file) => Some(file),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        debug!(
            kind = %self.kind,
            exists = snapshot.is_some(),
            "opened snapshot download session"
        );
        Ok(FileDownloadSession {
            lock_file,
            snapshot,
        })
    }

    fn open_upload(&self) -> StoreResult<Self::Upload> {
        let lock_file = self.open_lock_file()?;
        FileExt::try_lock_exclusive(&lock_file).map_err(|_| StoreError::Locked)?;
        debug!(kind = %self.kind, "opened snapshot upload session");
        Ok(FileUploadSession {
            lock_file,
            path: self.path.clone(),
            temp_path: self.temp_path.clone(),
        })
    }

    fn read_timestamp(&self) -> StoreResult<Option<Timestamp>> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(Some(meta.modified()?.into())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_timestamp(&self, timestamp: Timestamp) -> StoreResult<()> {
        let file = OpenOptions::new().write(true).open(&self.path)?;
        file.set_modified(timestamp.into())?;
        Ok(())
    }
}

/// Download session over the snapshot file.
///
/// Holds a shared advisory lock until closed or dropped.
#[derive(Debug)]
pub struct FileDownloadSession {
    lock_file: File,
    snapshot: Option<File>,
}

impl DownloadSession for FileDownloadSession {
    fn read_snapshot(&mut self) -> StoreResult<Option<Vec<u8>>> {
        let Some(file) = self.snapshot.as_mut() else {
            return Ok(None);
        };
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(Some(bytes))
    }
}

impl SnapshotSession for FileDownloadSession {
    fn close(self) -> StoreResult<()> {
        FileExt::unlock(&self.lock_file)?;
        Ok(())
    }
}

/// Upload session over the snapshot file.
///
/// Holds an exclusive advisory lock until closed or dropped.
#[derive(Debug)]
pub struct FileUploadSession {
    lock_file: File,
    path: PathBuf,
    temp_path: PathBuf,
}

impl UploadSession for FileUploadSession {
    fn write_snapshot(&mut self, bytes: &[u8]) -> StoreResult<()> {
        let mut temp = File::create(&self.temp_path)?;
        temp.write_all(bytes)?;
        temp.sync_all()?;
        fs::rename(&self.temp_path, &self.path)?;
        debug!(path = %self.path.display(), len = bytes.len(), "replaced snapshot");
        Ok(())
    }
}

impl SnapshotSession for FileUploadSession {
    fn close(self) -> StoreResult<()> {
        FileExt::unlock(&self.lock_file)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_snapshot_reads_as_none() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path(), "filters").unwrap();

        let mut session = store.open_download().unwrap();
        assert_eq!(session.read_snapshot().unwrap(), None);
        session.close().unwrap();

        assert_eq!(store.read_timestamp().unwrap(), None);
    }

    #[test]
    fn upload_then_download_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path(), "filters").unwrap();

        let mut upload = store.open_upload().unwrap();
        upload.write_snapshot(b"snapshot-bytes").unwrap();
        upload.close().unwrap();

        let mut download = store.open_download().unwrap();
        assert_eq!(
            download.read_snapshot().unwrap().as_deref(),
            Some(b"snapshot-bytes".as_slice())
        );
        download.close().unwrap();

        // The staging file must not survive a completed write.
        assert!(!store.temp_path.exists());
        assert!(store.read_timestamp().unwrap().is_some());
    }

    #[test]
    fn upload_replaces_previous_content() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path(), "filters").unwrap();

        let mut upload = store.open_upload().unwrap();
        upload.write_snapshot(b"first version, longer").unwrap();
        upload.close().unwrap();

        let mut upload = store.open_upload().unwrap();
        upload.write_snapshot(b"second").unwrap();
        upload.close().unwrap();

        let mut download = store.open_download().unwrap();
        assert_eq!(
            download.read_snapshot().unwrap().as_deref(),
            Some(b"second".as_slice())
        );
        download.close().unwrap();
    }

    #[test]
    fn concurrent_upload_sessions_conflict() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path(), "filters").unwrap();

        let held = store.open_upload().unwrap();
        assert!(matches!(store.open_upload(), Err(StoreError::Locked)));
        assert!(matches!(store.open_download(), Err(StoreError::Locked)));
        held.close().unwrap();

        assert!(store.open_upload().is_ok());
    }

    #[test]
    fn dropped_session_releases_lock() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path(), "filters").unwrap();

        let session = store.open_upload().unwrap();
        drop(session);

        assert!(store.open_upload().is_ok());
    }

    #[test]
    fn concurrent_downloads_share_the_lock() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path(), "filters").unwrap();

        let first = store.open_download().unwrap();
        let second = store.open_download().unwrap();
        first.close().unwrap();
        second.close().unwrap();
    }

    #[test]
    fn timestamp_write_and_read_back() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::open(dir.path(), "filters").unwrap();

        let mut upload = store.open_upload().unwrap();
        upload.write_snapshot(b"data").unwrap();
        upload.close().unwrap();

        let marker = Timestamp::from_millis(1_700_000_000_000);
        store.write_timestamp(marker).unwrap();
        assert_eq!(store.read_timestamp().unwrap(), Some(marker));
    }

    #[test]
    fn stores_for_different_kinds_do_not_collide() {
        let dir = tempdir().unwrap();
        let filters = FileSnapshotStore::open(dir.path(), "filters").unwrap();
        let drafts = FileSnapshotStore::open(dir.path(), "drafts").unwrap();

        let mut upload = filters.open_upload().unwrap();
        upload.write_snapshot(b"filters-data").unwrap();
        upload.close().unwrap();

        let mut download = drafts.open_download().unwrap();
        assert_eq!(download.read_snapshot().unwrap(), None);
        download.close().unwrap();
        assert_ne!(filters.path(), drafts.path());
    }
}
