//! Local store contract and in-memory implementation.

use crate::error::{StoreError, StoreResult};
use parking_lot::RwLock;
use settle_model::{Keyed, RecordCollection, RecordKind};
use std::sync::Arc;

/// The authoritative local record collection.
///
/// Three operations, each atomic from the engine's point of view; no
/// transactions are required across them. All must be safe to call with
/// empty inputs (no-op). Implementations adapt whatever datastore
/// actually owns the records.
pub trait LocalStore: Send + Sync {
    /// Enumerates the current local records.
    ///
    /// # Errors
    ///
    /// Returns an error if the local store cannot be read.
    fn load_all(&self) -> StoreResult<RecordCollection>;

    /// Adds `records` to the local store.
    ///
    /// With `skip_existing`, records whose natural key already exists
    /// are skipped rather than duplicated or rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn add_all(&self, records: &RecordCollection, skip_existing: bool) -> StoreResult<()>;

    /// Removes every record of `kind` whose natural key is in `keys`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn remove_matching(&self, kind: RecordKind, keys: &[String]) -> StoreResult<()>;
}

#[derive(Debug, Default)]
struct LocalState {
    records: RecordCollection,
    fail_writes: bool,
}

/// An in-memory local store for testing.
///
/// Clones share the same underlying collection, so a test can inspect
/// state the engine mutated through its own handle.
#[derive(Debug, Clone, Default)]
pub struct MemoryLocalStore {
    state: Arc<RwLock<LocalState>>,
}

impl MemoryLocalStore {
    /// Creates an empty local store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a local store seeded with `records`.
    #[must_use]
    pub fn with_records(records: RecordCollection) -> Self {
        Self {
            state: Arc::new(RwLock::new(LocalState {
                records,
                fail_writes: false,
            })),
        }
    }

    /// Makes every subsequent write fail, to exercise failure paths.
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.write().fail_writes = fail;
    }

    /// Returns a copy of the current records.
    #[must_use]
    pub fn records(&self) -> RecordCollection {
        self.state.read().records.clone()
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.state.read().fail_writes {
            Err(StoreError::Unavailable("local store write failure".into()))
        } else {
            Ok(())
        }
    }
}

impl LocalStore for MemoryLocalStore {
    fn load_all(&self) -> StoreResult<RecordCollection> {
        Ok(self.state.read().records.clone())
    }

    fn add_all(&self, records: &RecordCollection, skip_existing: bool) -> StoreResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        self.check_writable()?;
        self.state.write().records.union(records, skip_existing);
        Ok(())
    }

    fn remove_matching(&self, kind: RecordKind, keys: &[String]) -> StoreResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        self.check_writable()?;
        let mut state = self.state.write();
        match kind {
            RecordKind::Users => remove_keys(&mut state.records.users, keys),
            RecordKind::Keywords => remove_keys(&mut state.records.keywords, keys),
            RecordKind::Sources => remove_keys(&mut state.records.sources, keys),
            RecordKind::Links => remove_keys(&mut state.records.links, keys),
        }
        Ok(())
    }
}

fn remove_keys<T: Keyed>(records: &mut Option<Vec<T>>, keys: &[String]) {
    if let Some(records) = records.as_mut() {
        records.retain(|record| !keys.iter().any(|key| key == record.natural_key()));
    }
}
