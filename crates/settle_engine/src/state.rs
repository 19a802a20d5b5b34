//! Reconciliation cycle state machine.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use parking_lot::RwLock;
use settle_codec::{decode_snapshot, encode_snapshot};
use settle_model::{RecordCollection, RecordKind};
use settle_store::{
    DownloadSession, LocalStore, SnapshotSession, SnapshotStore, Timestamp, UploadSession,
};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// The engine's position within a reconciliation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// No cycle has run yet.
    Idle,
    /// Acquiring the snapshot download session.
    Acquiring,
    /// Loading the remote and local collections.
    Loading,
    /// Computing the two-sided diff.
    Diffing,
    /// Applying deltas to the local store.
    Applying,
    /// Writing the replacement snapshot.
    Uploading,
    /// The last cycle completed.
    Synced,
    /// The last cycle aborted.
    Error,
}

impl CyclePhase {
    /// True while a cycle is running.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            CyclePhase::Acquiring
                | CyclePhase::Loading
                | CyclePhase::Diffing
                | CyclePhase::Applying
                | CyclePhase::Uploading
        )
    }

    /// True if a new cycle may start.
    pub fn can_start_cycle(&self) -> bool {
        matches!(
            self,
            CyclePhase::Idle | CyclePhase::Synced | CyclePhase::Error
        )
    }
}

/// Cumulative statistics across cycles.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Completed cycles.
    pub cycles_completed: u64,
    /// Records pulled into the local store.
    pub records_added_locally: u64,
    /// Records pushed into the snapshot.
    pub records_pushed: u64,
    /// Snapshot uploads actually performed.
    pub uploads: u64,
    /// Message of the last error, cleared on the next success.
    pub last_error: Option<String>,
}

/// Result of one reconciliation cycle.
#[derive(Debug, Clone)]
pub struct SyncCycleResult {
    /// Records added to the local store (remote-only additions).
    pub added_locally: usize,
    /// Removal-request keys applied to the local store.
    pub removed_locally: usize,
    /// Records merged into the outgoing snapshot (local-only
    /// additions).
    pub pushed_remote: usize,
    /// Whether a replacement snapshot was uploaded. False when the
    /// merged content was identical to the downloaded snapshot.
    pub uploaded: bool,
    /// Wall-clock duration of the cycle.
    pub duration: Duration,
}

/// The reconciliation engine.
///
/// Owns a snapshot store and a local store for one data kind and runs
/// one cycle per [`SyncEngine::sync`] call. The engine is not
/// internally parallel; the calling scheduler serializes cycles per
/// data kind.
pub struct SyncEngine<S: SnapshotStore, L: LocalStore> {
    config: SyncConfig,
    snapshots: S,
    local: L,
    pending_removals: RwLock<RecordCollection>,
    phase: RwLock<CyclePhase>,
    stats: RwLock<SyncStats>,
}

impl<S: SnapshotStore, L: LocalStore> SyncEngine<S, L> {
    /// Creates a new engine over the given stores.
    pub fn new(config: SyncConfig, snapshots: S, local: L) -> Self {
        Self {
            config,
            snapshots,
            local,
            pending_removals: RwLock::new(RecordCollection::new()),
            phase: RwLock::new(CyclePhase::Idle),
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// Gets the current phase.
    pub fn phase(&self) -> CyclePhase {
        *self.phase.read()
    }

    /// Gets the cumulative stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Queues records for removal from the local store.
    ///
    /// This is how a deletion made on another device propagates: the
    /// requested natural keys are removed from the local store during
    /// the next cycle's apply phase, batched per sub-collection. The
    /// request is cleared only after a fully successful cycle;
    /// re-applying it on a retry is an idempotent no-op.
    pub fn request_removal(&self, removals: RecordCollection) {
        self.pending_removals.write().union(&removals, true);
    }

    fn set_phase(&self, phase: CyclePhase) {
        *self.phase.write() = phase;
    }

    /// Runs one reconciliation cycle.
    ///
    /// # Errors
    ///
    /// Any I/O or codec failure aborts the whole cycle; nothing is
    /// partially committed to the durable snapshot. See [`SyncError`]
    /// for the taxonomy. A failed cycle is safe to re-run.
    pub fn sync(&self) -> SyncResult<SyncCycleResult> {
        if !self.phase().can_start_cycle() {
            return Err(SyncError::CycleInProgress);
        }

        let start = Instant::now();
        match self.run_cycle() {
            Ok(mut result) => {
                result.duration = start.elapsed();
                self.set_phase(CyclePhase::Synced);

                let mut stats = self.stats.write();
                stats.cycles_completed += 1;
                stats.records_added_locally += result.added_locally as u64;
                stats.records_pushed += result.pushed_remote as u64;
                if result.uploaded {
                    stats.uploads += 1;
                }
                stats.last_error = None;
                drop(stats);

                info!(
                    kind = %self.config.data_kind,
                    added_locally = result.added_locally,
                    removed_locally = result.removed_locally,
                    pushed_remote = result.pushed_remote,
                    uploaded = result.uploaded,
                    "sync cycle complete"
                );
                Ok(result)
            }
            Err(e) => {
                self.set_phase(CyclePhase::Error);
                self.stats.write().last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn run_cycle(&self) -> SyncResult<SyncCycleResult> {
        // Phase 1: acquire.
        self.set_phase(CyclePhase::Acquiring);
        let mut download = self
            .snapshots
            .open_download()
            .map_err(SyncError::StoreUnavailable)?;
        let downloaded_marker = self
            .snapshots
            .read_timestamp()
            .map_err(SyncError::StoreUnavailable)?;

        // Phase 2: load. The download session is closed before decoding
        // so a malformed blob cannot leak the session.
        self.set_phase(CyclePhase::Loading);
        let blob = download
            .read_snapshot()
            .map_err(SyncError::StoreUnavailable)?;
        download.close().map_err(SyncError::StoreUnavailable)?;

        let snapshot_missing = blob.is_none();
        let remote = match blob {
            Some(bytes) => decode_snapshot(&bytes)?,
            None => RecordCollection::new(),
        };
        let local = self.local.load_all().map_err(SyncError::LocalReadFailure)?;
        debug!(
            kind = %self.config.data_kind,
            remote_records = remote.record_count(),
            local_records = local.record_count(),
            snapshot_missing,
            "loaded both sides"
        );

        // Phase 3: diff. The just-downloaded snapshot is the merge
        // base; see the crate docs for what that means for deletions.
        self.set_phase(CyclePhase::Diffing);
        let additions_for_local = remote.minus(&local);
        let additions_for_remote = local.minus(&remote);

        // Phase 4: apply, local side first.
        self.set_phase(CyclePhase::Applying);
        let added_locally = additions_for_local.record_count();
        if !additions_for_local.is_empty() {
            self.local
                .add_all(&additions_for_local, true)
                .map_err(SyncError::LocalWriteFailure)?;
        }

        let removals = self.pending_removals.read().clone();
        let mut removed_locally = 0;
        for kind in RecordKind::ALL {
            let keys = removals.natural_keys(kind);
            if keys.is_empty() {
                continue;
            }
            self.local
                .remove_matching(kind, &keys)
                .map_err(SyncError::LocalWriteFailure)?;
            removed_locally += keys.len();
        }

        // Phase 4, remote side: merge and upload only when the content
        // actually changed. A missing snapshot is created once there is
        // something to put in it.
        let mut outgoing = remote.clone();
        outgoing.union(&additions_for_remote, true);
        let pushed_remote = additions_for_remote.record_count();
        let should_upload = if snapshot_missing {
            !outgoing.is_empty()
        } else {
            !outgoing.content_equals(&remote)
        };

        let mut uploaded = false;
        if should_upload {
            self.set_phase(CyclePhase::Uploading);
            if self.config.require_unchanged_remote {
                let current = self
                    .snapshots
                    .read_timestamp()
                    .map_err(SyncError::StoreUnavailable)?;
                if current != downloaded_marker {
                    return Err(SyncError::ConcurrentModification {
                        downloaded: downloaded_marker,
                        current,
                    });
                }
            }

            let bytes = encode_snapshot(&outgoing)?;
            let mut upload = self
                .snapshots
                .open_upload()
                .map_err(SyncError::StoreUnavailable)?;
            upload
                .write_snapshot(&bytes)
                .map_err(SyncError::StoreUnavailable)?;
            upload.close().map_err(SyncError::StoreUnavailable)?;
            self.snapshots
                .write_timestamp(Timestamp::now())
                .map_err(SyncError::StoreUnavailable)?;
            uploaded = true;
        } else {
            debug!(kind = %self.config.data_kind, "snapshot unchanged, skipping upload");
        }

        // Phase 5: sessions are already released; drop the removal
        // requests this cycle fulfilled. Requests queued mid-cycle stay
        // pending.
        self.pending_removals.write().difference(&removals);

        Ok(SyncCycleResult {
            added_locally,
            removed_locally,
            pushed_remote,
            uploaded,
            duration: Duration::ZERO,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settle_store::{MemoryLocalStore, MemorySnapshotStore, StoreError};

    fn keywords(values: &[&str]) -> RecordCollection {
        RecordCollection {
            keywords: Some(
                values
                    .iter()
                    .copied()
                    .map(settle_model::ValueRecord::new)
                    .collect(),
            ),
            ..RecordCollection::new()
        }
    }

    #[test]
    fn phase_checks() {
        assert!(CyclePhase::Idle.can_start_cycle());
        assert!(CyclePhase::Synced.can_start_cycle());
        assert!(CyclePhase::Error.can_start_cycle());
        assert!(!CyclePhase::Applying.can_start_cycle());

        assert!(CyclePhase::Acquiring.is_active());
        assert!(CyclePhase::Uploading.is_active());
        assert!(!CyclePhase::Synced.is_active());
    }

    #[test]
    fn engine_initial_state() {
        let engine = SyncEngine::new(
            SyncConfig::default(),
            MemorySnapshotStore::new(),
            MemoryLocalStore::new(),
        );
        assert_eq!(engine.phase(), CyclePhase::Idle);
        assert_eq!(engine.stats().cycles_completed, 0);
    }

    #[test]
    fn empty_both_sides_writes_nothing() {
        let snapshots = MemorySnapshotStore::new();
        let engine = SyncEngine::new(
            SyncConfig::default(),
            snapshots.clone(),
            MemoryLocalStore::new(),
        );

        let result = engine.sync().unwrap();
        assert!(!result.uploaded);
        assert_eq!(result.added_locally, 0);
        assert!(snapshots.blob().is_none());
        assert_eq!(engine.phase(), CyclePhase::Synced);
    }

    #[test]
    fn failed_cycle_sets_error_phase_and_stats() {
        let snapshots = MemorySnapshotStore::new();
        snapshots.set_unavailable(true);
        let engine = SyncEngine::new(
            SyncConfig::default(),
            snapshots,
            MemoryLocalStore::new(),
        );

        let result = engine.sync();
        assert!(matches!(result, Err(SyncError::StoreUnavailable(_))));
        assert_eq!(engine.phase(), CyclePhase::Error);
        assert!(engine.stats().last_error.is_some());
    }

    #[test]
    fn local_write_failure_aborts_cycle() {
        let snapshots = MemorySnapshotStore::new();
        {
            let mut upload = snapshots.open_upload().unwrap();
            upload
                .write_snapshot(&encode_snapshot(&keywords(&["promo"])).unwrap())
                .unwrap();
            upload.close().unwrap();
            snapshots.write_timestamp(Timestamp::from_millis(1)).unwrap();
        }
        let local = MemoryLocalStore::new();
        local.set_fail_writes(true);

        let engine = SyncEngine::new(SyncConfig::default(), snapshots, local.clone());
        let result = engine.sync();
        assert!(matches!(result, Err(SyncError::LocalWriteFailure(_))));
        assert!(local.records().is_empty());
    }

    #[test]
    fn error_phase_still_allows_retry() {
        let snapshots = MemorySnapshotStore::new();
        snapshots.set_unavailable(true);
        let engine = SyncEngine::new(
            SyncConfig::default(),
            snapshots.clone(),
            MemoryLocalStore::new(),
        );

        assert!(engine.sync().is_err());
        snapshots.set_unavailable(false);
        assert!(engine.sync().is_ok());
        assert_eq!(engine.stats().last_error, None);
    }

    #[test]
    fn removal_requests_merge_and_survive_failed_cycles() {
        let snapshots = MemorySnapshotStore::new();
        snapshots.set_unavailable(true);
        let local = MemoryLocalStore::with_records(keywords(&["spam", "ad"]));
        let engine = SyncEngine::new(SyncConfig::default(), snapshots.clone(), local.clone());

        engine.request_removal(keywords(&["ad"]));
        engine.request_removal(keywords(&["ad"])); // duplicate request folds in

        assert!(engine.sync().is_err());
        // Nothing applied yet, request still pending.
        assert_eq!(local.records().record_count(), 2);

        snapshots.set_unavailable(false);
        let result = engine.sync().unwrap();
        assert_eq!(result.removed_locally, 1);
        assert_eq!(
            local.records().natural_keys(RecordKind::Keywords),
            ["spam"]
        );

        // Fulfilled requests do not re-apply on the next cycle.
        let result = engine.sync().unwrap();
        assert_eq!(result.removed_locally, 0);
    }

    #[test]
    fn unavailable_error_is_not_retryable_but_locked_is() {
        assert!(SyncError::StoreUnavailable(StoreError::Locked).is_retryable());
        assert!(
            !SyncError::StoreUnavailable(StoreError::Unavailable("gone".into())).is_retryable()
        );
    }
}
