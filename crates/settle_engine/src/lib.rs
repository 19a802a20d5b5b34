//! # Settle Engine
//!
//! Snapshot-based set reconciliation for Settle.
//!
//! The engine keeps a locally owned record collection synchronized with
//! a remotely persisted snapshot of the same collection when both sides
//! may have diverged independently. One [`SyncEngine::sync`] call runs
//! one reconciliation cycle:
//!
//! 1. Acquire a download session from the snapshot store (a missing
//!    snapshot becomes a fresh empty collection)
//! 2. Load the remote and local collections
//! 3. Diff: records only present locally go to the snapshot, records
//!    only present remotely go to the local store
//! 4. Apply both deltas; upload a replacement snapshot only when its
//!    content actually changed
//! 5. Release every session, on success and failure paths alike
//!
//! ## Key Invariants
//!
//! - Phases run strictly in sequence; one cycle at a time per engine
//! - Every corrective operation is an idempotent set union/difference,
//!   so re-running an aborted cycle converges instead of duplicating
//! - A failure anywhere aborts the cycle; nothing is partially
//!   committed to the durable snapshot
//! - The upload step fails with [`SyncError::ConcurrentModification`]
//!   rather than overwriting a snapshot another writer replaced
//!   mid-cycle
//!
//! ## Deletion model
//!
//! The downloaded snapshot doubles as the merge baseline, so a record
//! absent from both sides is indistinguishable from one that never
//! existed. Cross-device deletions therefore travel through explicit
//! removal requests ([`SyncEngine::request_removal`]), not through the
//! diff.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod state;

pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use state::{CyclePhase, SyncCycleResult, SyncEngine, SyncStats};
