//! # Settle Store
//!
//! Store contracts and backends for Settle.
//!
//! This crate defines the two I/O seams the reconciliation engine calls
//! into, and ships an implementation pair for each:
//!
//! - [`SnapshotStore`] - the durable remote snapshot blob plus its
//!   last-modified version marker, accessed through paired
//!   download/upload sessions
//!   - [`FileSnapshotStore`] - one snapshot file per data kind
//!   - [`MemorySnapshotStore`] - for testing and ephemeral use
//! - [`LocalStore`] - the authoritative local record collection
//!   - [`MemoryLocalStore`] - for testing (real deployments adapt their
//!     own datastore)
//!
//! ## Session model
//!
//! Sessions are acquired per cycle and released exactly once:
//! [`SnapshotSession::close`] consumes the session, and every concrete
//! session also releases its resources on drop, so early-exit paths
//! never leak a lock.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod local;
mod memory;
mod snapshot;
mod timestamp;

pub use error::{StoreError, StoreResult};
pub use file::{FileDownloadSession, FileSnapshotStore, FileUploadSession};
pub use local::{LocalStore, MemoryLocalStore};
pub use memory::{MemoryDownloadSession, MemorySnapshotStore, MemoryUploadSession};
pub use snapshot::{DownloadSession, SnapshotSession, SnapshotStore, UploadSession};
pub use timestamp::Timestamp;
