//! # Settle Model
//!
//! The in-memory data model for Settle: record types and the
//! [`RecordCollection`] set algebra that the reconciliation engine is
//! built on.
//!
//! A collection holds four independent sub-collections (users, keywords,
//! sources, links). Each sub-collection is a set of atomic records keyed
//! by a natural value; records have no identity beyond value equality.
//!
//! ## Key Invariants
//!
//! - Within a sub-collection, no two records share a natural key after
//!   a duplicate-suppressing union
//! - An absent sub-collection ("no data of this kind") compares equal to
//!   an empty one but is preserved as absent through serialization
//! - Collection equality is [`RecordCollection::content_equals`] only:
//!   per sub-collection, full-value set equality, order irrelevant

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collection;
mod record;

pub use collection::RecordCollection;
pub use record::{Keyed, RecordKind, UserRecord, ValueRecord};
