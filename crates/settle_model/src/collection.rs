//! The record collection and its set algebra.

use crate::record::{Keyed, RecordKind, UserRecord, ValueRecord};
use serde::{Deserialize, Serialize};

/// A named tuple of per-kind record sets.
///
/// Each sub-collection is either absent (`None`, meaning "no data of this
/// kind present") or a set of records unique by natural key. Absent and
/// empty compare equal everywhere, but the distinction survives encoding
/// so a snapshot written by a peer that never produced a kind stays
/// byte-stable.
///
/// There is intentionally no `PartialEq` impl: the only meaningful
/// equality between collections is [`RecordCollection::content_equals`],
/// which ignores ordering and the absent/empty distinction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordCollection {
    /// Filtered users.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<UserRecord>>,
    /// Filtered keywords.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<ValueRecord>>,
    /// Filtered sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<ValueRecord>>,
    /// Filtered links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<ValueRecord>>,
}

impl RecordCollection {
    /// Creates a collection with every sub-collection absent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `other`'s records into `self`, per sub-collection.
    ///
    /// With `ignore_duplicates`, records whose natural key is already
    /// present are silently skipped. Without it, records are appended
    /// as-is; callers use that form only when the source is known to be
    /// key-disjoint from `self`.
    ///
    /// Returns whether any record was actually added, so callers can
    /// short-circuit a write-back when nothing changed.
    pub fn union(&mut self, other: &RecordCollection, ignore_duplicates: bool) -> bool {
        let mut added = false;
        added |= union_into(&mut self.users, &other.users, ignore_duplicates);
        added |= union_into(&mut self.keywords, &other.keywords, ignore_duplicates);
        added |= union_into(&mut self.sources, &other.sources, ignore_duplicates);
        added |= union_into(&mut self.links, &other.links, ignore_duplicates);
        added
    }

    /// Removes from `self`, per sub-collection, every record whose
    /// natural key is present in `other`.
    ///
    /// Returns whether anything was removed.
    pub fn difference(&mut self, other: &RecordCollection) -> bool {
        let mut removed = false;
        removed |= difference_from(&mut self.users, &other.users);
        removed |= difference_from(&mut self.keywords, &other.keywords);
        removed |= difference_from(&mut self.sources, &other.sources);
        removed |= difference_from(&mut self.links, &other.links);
        removed
    }

    /// Returns a new collection containing `self`'s records with
    /// `other`'s records removed by key.
    ///
    /// Pure: neither operand is mutated.
    #[must_use]
    pub fn minus(&self, other: &RecordCollection) -> RecordCollection {
        let mut diff = self.clone();
        diff.difference(other);
        diff
    }

    /// True iff every sub-collection is absent or empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        is_blank(&self.users)
            && is_blank(&self.keywords)
            && is_blank(&self.sources)
            && is_blank(&self.links)
    }

    /// Per sub-collection full-value set equality, order irrelevant.
    ///
    /// An absent sub-collection equals an empty one.
    #[must_use]
    pub fn content_equals(&self, other: &RecordCollection) -> bool {
        set_equals(&self.users, &other.users)
            && set_equals(&self.keywords, &other.keywords)
            && set_equals(&self.sources, &other.sources)
            && set_equals(&self.links, &other.links)
    }

    /// Natural keys of one sub-collection; empty for an absent one.
    #[must_use]
    pub fn natural_keys(&self, kind: RecordKind) -> Vec<String> {
        match kind {
            RecordKind::Users => keys_of(&self.users),
            RecordKind::Keywords => keys_of(&self.keywords),
            RecordKind::Sources => keys_of(&self.sources),
            RecordKind::Links => keys_of(&self.links),
        }
    }

    /// Total number of records across all sub-collections.
    #[must_use]
    pub fn record_count(&self) -> usize {
        len_of(&self.users) + len_of(&self.keywords) + len_of(&self.sources) + len_of(&self.links)
    }
}

fn union_into<T>(dst: &mut Option<Vec<T>>, src: &Option<Vec<T>>, ignore_duplicates: bool) -> bool
where
    T: Keyed + Clone,
{
    let src = match src {
        Some(records) if !records.is_empty() => records,
        // Never materialize an empty sub-collection in `dst`.
        _ => return false,
    };
    let dst = dst.get_or_insert_with(Vec::new);
    let mut added = false;
    for record in src {
        if ignore_duplicates && dst.iter().any(|r| r.natural_key() == record.natural_key()) {
            continue;
        }
        dst.push(record.clone());
        added = true;
    }
    added
}

fn difference_from<T: Keyed>(dst: &mut Option<Vec<T>>, other: &Option<Vec<T>>) -> bool {
    let Some(dst) = dst.as_mut() else {
        return false;
    };
    let Some(other) = other.as_ref() else {
        return false;
    };
    if dst.is_empty() || other.is_empty() {
        return false;
    }
    let before = dst.len();
    dst.retain(|record| {
        !other
            .iter()
            .any(|o| o.natural_key() == record.natural_key())
    });
    before != dst.len()
}

// Sub-collections are small (user filter lists), so quadratic membership
// checks beat hashing here.
fn set_equals<T: PartialEq>(a: &Option<Vec<T>>, b: &Option<Vec<T>>) -> bool {
    let a = a.as_deref().unwrap_or(&[]);
    let b = b.as_deref().unwrap_or(&[]);
    a.len() == b.len() && a.iter().all(|record| b.contains(record))
}

fn is_blank<T>(records: &Option<Vec<T>>) -> bool {
    records.as_ref().is_none_or(|v| v.is_empty())
}

fn keys_of<T: Keyed>(records: &Option<Vec<T>>) -> Vec<String> {
    records
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .map(|record| record.natural_key().to_owned())
        .collect()
}

fn len_of<T>(records: &Option<Vec<T>>) -> usize {
    records.as_ref().map_or(0, Vec::len)
}
