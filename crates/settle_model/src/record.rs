//! Record types synchronized by Settle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The sub-collection kinds a [`crate::RecordCollection`] manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Filtered users, keyed by an account-scoped user key.
    Users,
    /// Filtered keywords, keyed by the keyword text.
    Keywords,
    /// Filtered client sources, keyed by the source name.
    Sources,
    /// Filtered links, keyed by the link pattern.
    Links,
}

impl RecordKind {
    /// All kinds, in the order they appear in a snapshot.
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Users,
        RecordKind::Keywords,
        RecordKind::Sources,
        RecordKind::Links,
    ];

    /// Stable lowercase name, used for snapshot fields and log lines.
    pub fn name(self) -> &'static str {
        match self {
            RecordKind::Users => "users",
            RecordKind::Keywords => "keywords",
            RecordKind::Sources => "sources",
            RecordKind::Links => "links",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A record keyed by a natural value.
///
/// The natural key identifies a record within its sub-collection; set
/// operations that match "by key" go through this trait. Full equality
/// (`PartialEq`) additionally compares every field.
pub trait Keyed {
    /// Returns the record's natural key.
    fn natural_key(&self) -> &str;
}

/// A filtered user entry.
///
/// Keyed by `user_key`, an account-scoped identifier. The display fields
/// are carried for presentation on other devices and participate in full
/// value equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Account-scoped user key.
    pub user_key: String,
    /// Display name, if known at capture time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Screen name, if known at capture time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_name: Option<String>,
}

impl UserRecord {
    /// Creates a user record with no display metadata.
    pub fn new(user_key: impl Into<String>) -> Self {
        Self {
            user_key: user_key.into(),
            name: None,
            screen_name: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the screen name.
    pub fn with_screen_name(mut self, screen_name: impl Into<String>) -> Self {
        self.screen_name = Some(screen_name.into());
        self
    }
}

impl Keyed for UserRecord {
    fn natural_key(&self) -> &str {
        &self.user_key
    }
}

/// A plain value entry (keyword, source, or link).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRecord {
    /// The filtered value; doubles as the natural key.
    pub value: String,
}

impl ValueRecord {
    /// Creates a value record.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl Keyed for ValueRecord {
    fn natural_key(&self) -> &str {
        &self.value
    }
}
