//! Keys: (kind, id) addresses for records in the store
//!
//! A `Key` is a value object: equality, ordering and hashing are structural
//! over the (kind, id) pair, and the pair is immutable once constructed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability for types usable as a record kind.
///
/// Implemented for `String` and `&str` so free-form kinds work out of the
/// box; domain enums implement it to get strongly-typed call sites:
///
/// ```
/// use tether_store::IntoKind;
///
/// enum Domain {
///     User,
///     Session,
/// }
///
/// impl IntoKind for Domain {
///     fn into_kind(self) -> String {
///         match self {
///             Domain::User => "User".to_string(),
///             Domain::Session => "Session".to_string(),
///         }
///     }
/// }
///
/// assert_eq!(Domain::User.into_kind(), "User".into_kind());
/// ```
pub trait IntoKind {
    fn into_kind(self) -> String;
}

impl IntoKind for String {
    fn into_kind(self) -> String {
        self
    }
}

impl IntoKind for &str {
    fn into_kind(self) -> String {
        self.to_string()
    }
}

impl IntoKind for &String {
    fn into_kind(self) -> String {
        self.clone()
    }
}

/// Record identifier within a kind: a name or a numeric id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Numeric(i64),
    Name(String),
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Id::Name(name.to_string())
    }
}

impl From<String> for Id {
    fn from(name: String) -> Self {
        Id::Name(name)
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Numeric(n)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Numeric(n) => write!(f, "{n}"),
            Id::Name(s) => write!(f, "{s}"),
        }
    }
}

/// Address of one record: (kind, id).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key {
    kind: String,
    id: Id,
}

impl Key {
    /// Pure construction; no I/O, never fails for well-formed inputs.
    pub fn new(kind: impl IntoKind, id: impl Into<Id>) -> Self {
        Self {
            kind: kind.into_kind(),
            id: id.into(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> &Id {
        &self.id
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.id)
    }
}
