//! Entities: keyed records with arbitrary structured data
//!
//! Entities are transient DTOs assembled per call. On the wire the data is a
//! `serde_json::Value` (the store is schema-less); typed conversions go
//! through serde both ways.

use crate::error::Result;
use crate::key::{Id, IntoKind, Key};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A keyed record with data and an optional list of field paths the store
/// should not index (large or unbounded text fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity<T> {
    pub key: Key,
    pub data: T,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_from_indexes: Vec<String>,
}

impl<T> Entity<T> {
    /// Pure assembly of a key and its data.
    pub fn new(key: Key, data: T) -> Self {
        Self {
            key,
            data,
            exclude_from_indexes: Vec::new(),
        }
    }

    /// Mark data fields as excluded from indexing, in the given order.
    pub fn exclude_from_indexes<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_from_indexes = fields.into_iter().map(Into::into).collect();
        self
    }
}

impl<T: Serialize> Entity<T> {
    /// Convert typed data to the wire form.
    pub fn into_wire(self) -> Result<Entity<Value>> {
        Ok(Entity {
            key: self.key,
            data: serde_json::to_value(self.data)?,
            exclude_from_indexes: self.exclude_from_indexes,
        })
    }
}

impl Entity<Value> {
    /// Convert wire data back to a typed entity.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<Entity<T>> {
        Ok(Entity {
            key: self.key,
            data: serde_json::from_value(self.data)?,
            exclude_from_indexes: self.exclude_from_indexes,
        })
    }
}

/// Convenience precursor to an [`Entity`]: carries (kind, id) instead of a
/// built key. The access layer derives the key before saving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityBuilder<T> {
    pub kind: String,
    pub id: Id,
    pub data: T,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_from_indexes: Vec<String>,
}

impl<T> EntityBuilder<T> {
    pub fn new(kind: impl IntoKind, id: impl Into<Id>, data: T) -> Self {
        Self {
            kind: kind.into_kind(),
            id: id.into(),
            data,
            exclude_from_indexes: Vec::new(),
        }
    }

    pub fn exclude_from_indexes<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_from_indexes = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Derive the key from (kind, id), then assemble the entity.
    pub fn into_entity(self) -> Entity<T> {
        let key = Key::new(self.kind, self.id);
        Entity {
            key,
            data: self.data,
            exclude_from_indexes: self.exclude_from_indexes,
        }
    }
}
