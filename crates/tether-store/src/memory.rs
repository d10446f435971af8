//! In-memory `Datastore` backend
//!
//! `MemoryStore` implements the full query surface (filter, order, offset,
//! cursor, limit, group-by, projection) over a plain map. It exists for
//! tests and local development; it is not a storage engine. Cursors it
//! issues encode a resume position into the filtered, ordered record
//! sequence; callers must treat them as opaque.

use crate::datastore::Datastore;
use crate::entity::Entity;
use crate::error::{Result, StoreError};
use crate::key::Key;
use crate::query::{
    Cursor, Direction, Filter, NativeQuery, Operator, QueryResponse, ResultsStatus,
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<Key, Entity<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, across all kinds.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn save(&self, entities: &[Entity<Value>]) -> Result<()> {
        let mut records = self.records.write().await;
        for entity in entities {
            records.insert(entity.key.clone(), entity.clone());
        }
        Ok(())
    }

    async fn get(&self, keys: &[Key]) -> Result<Vec<Entity<Value>>> {
        let records = self.records.read().await;
        Ok(keys
            .iter()
            .filter_map(|key| records.get(key).cloned())
            .collect())
    }

    async fn delete(&self, keys: &[Key]) -> Result<()> {
        let mut records = self.records.write().await;
        for key in keys {
            records.remove(key);
        }
        Ok(())
    }

    async fn run_query(&self, query: &NativeQuery) -> Result<QueryResponse> {
        let records = self.records.read().await;

        // Kind scan in key order gives a deterministic base sequence.
        let mut matched: Vec<Entity<Value>> = records
            .values()
            .filter(|entity| entity.key.kind() == query.kind())
            .filter(|entity| query.filters().iter().all(|f| matches_filter(&entity.data, f)))
            .cloned()
            .collect();
        drop(records);

        if !query.distinct_on().is_empty() {
            matched = distinct_by(matched, query.distinct_on())?;
        }

        if let Some((property, direction)) = query.order() {
            matched.sort_by(|a, b| {
                let ord = compare_values(field_value(&a.data, property), field_value(&b.data, property))
                    .unwrap_or(Ordering::Equal);
                match direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }

        // A supplied cursor supersedes any offset.
        let start = match query.start_cursor() {
            Some(cursor) => decode_position(cursor)?,
            None => query.offset_value().unwrap_or(0) as usize,
        };

        let total = matched.len();
        let start = start.min(total);
        let end = match query.limit_value() {
            Some(limit) => (start + limit as usize).min(total),
            None => total,
        };

        let mut page: Vec<Entity<Value>> = matched[start..end].to_vec();
        if !query.projection().is_empty() {
            for entity in &mut page {
                entity.data = project(&entity.data, query.projection());
            }
        }

        debug!(
            kind = query.kind(),
            total,
            start,
            returned = page.len(),
            "ran memory query"
        );

        if page.is_empty() {
            // Nothing to continue from; leave status and cursor unset.
            return Ok(QueryResponse::default());
        }

        let more = if end < total {
            ResultsStatus::MoreResults
        } else {
            ResultsStatus::NoMoreResults
        };

        Ok(QueryResponse {
            entities: page,
            more_results: Some(more),
            end_cursor: Some(encode_position(end)),
        })
    }
}

/// Resolve a dotted field path inside entity data.
fn field_value<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

fn matches_filter(data: &Value, filter: &Filter) -> bool {
    let Some(actual) = field_value(data, &filter.property) else {
        return false;
    };
    let Some(ord) = compare_values(Some(actual), Some(&filter.value)) else {
        return false;
    };
    match filter.op {
        Operator::Equal => ord == Ordering::Equal,
        Operator::LessThan => ord == Ordering::Less,
        Operator::LessThanOrEqual => ord != Ordering::Greater,
        Operator::GreaterThan => ord == Ordering::Greater,
        Operator::GreaterThanOrEqual => ord != Ordering::Less,
    }
}

/// Compare two JSON values of like type; mixed or incomparable types yield
/// `None` and never match an inequality.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Option<Ordering> {
    match (a, b) {
        (None, None) => Some(Ordering::Equal),
        (None, Some(_)) => Some(Ordering::Less),
        (Some(_), None) => Some(Ordering::Greater),
        (Some(a), Some(b)) => match (a, b) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
            (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
            (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
            _ => None,
        },
    }
}

fn distinct_by(entities: Vec<Entity<Value>>, properties: &[String]) -> Result<Vec<Entity<Value>>> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(entities.len());
    for entity in entities {
        let group: Vec<Value> = properties
            .iter()
            .map(|p| field_value(&entity.data, p).cloned().unwrap_or(Value::Null))
            .collect();
        let fingerprint = serde_json::to_string(&group)?;
        if seen.insert(fingerprint) {
            kept.push(entity);
        }
    }
    Ok(kept)
}

fn project(data: &Value, fields: &[String]) -> Value {
    let mut out = Map::new();
    for field in fields {
        if let Some(value) = field_value(data, field) {
            out.insert(field.clone(), value.clone());
        }
    }
    Value::Object(out)
}

fn encode_position(position: usize) -> Cursor {
    Cursor::new(hex::encode(format!("pos:{position}")))
}

fn decode_position(cursor: &Cursor) -> Result<usize> {
    let bytes = hex::decode(cursor.as_str())
        .map_err(|_| StoreError::InvalidCursor(cursor.as_str().to_string()))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| StoreError::InvalidCursor(cursor.as_str().to_string()))?;
    text.strip_prefix("pos:")
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| StoreError::InvalidCursor(cursor.as_str().to_string()))
}
