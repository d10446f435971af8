//! The store's native query object and query responses
//!
//! `NativeQuery` is what actually crosses the `Datastore` seam: a kind plus
//! the composed filter/order/limit/offset/cursor/distinct/projection state.
//! Construction is fluent; each method overwrites its own clause and leaves
//! the rest untouched, so partial composition in any order is fine.

use crate::entity::Entity;
use crate::key::IntoKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The store's fixed comparison set for property filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Equal,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
        }
    }
}

/// One (property, operator, value) comparison. Filters on a query are ANDed
/// in the order they were applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub property: String,
    pub op: Operator,
    pub value: Value,
}

impl Filter {
    pub fn new(property: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Self {
            property: property.into(),
            op,
            value: value.into(),
        }
    }
}

/// Sort direction for an ordered query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Opaque, backend-issued continuation token.
///
/// Callers must pass it back unmodified; its contents are meaningful only to
/// the backend that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Continuation status reported by the backend alongside query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultsStatus {
    MoreResults,
    NoMoreResults,
    NotFinished,
    NoResults,
}

/// A query scoped to one kind, ready for execution by a [`Datastore`].
///
/// [`Datastore`]: crate::Datastore
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeQuery {
    kind: String,
    filters: Vec<Filter>,
    order: Option<(String, Direction)>,
    limit: Option<u32>,
    offset: Option<u32>,
    start_cursor: Option<Cursor>,
    distinct_on: Vec<String>,
    projection: Vec<String>,
}

impl NativeQuery {
    pub fn new(kind: impl IntoKind) -> Self {
        Self {
            kind: kind.into_kind(),
            filters: Vec::new(),
            order: None,
            limit: None,
            offset: None,
            start_cursor: None,
            distinct_on: Vec::new(),
            projection: Vec::new(),
        }
    }

    /// AND another property filter onto the query.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, property: impl Into<String>, direction: Direction) -> Self {
        self.order = Some((property.into(), direction));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Start the result stream at a previously issued cursor.
    pub fn start(mut self, cursor: Cursor) -> Self {
        self.start_cursor = Some(cursor);
        self
    }

    pub fn group_by<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.distinct_on = properties.into_iter().map(Into::into).collect();
        self
    }

    /// Project the result down to the named fields.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn order(&self) -> Option<&(String, Direction)> {
        self.order.as_ref()
    }

    pub fn limit_value(&self) -> Option<u32> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<u32> {
        self.offset
    }

    pub fn start_cursor(&self) -> Option<&Cursor> {
        self.start_cursor.as_ref()
    }

    pub fn distinct_on(&self) -> &[String] {
        &self.distinct_on
    }

    pub fn projection(&self) -> &[String] {
        &self.projection
    }
}

/// Raw two-part query result: records plus continuation info.
#[derive(Debug, Clone, Default)]
pub struct QueryResponse {
    pub entities: Vec<Entity<Value>>,
    pub more_results: Option<ResultsStatus>,
    pub end_cursor: Option<Cursor>,
}
