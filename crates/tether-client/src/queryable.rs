//! Declarative queries and their translation into the native query object
//!
//! A [`Queryable`] is a serializable description of a query: every field is
//! optional except the kind, and absent fields are no-ops. Translation is an
//! ordered sequence of named [`Clause`] steps folded over a fresh native
//! query, so the construction is introspectable and testable rather than an
//! opaque callback.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tether_store::{
    Cursor, Direction, Entity, Filter, IntoKind, NativeQuery, QueryResponse, ResultsStatus,
};

/// Declarative, serializable query description. Owns no remote resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Queryable {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<(String, Direction)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projection: Vec<String>,
}

impl Queryable {
    pub fn new(kind: impl IntoKind) -> Self {
        Self {
            kind: kind.into_kind(),
            limit: None,
            offset: None,
            filters: Vec::new(),
            order: None,
            cursor: None,
            group_by: Vec::new(),
            projection: Vec::new(),
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, property: impl Into<String>, direction: Direction) -> Self {
        self.order = Some((property.into(), direction));
        self
    }

    pub fn cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn group_by<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = properties.into_iter().map(Into::into).collect();
        self
    }

    pub fn projection<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = fields.into_iter().map(Into::into).collect();
        self
    }

    /// The clause-application steps present on this queryable, in the fixed
    /// order they are applied: limit, offset, filters, order, cursor,
    /// group-by, projection.
    pub fn clauses(&self) -> Vec<Clause> {
        let mut clauses = Vec::new();
        if let Some(limit) = self.limit {
            clauses.push(Clause::Limit(limit));
        }
        if let Some(offset) = self.offset {
            clauses.push(Clause::Offset(offset));
        }
        for filter in &self.filters {
            clauses.push(Clause::Filter(filter.clone()));
        }
        if let Some((property, direction)) = &self.order {
            clauses.push(Clause::Order(property.clone(), *direction));
        }
        if let Some(cursor) = &self.cursor {
            clauses.push(Clause::Start(cursor.clone()));
        }
        if !self.group_by.is_empty() {
            clauses.push(Clause::GroupBy(self.group_by.clone()));
        }
        if !self.projection.is_empty() {
            clauses.push(Clause::Projection(self.projection.clone()));
        }
        clauses
    }

    /// Fold the clause sequence over a fresh native query.
    pub fn to_native(&self) -> NativeQuery {
        self.clauses()
            .into_iter()
            .fold(NativeQuery::new(self.kind.clone()), |query, clause| {
                clause.apply(query)
            })
    }

    /// The same query continued from `cursor`. The offset is dropped: once a
    /// cursor is supplied, no other field governs page continuation.
    pub fn with_cursor(&self, cursor: Cursor) -> Self {
        let mut next = self.clone();
        next.cursor = Some(cursor);
        next.offset = None;
        next
    }
}

/// One named clause-application step.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Limit(u32),
    Offset(u32),
    Filter(Filter),
    Order(String, Direction),
    Start(Cursor),
    GroupBy(Vec<String>),
    Projection(Vec<String>),
}

impl Clause {
    pub fn apply(self, query: NativeQuery) -> NativeQuery {
        match self {
            Clause::Limit(limit) => query.limit(limit),
            Clause::Offset(offset) => query.offset(offset),
            Clause::Filter(filter) => query.filter(filter),
            Clause::Order(property, direction) => query.order_by(property, direction),
            Clause::Start(cursor) => query.start(cursor),
            Clause::GroupBy(properties) => query.group_by(properties),
            Clause::Projection(fields) => query.select(fields),
        }
    }
}

/// Normalized query result: entities, continuation status, end cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<T> {
    pub entities: Vec<T>,
    pub results_status: ResultsStatus,
    pub cursor: Option<Cursor>,
}

impl QueryResult<Entity<Value>> {
    /// Normalize a raw backend response: entities default to empty, a
    /// missing status becomes `NoResults`, the cursor is the backend's end
    /// cursor if present.
    pub fn from_response(response: QueryResponse) -> Self {
        Self {
            entities: response.entities,
            results_status: response.more_results.unwrap_or(ResultsStatus::NoResults),
            cursor: response.end_cursor,
        }
    }

    /// Convert every entity's data to `T`.
    pub fn into_typed<T: DeserializeOwned>(self) -> tether_store::Result<QueryResult<Entity<T>>> {
        let entities = self
            .entities
            .into_iter()
            .map(Entity::into_typed)
            .collect::<tether_store::Result<Vec<_>>>()?;
        Ok(QueryResult {
            entities,
            results_status: self.results_status,
            cursor: self.cursor,
        })
    }
}

impl<T> QueryResult<T> {
    /// True when the backend reported no results at all.
    pub fn is_empty(&self) -> bool {
        self.results_status == ResultsStatus::NoResults
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tether_store::{Key, Operator};

    #[test]
    fn clauses_come_out_in_fixed_order() {
        let queryable = Queryable::new("User")
            .projection(["name"])
            .group_by(["team"])
            .cursor(Cursor::new("abc"))
            .order_by("age", Direction::Ascending)
            .filter(Filter::new("team", Operator::Equal, "red"))
            .filter(Filter::new("age", Operator::GreaterThan, 18))
            .offset(4)
            .limit(2);

        let clauses = queryable.clauses();
        assert_eq!(clauses.len(), 8);
        assert_eq!(clauses[0], Clause::Limit(2));
        assert_eq!(clauses[1], Clause::Offset(4));
        assert_eq!(
            clauses[2],
            Clause::Filter(Filter::new("team", Operator::Equal, "red"))
        );
        assert_eq!(
            clauses[3],
            Clause::Filter(Filter::new("age", Operator::GreaterThan, 18))
        );
        assert_eq!(clauses[4], Clause::Order("age".to_string(), Direction::Ascending));
        assert_eq!(clauses[5], Clause::Start(Cursor::new("abc")));
        assert_eq!(clauses[6], Clause::GroupBy(vec!["team".to_string()]));
        assert_eq!(clauses[7], Clause::Projection(vec!["name".to_string()]));
    }

    #[test]
    fn partial_queryable_yields_only_present_clauses() {
        let queryable = Queryable::new("User").limit(10);
        assert_eq!(queryable.clauses(), vec![Clause::Limit(10)]);

        let bare = Queryable::new("User");
        assert!(bare.clauses().is_empty());
        assert_eq!(bare.to_native(), NativeQuery::new("User"));
    }

    #[test]
    fn to_native_mirrors_the_clause_sequence() {
        let queryable = Queryable::new("User")
            .limit(3)
            .filter(Filter::new("age", Operator::LessThan, 30))
            .order_by("age", Direction::Descending);
        let native = queryable.to_native();

        assert_eq!(native.kind(), "User");
        assert_eq!(native.limit_value(), Some(3));
        assert_eq!(native.filters().len(), 1);
        assert_eq!(
            native.order(),
            Some(&("age".to_string(), Direction::Descending))
        );
    }

    #[test]
    fn with_cursor_substitutes_continuation_and_drops_offset() {
        let queryable = Queryable::new("User").limit(2).offset(6);
        let next = queryable.with_cursor(Cursor::new("resume"));

        assert_eq!(next.cursor, Some(Cursor::new("resume")));
        assert_eq!(next.offset, None);
        assert_eq!(next.limit, Some(2));
        assert_eq!(next.kind, "User");
    }

    #[test]
    fn normalization_defaults() {
        let result = QueryResult::from_response(QueryResponse::default());
        assert!(result.entities.is_empty());
        assert_eq!(result.results_status, ResultsStatus::NoResults);
        assert!(result.cursor.is_none());
        assert!(result.is_empty());

        let populated = QueryResult::from_response(QueryResponse {
            entities: vec![Entity::new(Key::new("User", "u1"), json!({"name": "Ann"}))],
            more_results: Some(ResultsStatus::MoreResults),
            end_cursor: Some(Cursor::new("c1")),
        });
        assert!(!populated.is_empty());
        assert_eq!(populated.cursor, Some(Cursor::new("c1")));
    }

    #[test]
    fn queryable_serializes_partially() {
        let queryable = Queryable::new("User").limit(2);
        let raw = serde_json::to_value(&queryable).unwrap();
        assert_eq!(raw, json!({"kind": "User", "limit": 2}));

        let back: Queryable = serde_json::from_value(raw).unwrap();
        assert_eq!(back, queryable);
    }
}
