//! Cursor-driven pagination as an explicit state machine
//!
//! A [`Page`] holds the entities of one query execution plus the state
//! needed to advance: either a continuation (the original queryable with the
//! cursor substituted) or exhaustion. Advancing is pull-based — nothing is
//! fetched until [`Page::next_page`] — and pages are not cached, so
//! re-advancing an old page re-executes the same remote query with the same
//! cursor. That is safe only for read-only, deterministic queries.

use crate::client::StoreClient;
use crate::error::Result;
use crate::queryable::{QueryResult, Queryable};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tether_store::{Cursor, Entity};

/// One page of a paginated query.
pub struct Page {
    entities: Vec<Entity<Value>>,
    cursor: Option<Cursor>,
    state: PageState,
    client: StoreClient,
}

/// Continuation state. `Continue` carries the already-substituted queryable
/// for the next page, so advancing is a plain re-execution; `Exhausted`
/// terminates, idempotently.
#[derive(Debug, Clone)]
enum PageState {
    Continue { next: Queryable },
    Exhausted,
}

impl Page {
    pub(crate) fn from_result(
        client: StoreClient,
        queryable: &Queryable,
        result: QueryResult<Entity<Value>>,
    ) -> Self {
        // Continue only when the backend issued a cursor and this page has
        // content; anything else is the end of the stream.
        let state = match (&result.cursor, result.is_empty()) {
            (Some(cursor), false) => PageState::Continue {
                next: queryable.with_cursor(cursor.clone()),
            },
            _ => PageState::Exhausted,
        };
        Self {
            entities: result.entities,
            cursor: result.cursor,
            state,
            client,
        }
    }

    fn terminal(client: StoreClient) -> Self {
        Self {
            entities: Vec::new(),
            cursor: None,
            state: PageState::Exhausted,
            client,
        }
    }

    pub fn entities(&self) -> &[Entity<Value>] {
        &self.entities
    }

    pub fn into_entities(self) -> Vec<Entity<Value>> {
        self.entities
    }

    /// Convert this page's entities to typed form.
    pub fn entities_as<T: DeserializeOwned>(&self) -> tether_store::Result<Vec<Entity<T>>> {
        self.entities
            .iter()
            .cloned()
            .map(Entity::into_typed)
            .collect()
    }

    /// The backend cursor this page ended on, if any.
    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// True when advancing cannot yield more data.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, PageState::Exhausted)
    }

    /// Fetch the next page by re-executing the queryable with the cursor
    /// substituted for the offset. On an exhausted page this returns another
    /// terminal page — empty, cursorless, and itself exhausted — so calling
    /// past the end is safe and never yields new data.
    pub async fn next_page(&self) -> Result<Page> {
        match &self.state {
            PageState::Continue { next } => self.client.run_paginated(next).await,
            PageState::Exhausted => Ok(Page::terminal(self.client.clone())),
        }
    }
}
