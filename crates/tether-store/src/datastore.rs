//! The `Datastore` trait: the seam between the access layer and a backend
//!
//! Tether does not implement the remote store's engine. Everything the access
//! layer needs from a backend is expressed here, batch-first: single-record
//! operations are one-element batches at the call site.
//!
//! Implementations must be `Send + Sync + 'static` so a handle can be shared
//! across async boundaries behind an `Arc<dyn Datastore>`.

use crate::entity::Entity;
use crate::error::Result;
use crate::key::Key;
use crate::query::{NativeQuery, QueryResponse};
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait Datastore: Send + Sync + 'static {
    /// Upsert the given entities under their explicit keys.
    async fn save(&self, entities: &[Entity<Value>]) -> Result<()>;

    /// Fetch the records addressed by `keys`. Missing keys are simply absent
    /// from the result; an empty result is not an error.
    async fn get(&self, keys: &[Key]) -> Result<Vec<Entity<Value>>>;

    /// Delete the records addressed by `keys`. Deleting a missing key is a
    /// no-op.
    async fn delete(&self, keys: &[Key]) -> Result<()>;

    /// Execute a composed query, returning records plus continuation info.
    async fn run_query(&self, query: &NativeQuery) -> Result<QueryResponse>;
}
