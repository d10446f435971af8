//! `StoreClient`: the access-layer facade
//!
//! One client owns one [`ConnectionManager`] and routes every remote call
//! through the retry policy — except delete, which is a direct passthrough.
//! The client is cheaply cloneable (Arc internals) so it can be captured by
//! pagination state and shared across tasks.

use crate::config::ClientConfig;
use crate::connection::{Connect, ConnectionManager};
use crate::error::Result;
use crate::executor::Executor;
use crate::page::Page;
use crate::queryable::{QueryResult, Queryable};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tether_store::{
    CredentialsProvider, Entity, EntityBuilder, Id, IntoKind, Key, NativeQuery,
};
use tracing::debug;

#[derive(Clone)]
pub struct StoreClient {
    executor: Executor,
}

impl StoreClient {
    /// Connect with the default configuration (5 s retry cooldown).
    pub async fn connect(
        provider: impl CredentialsProvider,
        connector: impl Connect,
    ) -> Result<Self> {
        Self::connect_with(provider, connector, ClientConfig::default()).await
    }

    pub async fn connect_with(
        provider: impl CredentialsProvider,
        connector: impl Connect,
        config: ClientConfig,
    ) -> Result<Self> {
        let manager =
            ConnectionManager::connect(Arc::new(provider), Arc::new(connector)).await?;
        Ok(Self {
            executor: Executor::new(Arc::new(manager), config.retry_cooldown),
        })
    }

    pub fn manager(&self) -> &Arc<ConnectionManager> {
        self.executor.manager()
    }

    /// Build a key. Pure construction; no I/O.
    pub fn create_key(kind: impl IntoKind, id: impl Into<Id>) -> Key {
        Key::new(kind, id)
    }

    /// Save one entity under its explicit key. Retried once on failure.
    pub async fn save<T: Serialize>(&self, entity: Entity<T>) -> Result<()> {
        self.save_many(vec![entity]).await
    }

    /// Save a batch of entities. Retried once on failure; explicit keys make
    /// the write idempotent, so the semantics under retry are at-least-once.
    pub async fn save_many<T: Serialize>(&self, entities: Vec<Entity<T>>) -> Result<()> {
        let wire = entities
            .into_iter()
            .map(Entity::into_wire)
            .collect::<tether_store::Result<Vec<_>>>()?;
        debug!(count = wire.len(), "saving entities");
        let wire = Arc::new(wire);
        self.executor
            .execute(|conn| {
                let wire = Arc::clone(&wire);
                async move { conn.store().save(&wire).await }
            })
            .await
    }

    /// Derive the key from the builder's (kind, id), then save.
    pub async fn save_builder<T: Serialize>(&self, builder: EntityBuilder<T>) -> Result<()> {
        self.save(builder.into_entity()).await
    }

    /// Fetch the records for one key (zero or one element).
    pub async fn get(&self, key: &Key) -> Result<Vec<Entity<Value>>> {
        self.get_many(std::slice::from_ref(key)).await
    }

    /// Fetch a batch of keys. Missing keys are absent from the result.
    pub async fn get_many(&self, keys: &[Key]) -> Result<Vec<Entity<Value>>> {
        debug!(count = keys.len(), "fetching entities");
        let keys = Arc::new(keys.to_vec());
        self.executor
            .execute(|conn| {
                let keys = Arc::clone(&keys);
                async move { conn.store().get(&keys).await }
            })
            .await
    }

    /// The first record for `key`, or `None` if there is none. Never fails
    /// on an empty result, only on underlying errors after retry exhaustion.
    pub async fn get_single(&self, key: &Key) -> Result<Option<Entity<Value>>> {
        Ok(self.get(key).await?.into_iter().next())
    }

    /// Typed [`get_single`](Self::get_single).
    pub async fn get_single_as<T: DeserializeOwned>(
        &self,
        key: &Key,
    ) -> Result<Option<Entity<T>>> {
        match self.get_single(key).await? {
            Some(entity) => Ok(Some(entity.into_typed()?)),
            None => Ok(None),
        }
    }

    /// Delete one key. Direct passthrough: failures propagate immediately,
    /// with no retry and no renewal.
    pub async fn delete(&self, key: &Key) -> Result<()> {
        self.delete_many(std::slice::from_ref(key)).await
    }

    /// Delete a batch of keys. Direct passthrough, like [`delete`](Self::delete).
    pub async fn delete_many(&self, keys: &[Key]) -> Result<()> {
        debug!(count = keys.len(), "deleting entities");
        let keys = keys.to_vec();
        self.executor
            .direct(|conn| async move { conn.store().delete(&keys).await })
            .await
    }

    /// Compose a native query scoped to `kind` and execute it through the
    /// retry policy. Composition is pure and happens once; only the remote
    /// call is retried.
    pub async fn query<F>(&self, kind: impl IntoKind, compose: F) -> Result<QueryResult<Entity<Value>>>
    where
        F: FnOnce(NativeQuery) -> NativeQuery,
    {
        self.run_native(compose(NativeQuery::new(kind))).await
    }

    /// Every entity of `kind`: `query` with the identity composition.
    pub async fn get_all(&self, kind: impl IntoKind) -> Result<QueryResult<Entity<Value>>> {
        self.query(kind, |query| query).await
    }

    /// Execute a declarative [`Queryable`], clause by clause.
    pub async fn run_query(&self, queryable: &Queryable) -> Result<QueryResult<Entity<Value>>> {
        self.run_native(queryable.to_native()).await
    }

    /// Typed [`run_query`](Self::run_query).
    pub async fn run_query_as<T: DeserializeOwned>(
        &self,
        queryable: &Queryable,
    ) -> Result<QueryResult<Entity<T>>> {
        Ok(self.run_query(queryable).await?.into_typed()?)
    }

    /// Execute a [`Queryable`] and wrap the first page for lazy, cursor-
    /// driven continuation. No further page is fetched until
    /// [`Page::next_page`] is called.
    pub async fn run_paginated(&self, queryable: &Queryable) -> Result<Page> {
        let result = self.run_query(queryable).await?;
        Ok(Page::from_result(self.clone(), queryable, result))
    }

    async fn run_native(&self, query: NativeQuery) -> Result<QueryResult<Entity<Value>>> {
        debug!(kind = query.kind(), "running query");
        let query = Arc::new(query);
        let response = self
            .executor
            .execute(|conn| {
                let query = Arc::clone(&query);
                async move { conn.store().run_query(&query).await }
            })
            .await?;
        Ok(QueryResult::from_response(response))
    }
}
