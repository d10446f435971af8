//! Tether Client: resilient access layer for a remote document store
//!
//! This crate sits between application code and a store backend (any
//! [`Datastore`] implementation) and provides:
//!
//! - **Connection lifecycle**: [`ConnectionManager`] owns the single live
//!   handle and rebuilds it from re-fetched credentials on renewal
//! - **Resilient execution**: every save/get/query is retried exactly once
//!   after a fixed cooldown and a connection renewal; delete is a direct
//!   passthrough
//! - **Keys and entities**: typed construction of (kind, id) addresses and
//!   keyed records
//! - **Declarative queries**: [`Queryable`] descriptions translated clause
//!   by clause into the store's native query object
//! - **Pagination**: [`Page`], a pull-based cursor state machine
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use serde_json::json;
//! use tether_client::{Connect, StoreClient};
//! use tether_store::{Credentials, Datastore, Entity, Key, MemoryStore, StaticCredentials};
//!
//! struct MemoryConnect;
//!
//! #[async_trait]
//! impl Connect for MemoryConnect {
//!     async fn connect(
//!         &self,
//!         _credentials: &Credentials,
//!     ) -> tether_store::Result<Arc<dyn Datastore>> {
//!         Ok(Arc::new(MemoryStore::new()))
//!     }
//! }
//!
//! # async fn example(credentials: Credentials) -> tether_client::Result<()> {
//! let client = StoreClient::connect(StaticCredentials::new(credentials), MemoryConnect).await?;
//!
//! let key = StoreClient::create_key("User", "u1");
//! client.save(Entity::new(key.clone(), json!({"name": "Ann"}))).await?;
//!
//! let fetched = client.get_single(&key).await?;
//! assert_eq!(fetched.unwrap().data["name"], "Ann");
//! # Ok(())
//! # }
//! ```
//!
//! [`Datastore`]: tether_store::Datastore

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod page;
pub mod queryable;

pub use client::StoreClient;
pub use config::{ClientConfig, DEFAULT_RETRY_COOLDOWN};
pub use connection::{Connect, Connection, ConnectionManager};
pub use error::{ClientError, Result};
pub use executor::Executor;
pub use page::Page;
pub use queryable::{Clause, QueryResult, Queryable};
