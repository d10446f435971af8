//! Tether Store: the remote document store surface
//!
//! This crate defines everything the Tether access layer needs from a store
//! backend, without implementing a storage engine:
//!
//! - **Data model**: [`Key`] (kind + id addresses), [`Entity`] (keyed records
//!   with schema-less data), the native [`NativeQuery`] object and its
//!   response types
//! - **Backend seam**: the [`Datastore`] trait — batch save/get/delete plus
//!   query execution — implementable for any transport
//! - **Credentials**: the [`CredentialsProvider`] seam and file/static
//!   providers
//! - **Testing backend**: [`MemoryStore`], an in-memory `Datastore` with the
//!   full query surface
//!
//! # Example
//!
//! ```
//! use tether_store::{Datastore, Entity, Key, MemoryStore};
//! use serde_json::json;
//!
//! # async fn example() -> tether_store::Result<()> {
//! let store = MemoryStore::new();
//! let entity = Entity::new(Key::new("User", "u1"), json!({"name": "Ann"}));
//! store.save(std::slice::from_ref(&entity)).await?;
//!
//! let fetched = store.get(&[Key::new("User", "u1")]).await?;
//! assert_eq!(fetched[0].data["name"], "Ann");
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod datastore;
pub mod entity;
pub mod error;
pub mod key;
pub mod memory;
pub mod query;
pub mod token;

pub use credentials::{Credentials, CredentialsProvider, FileCredentials, StaticCredentials};
pub use datastore::Datastore;
pub use entity::{Entity, EntityBuilder};
pub use error::{Result, StoreError};
pub use key::{Id, IntoKind, Key};
pub use memory::MemoryStore;
pub use query::{
    Cursor, Direction, Filter, NativeQuery, Operator, QueryResponse, ResultsStatus,
};
pub use token::{default_random_token, random_token, DEFAULT_TOKEN_BYTES};
