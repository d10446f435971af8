//! Integration tests for tether-client
//!
//! These run the full stack — client, executor, connection manager — against
//! the in-memory backend, with a fault-injecting wrapper for the retry
//! policy tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tether_client::{ClientConfig, ClientError, Connect, Queryable, StoreClient};
use tether_store::{
    Credentials, Datastore, Direction, Entity, EntityBuilder, FileCredentials, Filter, Key,
    MemoryStore, NativeQuery, Operator, QueryResponse, StaticCredentials, StoreError,
};

fn credentials() -> Credentials {
    Credentials {
        credential_type: "service_account".to_string(),
        project_id: "demo-project".to_string(),
        private_key_id: "kid-1".to_string(),
        private_key: "key-material".to_string(),
        client_email: "svc@demo-project.example.com".to_string(),
        client_id: "1234567890".to_string(),
        auth_uri: "https://accounts.example.com/o/oauth2/auth".to_string(),
        token_uri: "https://oauth2.example.com/token".to_string(),
        auth_provider_cert_url: "https://www.example.com/oauth2/v1/certs".to_string(),
        client_cert_url: "https://www.example.com/robot/v1/metadata/x509/svc".to_string(),
    }
}

fn fast_config() -> ClientConfig {
    ClientConfig {
        retry_cooldown: Duration::from_millis(5),
    }
}

/// Connector handing out the same shared backend on every connect, so data
/// and injected faults survive renewals.
struct SharedConnect {
    store: Arc<dyn Datastore>,
    connects: Arc<AtomicU32>,
}

impl SharedConnect {
    fn new(store: Arc<dyn Datastore>) -> (Self, Arc<AtomicU32>) {
        let connects = Arc::new(AtomicU32::new(0));
        (
            Self {
                store,
                connects: Arc::clone(&connects),
            },
            connects,
        )
    }
}

#[async_trait]
impl Connect for SharedConnect {
    async fn connect(&self, _credentials: &Credentials) -> tether_store::Result<Arc<dyn Datastore>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&self.store))
    }
}

/// Backend wrapper that fails the next `failures` calls (any operation),
/// then delegates to the inner store. Counts every call.
struct FlakyStore {
    inner: MemoryStore,
    failures: AtomicU32,
    calls: AtomicU32,
}

impl FlakyStore {
    fn new(failures: u32) -> Self {
        Self {
            inner: MemoryStore::new(),
            failures: AtomicU32::new(failures),
            calls: AtomicU32::new(0),
        }
    }

    fn trip(&self) -> tether_store::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.fetch_sub(1, Ordering::SeqCst);
            return Err(StoreError::Transport("connection reset".to_string()));
        }
        Ok(())
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Datastore for FlakyStore {
    async fn save(&self, entities: &[Entity<Value>]) -> tether_store::Result<()> {
        self.trip()?;
        self.inner.save(entities).await
    }

    async fn get(&self, keys: &[Key]) -> tether_store::Result<Vec<Entity<Value>>> {
        self.trip()?;
        self.inner.get(keys).await
    }

    async fn delete(&self, keys: &[Key]) -> tether_store::Result<()> {
        self.trip()?;
        self.inner.delete(keys).await
    }

    async fn run_query(&self, query: &NativeQuery) -> tether_store::Result<QueryResponse> {
        self.trip()?;
        self.inner.run_query(query).await
    }
}

async fn memory_client() -> StoreClient {
    let (connector, _) = SharedConnect::new(Arc::new(MemoryStore::new()));
    StoreClient::connect_with(StaticCredentials::new(credentials()), connector, fast_config())
        .await
        .unwrap()
}

async fn seed_users(client: &StoreClient, count: usize) {
    let users: Vec<Entity<Value>> = (1..=count)
        .map(|n| {
            Entity::new(
                Key::new("User", format!("u{n}")),
                json!({"name": format!("user-{n}"), "age": 20 + n as i64}),
            )
        })
        .collect();
    client.save_many(users).await.unwrap();
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    name: String,
    age: i64,
}

#[tokio::test]
async fn save_then_get_round_trips_on_the_identical_key() {
    let client = memory_client().await;

    let key = StoreClient::create_key("User", "u1");
    client
        .save(Entity::new(key.clone(), json!({"name": "Ann"})))
        .await
        .unwrap();

    let fetched = client.get(&Key::new("User", "u1")).await.unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].data["name"], "Ann");
    assert_eq!(fetched[0].key, key);
}

#[tokio::test]
async fn entity_builder_saves_under_the_derived_key() {
    let client = memory_client().await;

    let builder = EntityBuilder::new("User", 42, User {
        name: "Bea".to_string(),
        age: 31,
    })
    .exclude_from_indexes(["name"]);
    client.save_builder(builder).await.unwrap();

    let fetched = client
        .get_single_as::<User>(&Key::new("User", 42))
        .await
        .unwrap()
        .expect("entity saved under derived key");
    assert_eq!(fetched.data.name, "Bea");
    assert_eq!(fetched.exclude_from_indexes, vec!["name"]);
}

#[tokio::test]
async fn get_single_on_a_missing_key_returns_none() {
    let client = memory_client().await;
    let fetched = client
        .get_single(&Key::new("User", "missing"))
        .await
        .unwrap();
    assert!(fetched.is_none());
    assert_eq!(client.manager().renewals(), 0);
}

#[tokio::test]
async fn unfiltered_query_returns_every_entity_once() {
    let client = memory_client().await;
    seed_users(&client, 5).await;

    let result = client.get_all("User").await.unwrap();
    assert_eq!(result.entities.len(), 5);

    let mut ids: Vec<String> = result
        .entities
        .iter()
        .map(|e| e.key.id().to_string())
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 5);
}

#[tokio::test]
async fn composed_query_filters_orders_and_limits() {
    let client = memory_client().await;
    seed_users(&client, 5).await;

    let result = client
        .query("User", |query| {
            query
                .filter(Filter::new("age", Operator::GreaterThan, 21))
                .order_by("age", Direction::Descending)
                .limit(2)
        })
        .await
        .unwrap();

    assert_eq!(result.entities.len(), 2);
    assert_eq!(result.entities[0].data["age"], 25);
    assert_eq!(result.entities[1].data["age"], 24);
}

#[tokio::test]
async fn declarative_query_runs_typed() {
    let client = memory_client().await;
    seed_users(&client, 3).await;

    let queryable = Queryable::new("User")
        .filter(Filter::new("age", Operator::LessThanOrEqual, 22))
        .order_by("age", Direction::Ascending);
    let result = client.run_query_as::<User>(&queryable).await.unwrap();

    assert_eq!(result.entities.len(), 2);
    assert_eq!(result.entities[0].data.name, "user-1");
}

#[tokio::test]
async fn pagination_walks_five_users_in_limit_two_pages() {
    let client = memory_client().await;
    seed_users(&client, 5).await;

    let first = client
        .run_paginated(&Queryable::new("User").limit(2))
        .await
        .unwrap();
    assert_eq!(first.entities().len(), 2);
    assert!(first.cursor().is_some());
    assert!(!first.is_exhausted());

    let second = first.next_page().await.unwrap();
    assert_eq!(second.entities().len(), 2);

    let third = second.next_page().await.unwrap();
    assert_eq!(third.entities().len(), 1);

    // ⌈5/2⌉ + 1 advances reach the terminal page.
    let terminal = third.next_page().await.unwrap();
    assert!(terminal.entities().is_empty());
    assert!(terminal.cursor().is_none());
    assert!(terminal.is_exhausted());

    // Advancing past exhaustion is idempotent and yields nothing new.
    let past = terminal.next_page().await.unwrap();
    assert!(past.entities().is_empty());
    assert!(past.cursor().is_none());
    assert!(past.is_exhausted());

    // All five users came out exactly once.
    let mut seen: Vec<String> = [&first, &second, &third]
        .iter()
        .flat_map(|page| page.entities().iter().map(|e| e.key.id().to_string()))
        .collect();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 5);
}

#[tokio::test]
async fn pagination_over_no_matches_is_terminal_immediately() {
    let client = memory_client().await;

    let page = client
        .run_paginated(&Queryable::new("User").limit(2))
        .await
        .unwrap();
    assert!(page.entities().is_empty());
    assert!(page.is_exhausted());

    let next = page.next_page().await.unwrap();
    assert!(next.entities().is_empty());
    assert!(next.is_exhausted());
}

#[tokio::test]
async fn one_transient_failure_is_absorbed_by_a_single_renewal() {
    let flaky = Arc::new(FlakyStore::new(1));
    let (connector, connects) = SharedConnect::new(Arc::clone(&flaky) as Arc<dyn Datastore>);
    let client =
        StoreClient::connect_with(StaticCredentials::new(credentials()), connector, fast_config())
            .await
            .unwrap();

    client
        .save(Entity::new(Key::new("User", "u1"), json!({"name": "Ann"})))
        .await
        .unwrap();

    assert_eq!(flaky.calls(), 2);
    assert_eq!(client.manager().renewals(), 1);
    // Initial connect plus one renewal.
    assert_eq!(connects.load(Ordering::SeqCst), 2);

    // The write landed despite the first attempt failing.
    let fetched = client.get_single(&Key::new("User", "u1")).await.unwrap();
    assert_eq!(fetched.unwrap().data["name"], "Ann");
}

#[tokio::test]
async fn two_failures_propagate_with_no_third_attempt() {
    let flaky = Arc::new(FlakyStore::new(2));
    let (connector, _) = SharedConnect::new(Arc::clone(&flaky) as Arc<dyn Datastore>);
    let client =
        StoreClient::connect_with(StaticCredentials::new(credentials()), connector, fast_config())
            .await
            .unwrap();

    let result = client.get(&Key::new("User", "u1")).await;
    match result {
        Err(ClientError::Store(StoreError::Transport(msg))) => {
            assert_eq!(msg, "connection reset");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(flaky.calls(), 2);
    assert_eq!(client.manager().renewals(), 1);
}

#[tokio::test]
async fn queries_are_retried_like_reads_and_writes() {
    let flaky = Arc::new(FlakyStore::new(1));
    let (connector, _) = SharedConnect::new(Arc::clone(&flaky) as Arc<dyn Datastore>);
    let client =
        StoreClient::connect_with(StaticCredentials::new(credentials()), connector, fast_config())
            .await
            .unwrap();

    let result = client.get_all("User").await.unwrap();
    assert!(result.is_empty());
    assert_eq!(flaky.calls(), 2);
    assert_eq!(client.manager().renewals(), 1);
}

#[tokio::test]
async fn delete_is_a_passthrough_and_never_retried() {
    let flaky = Arc::new(FlakyStore::new(1));
    let (connector, _) = SharedConnect::new(Arc::clone(&flaky) as Arc<dyn Datastore>);
    let client =
        StoreClient::connect_with(StaticCredentials::new(credentials()), connector, fast_config())
            .await
            .unwrap();

    let result = client.delete(&Key::new("User", "u1")).await;
    assert!(matches!(
        result,
        Err(ClientError::Store(StoreError::Transport(_)))
    ));
    assert_eq!(flaky.calls(), 1);
    assert_eq!(client.manager().renewals(), 0);

    // Once the fault clears, delete works without ever having renewed.
    client.delete(&Key::new("User", "u1")).await.unwrap();
    assert_eq!(client.manager().renewals(), 0);
}

#[tokio::test]
async fn file_credentials_drive_the_connection() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let raw = serde_json::to_string(&credentials()).unwrap();
    file.write_all(raw.as_bytes()).unwrap();
    file.flush().unwrap();

    let (connector, _) = SharedConnect::new(Arc::new(MemoryStore::new()));
    let client = StoreClient::connect_with(
        FileCredentials::new(file.path()),
        connector,
        fast_config(),
    )
    .await
    .unwrap();

    assert_eq!(
        client.manager().current().await.project_id(),
        "demo-project"
    );
}
