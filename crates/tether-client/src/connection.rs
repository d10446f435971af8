//! Connection lifecycle: one live handle, replaced wholesale on renewal

use crate::error::{ClientError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tether_store::{Credentials, CredentialsProvider, Datastore};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// A live handle to the store, bound to one project's credentials.
///
/// Connections are never patched in place: renewal builds a brand-new
/// `Connection` and swaps the reference, so a command already holding the
/// old handle completes against a consistent (if stale) connection.
pub struct Connection {
    project_id: String,
    store: Arc<dyn Datastore>,
}

impl Connection {
    pub fn new(project_id: impl Into<String>, store: Arc<dyn Datastore>) -> Self {
        Self {
            project_id: project_id.into(),
            store,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn store(&self) -> &Arc<dyn Datastore> {
        &self.store
    }
}

/// Turns a credential snapshot into a live store handle.
///
/// This is where a concrete transport lives (channel setup, handshakes);
/// the access layer only sees the resulting `Datastore`.
#[async_trait]
pub trait Connect: Send + Sync + 'static {
    async fn connect(&self, credentials: &Credentials) -> tether_store::Result<Arc<dyn Datastore>>;
}

/// Owns the single live [`Connection`].
///
/// The manager performs the initial renewal during construction, so it is
/// always connection-ready: there is no disconnected state visible to
/// callers. `renew()` is invoked reactively by the executor after an
/// observed failure, never on a schedule, and is the only mutator of the
/// connection slot.
///
/// Two overlapping failures may each trigger a renewal; the design accepts
/// that duplication rather than serializing callers.
pub struct ConnectionManager {
    provider: Arc<dyn CredentialsProvider>,
    connector: Arc<dyn Connect>,
    current: RwLock<Arc<Connection>>,
    renewals: AtomicU64,
}

impl ConnectionManager {
    /// Fetch credentials, open the first connection, and return a ready
    /// manager.
    pub async fn connect(
        provider: Arc<dyn CredentialsProvider>,
        connector: Arc<dyn Connect>,
    ) -> Result<Self> {
        let connection = Self::open(provider.as_ref(), connector.as_ref()).await?;
        Ok(Self {
            provider,
            connector,
            current: RwLock::new(Arc::new(connection)),
            renewals: AtomicU64::new(0),
        })
    }

    async fn open(
        provider: &dyn CredentialsProvider,
        connector: &dyn Connect,
    ) -> Result<Connection> {
        let credentials = provider.credentials().map_err(ClientError::Credentials)?;
        let store = connector.connect(&credentials).await?;
        debug!(project_id = %credentials.project_id, "opened store connection");
        Ok(Connection::new(credentials.project_id, store))
    }

    /// Drop the current handle and build a fresh one from re-fetched
    /// credentials. A credential fetch failure aborts the renewal and leaves
    /// the old handle in place.
    pub async fn renew(&self) -> Result<()> {
        info!("renewing store connection");
        let connection = Arc::new(Self::open(self.provider.as_ref(), self.connector.as_ref()).await?);
        *self.current.write().await = connection;
        self.renewals.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// The live connection. Cheap to call; the returned Arc stays valid even
    /// if a renewal replaces the slot while the caller holds it.
    pub async fn current(&self) -> Arc<Connection> {
        self.current.read().await.clone()
    }

    /// How many renewals have completed since construction.
    pub fn renewals(&self) -> u64 {
        self.renewals.load(Ordering::Relaxed)
    }
}
