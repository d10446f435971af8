//! Resilient command execution: at most one retry, after a fixed cooldown
//! and a connection renewal
//!
//! The policy does not classify errors before retrying: any failure of the
//! first attempt (network fault, expired auth, or a caller mistake the
//! backend rejects) costs one cooldown and one renewal before the operation
//! runs again. A second failure propagates to the caller unchanged. Callers
//! needing stronger guarantees wrap their calls with their own backoff.

use crate::connection::{Connection, ConnectionManager};
use crate::error::{ClientError, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct Executor {
    manager: Arc<ConnectionManager>,
    cooldown: Duration,
}

impl Executor {
    pub fn new(manager: Arc<ConnectionManager>, cooldown: Duration) -> Self {
        Self { manager, cooldown }
    }

    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    /// Run `op` against the current connection; on any failure wait the
    /// cooldown, renew the connection, and run it exactly once more.
    ///
    /// A renewal failure (including a credential fetch failure) propagates
    /// immediately; there is no second renewal and no third attempt.
    pub async fn execute<F, Fut, T>(&self, op: F) -> Result<T>
    where
        F: Fn(Arc<Connection>) -> Fut,
        Fut: Future<Output = tether_store::Result<T>>,
    {
        let connection = self.manager.current().await;
        match op(connection).await {
            Ok(value) => Ok(value),
            Err(first) => {
                warn!(error = %first, cooldown = ?self.cooldown, "store command failed, reconnecting before retry");
                tokio::time::sleep(self.cooldown).await;
                self.manager.renew().await?;

                let connection = self.manager.current().await;
                debug!("retrying store command on renewed connection");
                op(connection).await.map_err(ClientError::Store)
            }
        }
    }

    /// Run `op` once, with no retry. Used for delete, which the policy does
    /// not cover.
    pub async fn direct<F, Fut, T>(&self, op: F) -> Result<T>
    where
        F: FnOnce(Arc<Connection>) -> Fut,
        Fut: Future<Output = tether_store::Result<T>>,
    {
        let connection = self.manager.current().await;
        op(connection).await.map_err(ClientError::Store)
    }
}
