//! Error types for the tether-client crate

use tether_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error raised by the store backend, after the retry policy (where one
    /// applies) was exhausted.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The credentials provider failed. Renewal cannot proceed without
    /// credentials, so this never triggers a retry.
    #[error("credential fetch failed: {0}")]
    Credentials(#[source] StoreError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
