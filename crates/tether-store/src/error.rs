//! Error types shared by store backends and credential providers

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("credential source error: {0}")]
    Credentials(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
