//! Error types for stores and the grocery state built on them.

use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;

/// Main error type for store operations.
///
/// Errors travel inside shared [`AsyncValue`](crate::AsyncValue)s, so the type
/// is `Clone`; foreign errors are kept as strings or behind an `Arc`.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Getter failed: {0}")]
    Getter(String),

    #[error("Setter rejected write: {0}")]
    Setter(String),

    #[error("Update reducer failed: {0}")]
    Reducer(String),

    #[error("Store dropped before its first value resolved")]
    Abandoned,

    #[error("No async runtime available: {0}")]
    NoRuntime(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(Arc<std::io::Error>),
}

impl StoreError {
    pub fn getter(reason: impl Display) -> Self {
        StoreError::Getter(reason.to_string())
    }

    pub fn setter(reason: impl Display) -> Self {
        StoreError::Setter(reason.to_string())
    }

    pub fn reducer(reason: impl Display) -> Self {
        StoreError::Reducer(reason.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(Arc::new(e))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(e: toml::de::Error) -> Self {
        StoreError::Config(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
