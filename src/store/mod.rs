//! Key-prefix-scoped record store.
//!
//! All persistence in this service goes through the platform record store,
//! which exposes exactly four operations: point get/set/delete plus a prefix
//! scan. There are no transactions and no secondary indices at this layer;
//! anything richer (status/buyer indexes, optimistic versioning) is built on
//! top of it in the repository layer.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

mod memory;
mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

pub mod keys;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend unreachable or returned a transport-level failure.
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be encoded or decoded.
    #[error("record serialization failed: {0}")]
    Serialization(String),
}

/// The record store contract consumed by every repository and service.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    async fn set(&self, key: &str, record: Value) -> Result<(), StoreError>;
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Returns all records whose key starts with `prefix`, in key order.
    async fn scan_by_prefix(&self, prefix: &str) -> Result<Vec<Value>, StoreError>;
}

/// Typed convenience wrappers over the raw JSON contract.
pub async fn get_typed<T: DeserializeOwned>(
    store: &dyn RecordStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StoreError::Serialization(e.to_string())),
        None => Ok(None),
    }
}

pub async fn set_typed<T: Serialize>(
    store: &dyn RecordStore,
    key: &str,
    record: &T,
) -> Result<(), StoreError> {
    let value =
        serde_json::to_value(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
    store.set(key, value).await
}

pub async fn scan_typed<T: DeserializeOwned>(
    store: &dyn RecordStore,
    prefix: &str,
) -> Result<Vec<T>, StoreError> {
    let values = store.scan_by_prefix(prefix).await?;
    values
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(|e| StoreError::Serialization(e.to_string())))
        .collect()
}
