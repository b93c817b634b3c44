use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use serde_json::Value;
use tracing::debug;

use super::{RecordStore, StoreError};

/// Redis-backed record store for deployed environments.
///
/// Records are stored as JSON strings; prefix scans use SCAN MATCH so large
/// keyspaces never block the server the way KEYS would.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client =
            redis::Client::open(url).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let conn = client
            .get_tokio_connection_manager()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self { conn })
    }

    fn encode(record: &Value) -> Result<String, StoreError> {
        serde_json::to_string(record).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn decode(raw: &str) -> Result<Value, StoreError> {
        serde_json::from_str(raw).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl RecordStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        raw.as_deref().map(Self::decode).transpose()
    }

    async fn set(&self, key: &str, record: Value) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let payload = Self::encode(&record)?;
        conn.set::<_, _, ()>(key, payload)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn scan_by_prefix(&self, prefix: &str) -> Result<Vec<Value>, StoreError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{prefix}*");

        let mut keys: Vec<String> = Vec::new();
        {
            let mut iter = conn
                .scan_match::<_, String>(&pattern)
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }
        keys.sort();
        debug!(prefix = %prefix, matched = keys.len(), "prefix scan");

        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            let raw: Option<String> = conn
                .get(&key)
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            // a key may expire between SCAN and GET; skip it
            if let Some(raw) = raw {
                records.push(Self::decode(&raw)?);
            }
        }
        Ok(records)
    }
}
