//! Redis Primary Store
//!
//! Values are stored as UTF-8 JSON text with `SETEX`, so any other client
//! of the same Redis can read them.

use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use serde_json::Value;
use tracing::info;

use crate::cache::PrimaryStore;
use crate::error::{CacheError, Result};

/// Redis-backed primary store over a reconnecting connection manager.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisStore {
    /// Opens a connection, failing with `StoreUnavailable` if the server
    /// does not answer within `connect_timeout`.
    pub async fn connect(
        url: &str,
        prefix: impl Into<String>,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::open(url)?;
        let conn = tokio::time::timeout(connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                CacheError::StoreUnavailable(format!(
                    "connect to {} timed out after {}ms",
                    url,
                    connect_timeout.as_millis()
                ))
            })??;

        info!(url, "connected to redis primary store");
        Ok(Self {
            conn,
            prefix: prefix.into(),
        })
    }

    fn prefixed_key(&self, key: &str) -> String {
        prefixed_key(&self.prefix, key)
    }
}

fn prefixed_key(prefix: &str, key: &str) -> String {
    format!("{}{}", prefix, key)
}

/// JSON text as stored in Redis.
fn encode(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn decode(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

#[async_trait]
impl PrimaryStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.prefixed_key(key)).await?;

        match raw {
            Some(text) => Ok(Some(decode(&text)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &Value, ttl_seconds: u64) -> Result<()> {
        // SETEX rejects a zero expiry
        if ttl_seconds == 0 {
            return Err(CacheError::StoreUnavailable(format!(
                "zero ttl not written for {}",
                key
            )));
        }

        let text = encode(value)?;
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(self.prefixed_key(key), text, ttl_seconds)
            .await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
