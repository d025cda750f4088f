//! Ephemeral key-value state: exam sessions, draft answers and submission
//! statuses. Every entry carries its own TTL.

pub mod keys;
pub mod memory;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::error::Result;

pub use memory::MemoryCache;

/// String-valued TTL cache. `set` on an existing key replaces the value and
/// restarts its TTL; concurrent writers to the same key race and the last one
/// wins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KvCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Returns whether a live entry was removed.
    async fn delete(&self, key: &str) -> Result<bool>;
}

pub async fn get_json<T: DeserializeOwned>(cache: &dyn KvCache, key: &str) -> Result<Option<T>> {
    match cache.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub async fn set_json<T: Serialize>(
    cache: &dyn KvCache,
    key: &str,
    value: &T,
    ttl: Duration,
) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    cache.set(key, raw, ttl).await
}
