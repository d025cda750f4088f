use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use moka::Expiry;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::KvCache;
use crate::error::{Error, Result};
use crate::utils::time::Clock;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    ttl: Duration,
    expires_at: DateTime<Utc>,
}

/// Evicts each entry after its own TTL; an overwrite restarts the TTL.
struct PerEntryTtl;

impl Expiry<String, CacheEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process TTL cache backed by moka.
///
/// Moka evicts on its own timer; reads additionally compare the entry's
/// deadline against the injected [`Clock`], so an entry is never served past
/// its expiry even before moka gets around to evicting it.
///
/// Entries only end by TTL or explicit delete. Moka's size-based eviction is
/// not used: once `max_entries` live keys exist, writes to new keys fail with
/// [`Error::Cache`] while overwrites of existing keys still succeed.
#[derive(Clone)]
pub struct MemoryCache {
    inner: Cache<String, CacheEntry>,
    clock: Arc<dyn Clock>,
    max_entries: u64,
}

impl MemoryCache {
    pub fn new(max_entries: u64, clock: Arc<dyn Clock>) -> Self {
        let inner = Cache::builder().expire_after(PerEntryTtl).build();
        Self {
            inner,
            clock,
            max_entries,
        }
    }

    async fn has_room_for(&self, key: &str) -> bool {
        if self.inner.contains_key(key) {
            return true;
        }
        // entry_count lags until pending inserts and expirations are applied.
        self.inner.run_pending_tasks().await;
        self.inner.entry_count() < self.max_entries
    }
}

#[async_trait]
impl KvCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.inner.get(key).await {
            Some(entry) if entry.expires_at > self.clock.now() => Ok(Some(entry.value)),
            Some(_) => {
                self.inner.invalidate(key).await;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let lifetime = chrono::Duration::from_std(ttl)
            .map_err(|e| Error::Cache(format!("ttl out of range for {}: {}", key, e)))?;
        if !self.has_room_for(key).await {
            tracing::warn!(key, max_entries = self.max_entries, "cache full, write rejected");
            return Err(Error::Cache(format!(
                "cache is full ({} entries), rejected {}",
                self.max_entries, key
            )));
        }
        let entry = CacheEntry {
            value,
            ttl,
            expires_at: self.clock.now() + lifetime,
        };
        self.inner.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        match self.inner.remove(key).await {
            Some(entry) => Ok(entry.expires_at > self.clock.now()),
            None => Ok(false),
        }
    }
}
