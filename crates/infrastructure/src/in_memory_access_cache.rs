use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use relgate_application::AccessCache;
use relgate_core::AppResult;
use relgate_domain::{AccessCacheKey, CachedAccessValue};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct AccessCacheEntry {
    cache_group: String,
    value: CachedAccessValue,
    expires_at: Instant,
}

/// In-memory cache adapter for resolved access results.
#[derive(Default)]
pub struct InMemoryAccessCache {
    entries: RwLock<HashMap<String, AccessCacheEntry>>,
}

impl InMemoryAccessCache {
    /// Creates an empty in-memory access cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessCache for InMemoryAccessCache {
    async fn get(&self, key: &AccessCacheKey) -> AppResult<Option<CachedAccessValue>> {
        let storage_key = key.storage_key();
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(&storage_key) {
                if entry.expires_at > Instant::now() {
                    return Ok(Some(entry.value.clone()));
                }
            } else {
                return Ok(None);
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(&storage_key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(&storage_key);
        }

        Ok(None)
    }

    async fn set(
        &self,
        key: &AccessCacheKey,
        value: CachedAccessValue,
        ttl_seconds: u32,
    ) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(ttl_seconds)))
            .unwrap_or(now);

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.storage_key(),
            AccessCacheEntry {
                cache_group: key.cache_group().to_owned(),
                value,
                expires_at,
            },
        );

        Ok(())
    }

    async fn invalidate(&self, key: &AccessCacheKey) -> AppResult<()> {
        self.entries.write().await.remove(&key.storage_key());
        Ok(())
    }

    async fn invalidate_group(&self, cache_group: &str) -> AppResult<()> {
        self.entries
            .write()
            .await
            .retain(|_, entry| entry.cache_group != cache_group);
        Ok(())
    }
}
