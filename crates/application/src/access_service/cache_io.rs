use relgate_domain::{AccessCacheKey, CachedAccessValue, RelationConfig};
use tracing::warn;

use super::RelationAccessService;

// Cache failures degrade to recomputation; they are never surfaced.
impl RelationAccessService {
    pub(super) async fn cached(
        &self,
        key: &AccessCacheKey,
        config: &RelationConfig,
    ) -> Option<CachedAccessValue> {
        if config.cache_ttl_seconds() == 0 {
            return None;
        }

        let cache = self.cache.as_ref()?;
        match cache.get(key).await {
            Ok(value) => value,
            Err(error) => {
                warn!(cache_key = %key.storage_key(), error = %error, "access cache read failed");
                None
            }
        }
    }

    pub(super) async fn store(
        &self,
        key: &AccessCacheKey,
        config: &RelationConfig,
        value: CachedAccessValue,
    ) {
        let ttl_seconds = config.cache_ttl_seconds();
        if ttl_seconds == 0 {
            return;
        }

        if let Some(cache) = &self.cache
            && let Err(error) = cache.set(key, value, ttl_seconds).await
        {
            warn!(cache_key = %key.storage_key(), error = %error, "access cache write failed");
        }
    }

    pub(super) async fn evict(&self, key: &AccessCacheKey) {
        if let Some(cache) = &self.cache
            && let Err(error) = cache.invalidate(key).await
        {
            warn!(cache_key = %key.storage_key(), error = %error, "access cache eviction failed");
        }
    }

    pub(super) async fn evict_group(&self, cache_group: &str) {
        if let Some(cache) = &self.cache
            && let Err(error) = cache.invalidate_group(cache_group).await
        {
            warn!(cache_group, error = %error, "access cache group flush failed");
        }
    }
}
