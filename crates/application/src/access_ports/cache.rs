use async_trait::async_trait;
use relgate_core::AppResult;
use relgate_domain::{AccessCacheKey, CachedAccessValue};

/// Cache port for resolver results.
///
/// Callers treat every error as a miss; adapters should still report them.
#[async_trait]
pub trait AccessCache: Send + Sync {
    /// Returns the cached value for one key.
    async fn get(&self, key: &AccessCacheKey) -> AppResult<Option<CachedAccessValue>>;

    /// Stores a value with ttl. A zero ttl stores nothing.
    async fn set(
        &self,
        key: &AccessCacheKey,
        value: CachedAccessValue,
        ttl_seconds: u32,
    ) -> AppResult<()>;

    /// Drops one key.
    async fn invalidate(&self, key: &AccessCacheKey) -> AppResult<()>;

    /// Drops every key of a cache group.
    async fn invalidate_group(&self, cache_group: &str) -> AppResult<()>;
}
