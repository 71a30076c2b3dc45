//! Redis-backed access result cache.
//!
//! Entries live under a per-group generation number. Flushing a group bumps
//! the generation, which orphans every older entry until its TTL expires.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use relgate_application::AccessCache;
use relgate_core::{AppError, AppResult};
use relgate_domain::{AccessCacheKey, CachedAccessValue};
use tracing::debug;

/// Redis implementation of the access cache port.
#[derive(Clone)]
pub struct RedisAccessCache {
    client: redis::Client,
    key_prefix: String,
}

impl RedisAccessCache {
    /// Creates a cache adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn generation_key_for(&self, cache_group: &str) -> String {
        format!("{}:generation:{cache_group}", self.key_prefix)
    }

    fn entry_key_for(&self, key: &AccessCacheKey, generation: u64) -> String {
        format!("{}:g{generation}:{}", self.key_prefix, key.storage_key())
    }

    async fn connection(&self) -> AppResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }

    async fn current_generation(
        &self,
        connection: &mut MultiplexedConnection,
        cache_group: &str,
    ) -> AppResult<u64> {
        let generation: Option<u64> = connection
            .get(self.generation_key_for(cache_group))
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to read access cache generation for '{cache_group}': {error}"
                ))
            })?;

        Ok(generation.unwrap_or(0))
    }
}

#[async_trait]
impl AccessCache for RedisAccessCache {
    async fn get(&self, key: &AccessCacheKey) -> AppResult<Option<CachedAccessValue>> {
        let mut connection = self.connection().await?;
        let generation = self
            .current_generation(&mut connection, key.cache_group())
            .await?;

        let encoded: Option<String> = connection
            .get(self.entry_key_for(key, generation))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to read access cache entry: {error}"))
            })?;

        encoded
            .as_deref()
            .map(|value| {
                serde_json::from_str::<CachedAccessValue>(value).map_err(|error| {
                    AppError::Internal(format!("invalid access cache value '{value}': {error}"))
                })
            })
            .transpose()
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

        let encoded = serde_json::to_string(&value).map_err(|error| {
            AppError::Internal(format!("failed to encode access cache value: {error}"))
        })?;
        let mut connection = self.connection().await?;
        let generation = self
            .current_generation(&mut connection, key.cache_group())
            .await?;

        connection
            .set_ex::<_, _, ()>(
                self.entry_key_for(key, generation),
                encoded,
                u64::from(ttl_seconds),
            )
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to write access cache entry: {error}"))
            })
    }

    async fn invalidate(&self, key: &AccessCacheKey) -> AppResult<()> {
        let mut connection = self.connection().await?;
        let generation = self
            .current_generation(&mut connection, key.cache_group())
            .await?;

        connection
            .del::<_, ()>(self.entry_key_for(key, generation))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete access cache entry: {error}"))
            })
    }

    async fn invalidate_group(&self, cache_group: &str) -> AppResult<()> {
        let mut connection = self.connection().await?;
        let generation: u64 = connection
            .incr(self.generation_key_for(cache_group), 1_u64)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to bump access cache generation for '{cache_group}': {error}"
                ))
            })?;

        debug!(cache_group, generation, "bumped access cache generation");
        Ok(())
    }
}
