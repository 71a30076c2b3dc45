use std::sync::Arc;
use std::time::Duration;

use relgate_application::{
    AccessCache, BridgeRepository, PrincipalDirectory, RelationAccessService,
    RelationWriteService,
};
use relgate_core::AppError;
use relgate_infrastructure::{
    InMemoryAccessCache, PostgresBridgeRepository, PostgresPrincipalDirectory, RedisAccessCache,
};
use sqlx::PgPool;
use tracing::info;

use super::redis::build_redis_client;
use crate::api_config::{AccessCacheBackend, ApiConfig};
use crate::relation_bootstrap::default_relation_registry;
use crate::state::AppState;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let registry = Arc::new(default_relation_registry(Duration::from_secs(
        config.default_cache_ttl_seconds,
    ))?);
    let bridge_repository: Arc<dyn BridgeRepository> =
        Arc::new(PostgresBridgeRepository::new(pool.clone()));
    let principal_directory: Arc<dyn PrincipalDirectory> =
        Arc::new(PostgresPrincipalDirectory::new(pool));

    let access_cache: Option<Arc<dyn AccessCache>> = match &config.cache_backend {
        AccessCacheBackend::Memory => Some(Arc::new(InMemoryAccessCache::new())),
        AccessCacheBackend::Redis { redis_url } => Some(Arc::new(RedisAccessCache::new(
            build_redis_client(redis_url)?,
            config.cache_key_prefix.clone(),
        ))),
        AccessCacheBackend::Disabled => None,
    };
    info!(
        backend = config.cache_backend.as_str(),
        default_ttl_seconds = config.default_cache_ttl_seconds,
        "configured access cache"
    );

    let mut access_service =
        RelationAccessService::new(registry, principal_directory, bridge_repository.clone());
    if let Some(access_cache) = access_cache {
        access_service = access_service.with_cache(access_cache);
    }

    Ok(AppState {
        relation_write_service: RelationWriteService::new(
            access_service.clone(),
            bridge_repository,
        ),
        access_service,
    })
}
