//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_access_cache;
#[cfg(any(test, feature = "test-support"))]
mod in_memory_relation_store;
mod postgres_bridge_repository;
mod postgres_principal_directory;
mod redis_access_cache;
mod sql_ids;

pub use in_memory_access_cache::InMemoryAccessCache;
#[cfg(any(test, feature = "test-support"))]
pub use in_memory_relation_store::InMemoryRelationStore;
pub use postgres_bridge_repository::PostgresBridgeRepository;
pub use postgres_principal_directory::PostgresPrincipalDirectory;
pub use redis_access_cache::RedisAccessCache;
