//! Access set resolution, counting, filter emission and cache invalidation.

use std::sync::Arc;

use crate::{
    AccessCache, BridgeRepository, PrincipalClassifier, PrincipalDirectory, RelationRegistry,
};

mod cache_io;
mod count;
mod filter;
mod invalidation;
mod resolve;

/// Application service answering "what may this principal see" per entity type.
#[derive(Clone)]
pub struct RelationAccessService {
    registry: Arc<RelationRegistry>,
    classifier: PrincipalClassifier,
    directory: Arc<dyn PrincipalDirectory>,
    bridge_repository: Arc<dyn BridgeRepository>,
    cache: Option<Arc<dyn AccessCache>>,
}

impl RelationAccessService {
    /// Creates an uncached access service.
    #[must_use]
    pub fn new(
        registry: Arc<RelationRegistry>,
        directory: Arc<dyn PrincipalDirectory>,
        bridge_repository: Arc<dyn BridgeRepository>,
    ) -> Self {
        Self {
            registry,
            classifier: PrincipalClassifier::new(directory.clone()),
            directory,
            bridge_repository,
            cache: None,
        }
    }

    /// Adds result caching behavior.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn AccessCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Returns the relation registry this service resolves against.
    #[must_use]
    pub fn registry(&self) -> &RelationRegistry {
        self.registry.as_ref()
    }
}
