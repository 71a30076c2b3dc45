use relgate_core::{AppResult, EntityId, PrincipalId};
use relgate_domain::AccessCacheKey;
use tracing::info;

use super::RelationAccessService;

impl RelationAccessService {
    /// Drops the cached count for one `(entity_type, entity_id, principal)`
    /// combination and, for a principal, its cached accessible ids.
    ///
    /// Entity types without access filtering cache a single global count, so
    /// the principal is ignored for the count key there.
    pub async fn invalidate(
        &self,
        entity_type: &str,
        entity_id: EntityId,
        principal_id: Option<PrincipalId>,
    ) -> AppResult<()> {
        let registration = self.registry.get_by_name(entity_type)?;
        let config = registration.config();
        let cache_group = config.cache_group();

        self.evict(&AccessCacheKey::count(
            cache_group,
            registration.entity_type(),
            entity_id,
            principal_id.filter(|_| config.access_filter_enabled()),
        ))
        .await;

        if principal_id.is_some() && config.access_filter_enabled() {
            self.evict(&AccessCacheKey::accessible_ids(
                cache_group,
                registration.entity_type(),
                principal_id,
            ))
            .await;
        }

        Ok(())
    }

    /// Flushes the whole cache group of an entity type.
    ///
    /// Entity types sharing the group lose their entries too.
    pub async fn invalidate_group(&self, entity_type: &str) -> AppResult<()> {
        let registration = self.registry.get_by_name(entity_type)?;
        let cache_group = registration.config().cache_group();

        self.evict_group(cache_group).await;
        info!(
            entity_type = %registration.entity_type(),
            cache_group,
            "flushed access cache group"
        );

        Ok(())
    }
}
