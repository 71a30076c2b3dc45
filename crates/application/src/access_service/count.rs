use relgate_core::{AppResult, EntityId, PrincipalId};
use relgate_domain::{AccessCacheKey, CachedAccessValue};
use tracing::debug;

use super::RelationAccessService;

impl RelationAccessService {
    /// Counts distinct scoping entities linked to `entity_id`.
    ///
    /// The count is limited to the principal's scope when access filtering is
    /// enabled and a principal is given; platform staff and an absent
    /// principal get the global count.
    pub async fn count(
        &self,
        entity_type: &str,
        entity_id: EntityId,
        principal_id: Option<PrincipalId>,
    ) -> AppResult<u64> {
        let registration = self.registry.get_by_name(entity_type)?;
        let config = registration.config();
        let scoped_principal = principal_id.filter(|_| config.access_filter_enabled());

        let key = AccessCacheKey::count(
            config.cache_group(),
            registration.entity_type(),
            entity_id,
            scoped_principal,
        );
        if let Some(CachedAccessValue::Count(count)) = self.cached(&key, config).await {
            return Ok(count);
        }

        let scope_ids = match scoped_principal {
            Some(principal_id) => {
                let principal = self.classifier.classify(principal_id).await?;
                self.scope_ids(&principal, config.scope_axis()).await?
            }
            None => None,
        };

        let count = match &scope_ids {
            Some(scope_ids) if scope_ids.is_empty() => 0,
            _ => {
                self.bridge_repository
                    .count_linked_scopes(config, entity_id, scope_ids.as_ref())
                    .await?
            }
        };

        debug!(
            entity_type = %registration.entity_type(),
            entity_id = %entity_id,
            scoped = scope_ids.is_some(),
            count,
            "counted related scopes"
        );

        self.store(&key, config, CachedAccessValue::Count(count)).await;
        Ok(count)
    }
}
