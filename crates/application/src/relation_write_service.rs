use std::sync::Arc;

use relgate_core::{AppError, AppResult, EntityId};
use relgate_domain::RelationConfig;
use tracing::info;

use crate::{BridgeRepository, RelationAccessService};

/// Write path for bridge relations that keeps the access cache coherent.
#[derive(Clone)]
pub struct RelationWriteService {
    access_service: RelationAccessService,
    bridge_repository: Arc<dyn BridgeRepository>,
}

impl RelationWriteService {
    /// Creates a write service sharing the access service's registry and cache.
    #[must_use]
    pub fn new(
        access_service: RelationAccessService,
        bridge_repository: Arc<dyn BridgeRepository>,
    ) -> Self {
        Self {
            access_service,
            bridge_repository,
        }
    }

    /// Links a scoping entity to a target entity, optionally through one
    /// branch of the scoping customer.
    ///
    /// Returns `false` when the link already existed. The cache group is
    /// flushed only after a row was actually written.
    pub async fn link(
        &self,
        entity_type: &str,
        scope_id: EntityId,
        entity_id: EntityId,
        branch_id: Option<EntityId>,
    ) -> AppResult<bool> {
        let registration = self.access_service.registry().get_by_name(entity_type)?;
        ensure_branch_supported(registration.config(), branch_id)?;
        let changed = self
            .bridge_repository
            .link(registration.config(), scope_id, entity_id, branch_id)
            .await?;

        if changed {
            info!(
                entity_type = %registration.entity_type(),
                scope_id = %scope_id,
                entity_id = %entity_id,
                branch_id = branch_id.as_ref().map(EntityId::value),
                "relation linked"
            );
            self.access_service.invalidate_group(entity_type).await?;
        }

        Ok(changed)
    }

    /// Removes the link between a scoping entity and a target entity.
    ///
    /// Returns `false` when no link existed.
    pub async fn unlink(
        &self,
        entity_type: &str,
        scope_id: EntityId,
        entity_id: EntityId,
        branch_id: Option<EntityId>,
    ) -> AppResult<bool> {
        let registration = self.access_service.registry().get_by_name(entity_type)?;
        ensure_branch_supported(registration.config(), branch_id)?;
        let changed = self
            .bridge_repository
            .unlink(registration.config(), scope_id, entity_id, branch_id)
            .await?;

        if changed {
            info!(
                entity_type = %registration.entity_type(),
                scope_id = %scope_id,
                entity_id = %entity_id,
                branch_id = branch_id.as_ref().map(EntityId::value),
                "relation unlinked"
            );
            self.access_service.invalidate_group(entity_type).await?;
        }

        Ok(changed)
    }
}

fn ensure_branch_supported(config: &RelationConfig, branch_id: Option<EntityId>) -> AppResult<()> {
    if branch_id.is_some() && config.branch_column().is_none() {
        return Err(AppError::Validation(format!(
            "bridge table '{}' does not record branches",
            config.bridge_table()
        )));
    }

    Ok(())
}
