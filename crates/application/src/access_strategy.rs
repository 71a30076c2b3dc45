//! Per-entity-type rules turning a classified principal into accessible ids.

use std::collections::BTreeSet;

use async_trait::async_trait;
use relgate_core::{AppResult, EntityId};
use relgate_domain::{AttributeLookup, EntityType, PrincipalScope, RelationConfig};

use crate::BridgeRepository;

/// Inputs available to an access strategy for one resolution.
pub struct AccessContext<'a> {
    /// Entity type being resolved.
    pub entity_type: &'a EntityType,
    /// Relation config registered for the entity type.
    pub config: &'a RelationConfig,
    /// Classified principal. Never `PlatformStaff`.
    pub principal: &'a PrincipalScope,
    /// Scoping ids on the config's axis reachable by the principal.
    pub scope_ids: &'a BTreeSet<EntityId>,
    /// Bridge table reads.
    pub bridge_repository: &'a dyn BridgeRepository,
}

/// Strategy resolving the concrete id set of one entity type.
#[async_trait]
pub trait EntityAccessStrategy: Send + Sync {
    /// Returns the entity ids the principal may enumerate.
    async fn resolve(&self, context: &AccessContext<'_>) -> AppResult<BTreeSet<EntityId>>;
}

/// Default strategy: entities linked through the bridge table to any scope id.
///
/// On bridges with a branch column, branch-scoped principals only see rows
/// made through their affiliated branch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BridgeAccessStrategy;

#[async_trait]
impl EntityAccessStrategy for BridgeAccessStrategy {
    async fn resolve(&self, context: &AccessContext<'_>) -> AppResult<BTreeSet<EntityId>> {
        if context.scope_ids.is_empty() {
            return Ok(BTreeSet::new());
        }

        let branch_id = match (context.config.branch_column(), context.principal) {
            (Some(_), PrincipalScope::BranchScoped { affiliation, .. }) => {
                Some(affiliation.branch_id)
            }
            _ => None,
        };

        context
            .bridge_repository
            .list_entities_for_scopes(context.config, context.scope_ids, branch_id)
            .await
    }
}

/// Override for partner-facing entity types.
///
/// External partners see every entity sharing their home region and skip the
/// customer path entirely; all other classes use [`BridgeAccessStrategy`].
#[derive(Debug, Clone)]
pub struct RegionAccessStrategy {
    lookup: AttributeLookup,
    fallback: BridgeAccessStrategy,
}

impl RegionAccessStrategy {
    /// Creates a region override on top of the bridge strategy.
    #[must_use]
    pub fn new(lookup: AttributeLookup) -> Self {
        Self {
            lookup,
            fallback: BridgeAccessStrategy,
        }
    }
}

#[async_trait]
impl EntityAccessStrategy for RegionAccessStrategy {
    async fn resolve(&self, context: &AccessContext<'_>) -> AppResult<BTreeSet<EntityId>> {
        match context.principal {
            PrincipalScope::ExternalPartner { region_id } => {
                context
                    .bridge_repository
                    .list_entities_by_attribute(&self.lookup, *region_id)
                    .await
            }
            _ => self.fallback.resolve(context).await,
        }
    }
}
