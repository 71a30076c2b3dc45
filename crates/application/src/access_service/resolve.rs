use std::collections::BTreeSet;

use relgate_core::{AppResult, EntityId, PrincipalId};
use relgate_domain::{AccessCacheKey, AccessibleSet, CachedAccessValue, PrincipalScope, ScopeAxis};
use tracing::debug;

use crate::AccessContext;

use super::RelationAccessService;

impl RelationAccessService {
    /// Returns every id of `entity_type` the principal may enumerate.
    ///
    /// Disabled access filtering and platform staff yield
    /// [`AccessibleSet::Unrestricted`]. An absent principal on a filtered
    /// entity type sees nothing.
    pub async fn accessible_ids(
        &self,
        entity_type: &str,
        principal_id: Option<PrincipalId>,
    ) -> AppResult<AccessibleSet> {
        let registration = self.registry.get_by_name(entity_type)?;
        let config = registration.config();

        if !config.access_filter_enabled() {
            return Ok(AccessibleSet::Unrestricted);
        }

        let Some(principal_id) = principal_id else {
            return Ok(AccessibleSet::empty());
        };

        let key = AccessCacheKey::accessible_ids(
            config.cache_group(),
            registration.entity_type(),
            Some(principal_id),
        );
        if let Some(CachedAccessValue::Set(accessible)) = self.cached(&key, config).await {
            return Ok(accessible);
        }

        let principal = self.classifier.classify(principal_id).await?;
        let accessible = match self.scope_ids(&principal, config.scope_axis()).await? {
            None => AccessibleSet::Unrestricted,
            Some(scope_ids) => {
                let context = AccessContext {
                    entity_type: registration.entity_type(),
                    config,
                    principal: &principal,
                    scope_ids: &scope_ids,
                    bridge_repository: self.bridge_repository.as_ref(),
                };
                AccessibleSet::Restricted(registration.strategy().resolve(&context).await?)
            }
        };

        debug!(
            entity_type = %registration.entity_type(),
            principal_id = %principal_id,
            role_class = principal.role_class().as_str(),
            scope_axis = config.scope_axis().as_str(),
            accessible_count = accessible.ids().map(BTreeSet::len),
            "resolved accessible ids"
        );

        self.store(&key, config, CachedAccessValue::Set(accessible.clone()))
            .await;
        Ok(accessible)
    }

    /// Returns the scoping ids on `axis` reachable by the principal, or
    /// `None` when the principal is unrestricted.
    pub(super) async fn scope_ids(
        &self,
        principal: &PrincipalScope,
        axis: ScopeAxis,
    ) -> AppResult<Option<BTreeSet<EntityId>>> {
        let scope_ids = match (principal, axis) {
            (PrincipalScope::PlatformStaff, _) => return Ok(None),
            (PrincipalScope::Owner { customer_ids }, ScopeAxis::Customer) => customer_ids.clone(),
            (PrincipalScope::Owner { customer_ids }, ScopeAxis::Branch) => {
                if customer_ids.is_empty() {
                    BTreeSet::new()
                } else {
                    self.directory.branch_ids_for_customers(customer_ids).await?
                }
            }
            (PrincipalScope::BranchScoped { affiliation, .. }, ScopeAxis::Customer) => {
                BTreeSet::from([affiliation.customer_id])
            }
            (PrincipalScope::BranchScoped { affiliation, .. }, ScopeAxis::Branch) => {
                BTreeSet::from([affiliation.branch_id])
            }
            (PrincipalScope::ExternalPartner { .. } | PrincipalScope::Unaffiliated, _) => {
                BTreeSet::new()
            }
        };

        Ok(Some(scope_ids))
    }
}
