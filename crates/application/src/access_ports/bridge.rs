use std::collections::BTreeSet;

use async_trait::async_trait;
use relgate_core::{AppResult, EntityId};
use relgate_domain::{AttributeLookup, RelationConfig};

/// Repository port over configured bridge tables.
///
/// Rows whose scope column is null never contribute to counts or id sets.
#[async_trait]
pub trait BridgeRepository: Send + Sync {
    /// Counts distinct scope ids linked to one entity, optionally limited to `scope_ids`.
    async fn count_linked_scopes(
        &self,
        config: &RelationConfig,
        entity_id: EntityId,
        scope_ids: Option<&BTreeSet<EntityId>>,
    ) -> AppResult<u64>;

    /// Lists distinct entity ids linked to any of the scope ids.
    ///
    /// When the config carries a branch column and `branch_id` is given, only
    /// rows made through that branch are listed.
    async fn list_entities_for_scopes(
        &self,
        config: &RelationConfig,
        scope_ids: &BTreeSet<EntityId>,
        branch_id: Option<EntityId>,
    ) -> AppResult<BTreeSet<EntityId>>;

    /// Lists entity ids whose attribute column equals `value`.
    async fn list_entities_by_attribute(
        &self,
        lookup: &AttributeLookup,
        value: EntityId,
    ) -> AppResult<BTreeSet<EntityId>>;

    /// Inserts a bridge row. Returns `false` when the row already existed.
    ///
    /// `branch_id` is written to the branch column when the config has one.
    async fn link(
        &self,
        config: &RelationConfig,
        scope_id: EntityId,
        entity_id: EntityId,
        branch_id: Option<EntityId>,
    ) -> AppResult<bool>;

    /// Deletes a bridge row. Returns `false` when no row matched.
    ///
    /// On bridges with a branch column the branch must match as well, with
    /// `None` matching customer-level rows.
    async fn unlink(
        &self,
        config: &RelationConfig,
        scope_id: EntityId,
        entity_id: EntityId,
        branch_id: Option<EntityId>,
    ) -> AppResult<bool>;
}
