use std::collections::BTreeSet;

use async_trait::async_trait;
use relgate_core::{AppResult, EntityId, PrincipalId};
use relgate_domain::{Affiliation, PrincipalCapabilities};

/// Read port over the user account and affiliation tables.
///
/// Unknown principals yield empty answers rather than errors.
#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    /// Returns whether the principal is on the platform staff roster.
    async fn is_on_staff_roster(&self, principal_id: PrincipalId) -> AppResult<bool>;

    /// Returns the capability flags of the principal.
    async fn capabilities(&self, principal_id: PrincipalId) -> AppResult<PrincipalCapabilities>;

    /// Lists customers owned by the principal.
    async fn owned_customer_ids(&self, principal_id: PrincipalId)
    -> AppResult<BTreeSet<EntityId>>;

    /// Lists active employee affiliations ordered by customer then branch.
    async fn affiliations(&self, principal_id: PrincipalId) -> AppResult<Vec<Affiliation>>;

    /// Returns the home region of an external partner principal.
    async fn partner_region(&self, principal_id: PrincipalId) -> AppResult<Option<EntityId>>;

    /// Lists branches belonging to any of the customers.
    async fn branch_ids_for_customers(
        &self,
        customer_ids: &BTreeSet<EntityId>,
    ) -> AppResult<BTreeSet<EntityId>>;
}
