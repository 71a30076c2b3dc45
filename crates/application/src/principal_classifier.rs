use std::sync::Arc;

use relgate_core::{AppResult, PrincipalId};
use relgate_domain::PrincipalScope;
use tracing::warn;

use crate::PrincipalDirectory;

/// Maps principals onto exactly one role class.
///
/// Precedence is total: PlatformStaff, Owner, BranchScoped, ExternalPartner,
/// Unaffiliated. The first matching class wins.
#[derive(Clone)]
pub struct PrincipalClassifier {
    directory: Arc<dyn PrincipalDirectory>,
}

impl PrincipalClassifier {
    /// Creates a classifier over a principal directory.
    #[must_use]
    pub fn new(directory: Arc<dyn PrincipalDirectory>) -> Self {
        Self { directory }
    }

    /// Classifies one principal.
    ///
    /// Unknown principals are `Unaffiliated`; directory failures propagate.
    pub async fn classify(&self, principal_id: PrincipalId) -> AppResult<PrincipalScope> {
        let capabilities = self.directory.capabilities(principal_id).await?;
        if capabilities.platform_admin || self.directory.is_on_staff_roster(principal_id).await? {
            return Ok(PrincipalScope::PlatformStaff);
        }

        let customer_ids = self.directory.owned_customer_ids(principal_id).await?;
        if capabilities.customer_owner || !customer_ids.is_empty() {
            return Ok(PrincipalScope::Owner { customer_ids });
        }

        let affiliations = self.directory.affiliations(principal_id).await?;
        if let Some(affiliation) = affiliations.first().copied() {
            // Multi-branch employees are not supported; access stays on the first branch.
            if affiliations.len() > 1 {
                warn!(
                    principal_id = %principal_id,
                    affiliation_count = affiliations.len(),
                    branch_id = %affiliation.branch_id,
                    "principal has several branch affiliations, scoping to the first"
                );
            }

            return Ok(PrincipalScope::BranchScoped {
                affiliation,
                branch_admin: capabilities.branch_admin || affiliation.is_branch_admin,
            });
        }

        if let Some(region_id) = self.directory.partner_region(principal_id).await? {
            return Ok(PrincipalScope::ExternalPartner { region_id });
        }

        Ok(PrincipalScope::Unaffiliated)
    }
}
