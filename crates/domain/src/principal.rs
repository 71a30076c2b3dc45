use std::collections::BTreeSet;

use relgate_core::EntityId;
use serde::{Deserialize, Serialize};

/// Role class of a principal, listed in classification precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleClass {
    /// Platform operator; sees every row.
    PlatformStaff,
    /// Customer owner; sees everything reachable from owned customers.
    Owner,
    /// Employee or branch admin confined to one branch.
    BranchScoped,
    /// External partner scoped by its home region.
    ExternalPartner,
    /// No affiliation at all.
    Unaffiliated,
}

impl RoleClass {
    /// Returns a stable transport value for this role class.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlatformStaff => "platform_staff",
            Self::Owner => "owner",
            Self::BranchScoped => "branch_scoped",
            Self::ExternalPartner => "external_partner",
            Self::Unaffiliated => "unaffiliated",
        }
    }
}

/// Capability flags granted to a principal by the account system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrincipalCapabilities {
    /// Platform-wide administration capability.
    pub platform_admin: bool,
    /// Customer owner capability.
    pub customer_owner: bool,
    /// Branch administration capability.
    pub branch_admin: bool,
}

/// Employee link from a principal to its home customer and branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Affiliation {
    /// Customer employing the principal.
    pub customer_id: EntityId,
    /// Branch the principal works at.
    pub branch_id: EntityId,
    /// Whether the principal administers the branch.
    pub is_branch_admin: bool,
}

/// Classified principal together with the data its access depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrincipalScope {
    /// See [`RoleClass::PlatformStaff`].
    PlatformStaff,
    /// See [`RoleClass::Owner`].
    Owner {
        /// Customers owned by the principal.
        customer_ids: BTreeSet<EntityId>,
    },
    /// See [`RoleClass::BranchScoped`].
    BranchScoped {
        /// The single affiliation access is confined to.
        affiliation: Affiliation,
        /// Whether the principal administers the branch.
        branch_admin: bool,
    },
    /// See [`RoleClass::ExternalPartner`].
    ExternalPartner {
        /// Home region of the partner organisation.
        region_id: EntityId,
    },
    /// See [`RoleClass::Unaffiliated`].
    Unaffiliated,
}

impl PrincipalScope {
    /// Returns the role class of this scope.
    #[must_use]
    pub fn role_class(&self) -> RoleClass {
        match self {
            Self::PlatformStaff => RoleClass::PlatformStaff,
            Self::Owner { .. } => RoleClass::Owner,
            Self::BranchScoped { .. } => RoleClass::BranchScoped,
            Self::ExternalPartner { .. } => RoleClass::ExternalPartner,
            Self::Unaffiliated => RoleClass::Unaffiliated,
        }
    }
}
