//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod access_cache;
mod entity_type;
mod principal;
mod relation;

pub use access::{AccessFilter, AccessibleSet, FilterExpression};
pub use access_cache::{AccessCacheKey, AccessQueryKind, CachedAccessValue};
pub use entity_type::{AGENCY_ENTITY, BRANCH_ENTITY, COMPANY_ENTITY, CUSTOMER_ENTITY, EntityType};
pub use principal::{Affiliation, PrincipalCapabilities, PrincipalScope, RoleClass};
pub use relation::{
    AttributeLookup, RelationConfig, RelationConfigInput, ScopeAxis, SqlIdentifier,
};
