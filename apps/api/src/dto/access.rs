use relgate_domain::{AccessFilter, AccessibleSet};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Ids of one entity type the calling principal may enumerate.
///
/// `ids` is empty and meaningless when `unrestricted` is set.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/accessible-ids-response.ts"
)]
pub struct AccessibleIdsResponse {
    pub entity_type: String,
    pub unrestricted: bool,
    pub ids: Vec<u64>,
}

impl AccessibleIdsResponse {
    pub fn new(entity_type: &str, accessible: &AccessibleSet) -> Self {
        Self {
            entity_type: entity_type.to_owned(),
            unrestricted: accessible.is_unrestricted(),
            ids: accessible
                .ids()
                .map(|ids| ids.iter().map(|id| id.value()).collect())
                .unwrap_or_default(),
        }
    }
}

/// Number of distinct scoping entities linked to one record.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/relation-count-response.ts"
)]
pub struct RelationCountResponse {
    pub entity_type: String,
    pub entity_id: u64,
    pub scoped: bool,
    pub count: u64,
}

/// Listing predicate for the calling principal.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-filter-response.ts"
)]
pub struct AccessFilterResponse {
    pub entity_type: String,
    /// `None` when the listing needs no restriction.
    pub where_fragment: Option<String>,
}

impl AccessFilterResponse {
    pub fn new(entity_type: &str, filter: &AccessFilter) -> Self {
        Self {
            entity_type: entity_type.to_owned(),
            where_fragment: filter.where_fragment(),
        }
    }
}

/// Incoming payload for targeted cache invalidation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/invalidate-access-request.ts"
)]
pub struct InvalidateAccessRequest {
    pub entity_id: u64,
    pub principal_id: Option<u64>,
}
