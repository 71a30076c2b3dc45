use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for linking or unlinking a bridge row.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/relation-link-request.ts"
)]
pub struct RelationLinkRequest {
    pub scope_id: u64,
    pub entity_id: u64,
    #[serde(default)]
    pub branch_id: Option<u64>,
}

/// Outcome of a bridge write.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/relation-change-response.ts"
)]
pub struct RelationChangeResponse {
    pub changed: bool,
}
