mod access;
mod common;
mod relations;

pub use access::{
    AccessFilterResponse, AccessibleIdsResponse, InvalidateAccessRequest, RelationCountResponse,
};
pub use common::HealthResponse;
pub use relations::{RelationChangeResponse, RelationLinkRequest};
