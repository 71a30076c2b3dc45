use axum::Json;
use axum::extract::{Path, State};
use relgate_core::EntityId;

use crate::dto::{RelationChangeResponse, RelationLinkRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn link_relation_handler(
    State(state): State<AppState>,
    Path(entity_type): Path<String>,
    Json(payload): Json<RelationLinkRequest>,
) -> ApiResult<Json<RelationChangeResponse>> {
    let changed = state
        .relation_write_service
        .link(
            entity_type.as_str(),
            EntityId::new(payload.scope_id),
            EntityId::new(payload.entity_id),
            payload.branch_id.map(EntityId::new),
        )
        .await?;

    Ok(Json(RelationChangeResponse { changed }))
}

pub async fn unlink_relation_handler(
    State(state): State<AppState>,
    Path(entity_type): Path<String>,
    Json(payload): Json<RelationLinkRequest>,
) -> ApiResult<Json<RelationChangeResponse>> {
    let changed = state
        .relation_write_service
        .unlink(
            entity_type.as_str(),
            EntityId::new(payload.scope_id),
            EntityId::new(payload.entity_id),
            payload.branch_id.map(EntityId::new),
        )
        .await?;

    Ok(Json(RelationChangeResponse { changed }))
}
