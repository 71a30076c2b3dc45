use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use relgate_core::{EntityId, PrincipalId};
use serde::Deserialize;

use crate::dto::{
    AccessFilterResponse, AccessibleIdsResponse, InvalidateAccessRequest, RelationCountResponse,
};
use crate::error::ApiResult;
use crate::middleware::RequestPrincipal;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RelationCountQuery {
    pub scoped: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AccessFilterQuery {
    pub alias: String,
    pub column: Option<String>,
}

pub async fn accessible_ids_handler(
    State(state): State<AppState>,
    Extension(RequestPrincipal(principal_id)): Extension<RequestPrincipal>,
    Path(entity_type): Path<String>,
) -> ApiResult<Json<AccessibleIdsResponse>> {
    let accessible = state
        .access_service
        .accessible_ids(entity_type.as_str(), principal_id)
        .await?;

    Ok(Json(AccessibleIdsResponse::new(
        entity_type.as_str(),
        &accessible,
    )))
}

pub async fn relation_count_handler(
    State(state): State<AppState>,
    Extension(RequestPrincipal(principal_id)): Extension<RequestPrincipal>,
    Path((entity_type, entity_id)): Path<(String, u64)>,
    Query(query): Query<RelationCountQuery>,
) -> ApiResult<Json<RelationCountResponse>> {
    let scoped = query.scoped.unwrap_or(true);
    let principal_id = principal_id.filter(|_| scoped);
    let count = state
        .access_service
        .count(entity_type.as_str(), EntityId::new(entity_id), principal_id)
        .await?;

    Ok(Json(RelationCountResponse {
        entity_type,
        entity_id,
        scoped: principal_id.is_some(),
        count,
    }))
}

pub async fn access_filter_handler(
    State(state): State<AppState>,
    Extension(RequestPrincipal(principal_id)): Extension<RequestPrincipal>,
    Path(entity_type): Path<String>,
    Query(query): Query<AccessFilterQuery>,
) -> ApiResult<Json<AccessFilterResponse>> {
    let filter = state
        .access_service
        .build_filter(
            entity_type.as_str(),
            principal_id,
            query.alias.as_str(),
            query.column.as_deref().unwrap_or("id"),
        )
        .await?;

    Ok(Json(AccessFilterResponse::new(
        entity_type.as_str(),
        &filter,
    )))
}

pub async fn invalidate_access_handler(
    State(state): State<AppState>,
    Path(entity_type): Path<String>,
    Json(payload): Json<InvalidateAccessRequest>,
) -> ApiResult<StatusCode> {
    state
        .access_service
        .invalidate(
            entity_type.as_str(),
            EntityId::new(payload.entity_id),
            payload.principal_id.map(PrincipalId::new),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn invalidate_access_group_handler(
    State(state): State<AppState>,
    Path(entity_type): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .access_service
        .invalidate_group(entity_type.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests;
