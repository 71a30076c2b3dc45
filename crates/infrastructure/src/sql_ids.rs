//! Conversions between domain ids and PostgreSQL `BIGINT` columns.

use std::collections::BTreeSet;

use relgate_core::{AppError, AppResult, EntityId, PrincipalId};

pub(crate) fn entity_id_to_sql(id: EntityId) -> AppResult<i64> {
    i64::try_from(id.value()).map_err(|error| {
        AppError::Validation(format!("entity id '{id}' exceeds BIGINT range: {error}"))
    })
}

pub(crate) fn entity_ids_to_sql(ids: &BTreeSet<EntityId>) -> AppResult<Vec<i64>> {
    ids.iter().copied().map(entity_id_to_sql).collect()
}

pub(crate) fn principal_id_to_sql(id: PrincipalId) -> AppResult<i64> {
    i64::try_from(id.value()).map_err(|error| {
        AppError::Validation(format!("principal id '{id}' exceeds BIGINT range: {error}"))
    })
}

pub(crate) fn entity_id_from_sql(value: i64) -> AppResult<EntityId> {
    u64::try_from(value)
        .map(EntityId::new)
        .map_err(|error| AppError::Internal(format!("stored id '{value}' is negative: {error}")))
}

pub(crate) fn entity_ids_from_sql(
    values: impl IntoIterator<Item = i64>,
) -> AppResult<BTreeSet<EntityId>> {
    values.into_iter().map(entity_id_from_sql).collect()
}
