use std::collections::BTreeSet;

use async_trait::async_trait;
use relgate_application::BridgeRepository;
use relgate_core::{AppError, AppResult, EntityId};
use relgate_domain::{AttributeLookup, RelationConfig};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use crate::sql_ids::{entity_id_to_sql, entity_ids_from_sql, entity_ids_to_sql};

/// PostgreSQL-backed bridge table repository.
///
/// Table and column names come from validated [`RelationConfig`] identifiers;
/// every id is bound as a parameter.
#[derive(Clone)]
pub struct PostgresBridgeRepository {
    pool: PgPool,
}

impl PostgresBridgeRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn ensure_linkable(config: &RelationConfig) -> AppResult<()> {
    if config.entity_column() == config.scope_column() {
        return Err(AppError::Validation(format!(
            "bridge table '{}' maps entities onto themselves and cannot be linked",
            config.bridge_table()
        )));
    }

    Ok(())
}

#[async_trait]
impl BridgeRepository for PostgresBridgeRepository {
    async fn count_linked_scopes(
        &self,
        config: &RelationConfig,
        entity_id: EntityId,
        scope_ids: Option<&BTreeSet<EntityId>>,
    ) -> AppResult<u64> {
        let scope_column = config.scope_column().as_str();
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT COUNT(DISTINCT ");
        builder.push(scope_column);
        builder.push(") FROM ");
        builder.push(config.bridge_table().as_str());
        builder.push(" WHERE ");
        builder.push(config.entity_column().as_str());
        builder.push(" = ");
        builder.push_bind(entity_id_to_sql(entity_id)?);
        builder.push(" AND ");
        builder.push(scope_column);
        builder.push(" IS NOT NULL");

        if let Some(scope_ids) = scope_ids {
            builder.push(" AND ");
            builder.push(scope_column);
            builder.push(" = ANY(");
            builder.push_bind(entity_ids_to_sql(scope_ids)?);
            builder.push(")");
        }

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to count scopes in bridge table '{}': {error}",
                    config.bridge_table()
                ))
            })?;

        u64::try_from(count).map_err(|error| {
            AppError::Internal(format!("invalid bridge scope count '{count}': {error}"))
        })
    }

    async fn list_entities_for_scopes(
        &self,
        config: &RelationConfig,
        scope_ids: &BTreeSet<EntityId>,
        branch_id: Option<EntityId>,
    ) -> AppResult<BTreeSet<EntityId>> {
        if scope_ids.is_empty() {
            return Ok(BTreeSet::new());
        }

        let entity_column = config.entity_column().as_str();
        let scope_column = config.scope_column().as_str();
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT DISTINCT ");
        builder.push(entity_column);
        builder.push(" FROM ");
        builder.push(config.bridge_table().as_str());
        builder.push(" WHERE ");
        builder.push(scope_column);
        builder.push(" = ANY(");
        builder.push_bind(entity_ids_to_sql(scope_ids)?);
        builder.push(") AND ");
        builder.push(entity_column);
        builder.push(" IS NOT NULL");

        if let (Some(branch_column), Some(branch_id)) = (config.branch_column(), branch_id) {
            builder.push(" AND ");
            builder.push(branch_column.as_str());
            builder.push(" = ");
            builder.push_bind(entity_id_to_sql(branch_id)?);
        }

        let rows = builder
            .build_query_scalar::<i64>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to list entities in bridge table '{}': {error}",
                    config.bridge_table()
                ))
            })?;

        debug!(
            bridge_table = %config.bridge_table(),
            scope_count = scope_ids.len(),
            branch_confined = branch_id.is_some() && config.branch_column().is_some(),
            entity_count = rows.len(),
            "listed bridge entities"
        );

        entity_ids_from_sql(rows)
    }

    async fn list_entities_by_attribute(
        &self,
        lookup: &AttributeLookup,
        value: EntityId,
    ) -> AppResult<BTreeSet<EntityId>> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT ");
        builder.push(lookup.id_column().as_str());
        builder.push(" FROM ");
        builder.push(lookup.table().as_str());
        builder.push(" WHERE ");
        builder.push(lookup.attribute_column().as_str());
        builder.push(" = ");
        builder.push_bind(entity_id_to_sql(value)?);

        let rows = builder
            .build_query_scalar::<i64>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to list '{}' rows by '{}': {error}",
                    lookup.table(),
                    lookup.attribute_column()
                ))
            })?;

        entity_ids_from_sql(rows)
    }

    async fn link(
        &self,
        config: &RelationConfig,
        scope_id: EntityId,
        entity_id: EntityId,
        branch_id: Option<EntityId>,
    ) -> AppResult<bool> {
        ensure_linkable(config)?;

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("INSERT INTO ");
        builder.push(config.bridge_table().as_str());
        builder.push(" (");
        builder.push(config.scope_column().as_str());
        builder.push(", ");
        builder.push(config.entity_column().as_str());
        if let Some(branch_column) = config.branch_column() {
            builder.push(", ");
            builder.push(branch_column.as_str());
        }
        builder.push(") VALUES (");
        builder.push_bind(entity_id_to_sql(scope_id)?);
        builder.push(", ");
        builder.push_bind(entity_id_to_sql(entity_id)?);
        if config.branch_column().is_some() {
            builder.push(", ");
            builder.push_bind(branch_id.map(entity_id_to_sql).transpose()?);
        }
        builder.push(") ON CONFLICT DO NOTHING");

        let result = builder.build().execute(&self.pool).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to link row in bridge table '{}': {error}",
                config.bridge_table()
            ))
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn unlink(
        &self,
        config: &RelationConfig,
        scope_id: EntityId,
        entity_id: EntityId,
        branch_id: Option<EntityId>,
    ) -> AppResult<bool> {
        ensure_linkable(config)?;

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("DELETE FROM ");
        builder.push(config.bridge_table().as_str());
        builder.push(" WHERE ");
        builder.push(config.scope_column().as_str());
        builder.push(" = ");
        builder.push_bind(entity_id_to_sql(scope_id)?);
        builder.push(" AND ");
        builder.push(config.entity_column().as_str());
        builder.push(" = ");
        builder.push_bind(entity_id_to_sql(entity_id)?);
        if let Some(branch_column) = config.branch_column() {
            builder.push(" AND ");
            builder.push(branch_column.as_str());
            builder.push(" IS NOT DISTINCT FROM ");
            builder.push_bind(branch_id.map(entity_id_to_sql).transpose()?);
        }

        let result = builder.build().execute(&self.pool).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to unlink row in bridge table '{}': {error}",
                config.bridge_table()
            ))
        })?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests;
