use std::collections::BTreeSet;

use async_trait::async_trait;
use relgate_application::PrincipalDirectory;
use relgate_core::{AppError, AppResult, EntityId, PrincipalId};
use relgate_domain::{Affiliation, PrincipalCapabilities};
use sqlx::PgPool;

use crate::sql_ids::{
    entity_id_from_sql, entity_ids_from_sql, entity_ids_to_sql, principal_id_to_sql,
};

/// PostgreSQL-backed principal directory.
#[derive(Clone)]
pub struct PostgresPrincipalDirectory {
    pool: PgPool,
}

impl PostgresPrincipalDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalDirectory for PostgresPrincipalDirectory {
    async fn is_on_staff_roster(&self, principal_id: PrincipalId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM platform_staff
                WHERE principal_id = $1
            )
            "#,
        )
        .bind(principal_id_to_sql(principal_id)?)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read staff roster: {error}")))
    }

    async fn capabilities(&self, principal_id: PrincipalId) -> AppResult<PrincipalCapabilities> {
        let row = sqlx::query_as::<_, (bool, bool, bool)>(
            r#"
            SELECT platform_admin, customer_owner, branch_admin
            FROM principal_capabilities
            WHERE principal_id = $1
            "#,
        )
        .bind(principal_id_to_sql(principal_id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to read principal capabilities: {error}"))
        })?;

        Ok(row
            .map(
                |(platform_admin, customer_owner, branch_admin)| PrincipalCapabilities {
                    platform_admin,
                    customer_owner,
                    branch_admin,
                },
            )
            .unwrap_or_default())
    }

    async fn owned_customer_ids(
        &self,
        principal_id: PrincipalId,
    ) -> AppResult<BTreeSet<EntityId>> {
        let rows = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id
            FROM customers
            WHERE owner_principal_id = $1
            "#,
        )
        .bind(principal_id_to_sql(principal_id)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list owned customers: {error}")))?;

        entity_ids_from_sql(rows)
    }

    async fn affiliations(&self, principal_id: PrincipalId) -> AppResult<Vec<Affiliation>> {
        let rows = sqlx::query_as::<_, (i64, i64, bool)>(
            r#"
            SELECT customer_id, branch_id, is_branch_admin
            FROM customer_employees
            WHERE principal_id = $1
            ORDER BY customer_id, branch_id
            "#,
        )
        .bind(principal_id_to_sql(principal_id)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list employee affiliations: {error}"))
        })?;

        rows.into_iter()
            .map(|(customer_id, branch_id, is_branch_admin)| {
                Ok(Affiliation {
                    customer_id: entity_id_from_sql(customer_id)?,
                    branch_id: entity_id_from_sql(branch_id)?,
                    is_branch_admin,
                })
            })
            .collect()
    }

    async fn partner_region(&self, principal_id: PrincipalId) -> AppResult<Option<EntityId>> {
        let region_id = sqlx::query_scalar::<_, Option<i64>>(
            r#"
            SELECT agencies.region_id
            FROM partner_users
            INNER JOIN agencies ON agencies.id = partner_users.agency_id
            WHERE partner_users.principal_id = $1
            "#,
        )
        .bind(principal_id_to_sql(principal_id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve partner region: {error}")))?
        .flatten();

        region_id.map(entity_id_from_sql).transpose()
    }

    async fn branch_ids_for_customers(
        &self,
        customer_ids: &BTreeSet<EntityId>,
    ) -> AppResult<BTreeSet<EntityId>> {
        if customer_ids.is_empty() {
            return Ok(BTreeSet::new());
        }

        let rows = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id
            FROM branches
            WHERE customer_id = ANY($1)
            "#,
        )
        .bind(entity_ids_to_sql(customer_ids)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list branches for customers: {error}"))
        })?;

        entity_ids_from_sql(rows)
    }
}
