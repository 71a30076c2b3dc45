use relgate_core::{AppResult, PrincipalId};
use relgate_domain::{AccessFilter, AccessibleSet, FilterExpression, SqlIdentifier};

use super::RelationAccessService;

impl RelationAccessService {
    /// Builds the listing filter for `table_alias.id_column`.
    ///
    /// Unrestricted principals get [`AccessFilter::NoFilter`]; an empty set
    /// becomes an always-false predicate.
    pub async fn build_filter(
        &self,
        entity_type: &str,
        principal_id: Option<PrincipalId>,
        table_alias: &str,
        id_column: &str,
    ) -> AppResult<AccessFilter> {
        let table_alias = SqlIdentifier::new(table_alias)?;
        let id_column = SqlIdentifier::new(id_column)?;

        let filter = match self.accessible_ids(entity_type, principal_id).await? {
            AccessibleSet::Unrestricted => AccessFilter::NoFilter,
            AccessibleSet::Restricted(ids) => {
                AccessFilter::Filter(FilterExpression::for_ids(table_alias, id_column, &ids))
            }
        };

        Ok(filter)
    }
}
