use std::collections::BTreeSet;

use relgate_core::EntityId;
use serde::{Deserialize, Serialize};

use crate::SqlIdentifier;

/// Resolved visibility of one entity type for one principal.
///
/// `Restricted` with an empty set means the principal sees zero rows; it is
/// never a stand-in for "no filter".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ids", rename_all = "snake_case")]
pub enum AccessibleSet {
    /// Every row is visible.
    Unrestricted,
    /// Only the listed ids are visible.
    Restricted(BTreeSet<EntityId>),
}

impl AccessibleSet {
    /// Creates a restricted set from any id iterator.
    #[must_use]
    pub fn restricted(ids: impl IntoIterator<Item = EntityId>) -> Self {
        Self::Restricted(ids.into_iter().collect())
    }

    /// Creates a restricted set that matches nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::Restricted(BTreeSet::new())
    }

    /// Returns whether every row is visible.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    /// Returns the concrete ids, or `None` when unrestricted.
    #[must_use]
    pub fn ids(&self) -> Option<&BTreeSet<EntityId>> {
        match self {
            Self::Unrestricted => None,
            Self::Restricted(ids) => Some(ids),
        }
    }
}

/// Predicate merged into a listing query's `WHERE` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpression {
    /// Always-false predicate.
    MatchNone,
    /// `alias.column IN (ids...)` over a non-empty id list.
    IdIn {
        /// Alias of the listed table.
        table_alias: SqlIdentifier,
        /// Id column of the listed table.
        id_column: SqlIdentifier,
        /// Visible ids in ascending order.
        ids: Vec<EntityId>,
    },
}

impl FilterExpression {
    /// Builds the predicate for a restricted id set.
    ///
    /// An empty set yields [`FilterExpression::MatchNone`], never `IN ()`.
    #[must_use]
    pub fn for_ids(
        table_alias: SqlIdentifier,
        id_column: SqlIdentifier,
        ids: &BTreeSet<EntityId>,
    ) -> Self {
        if ids.is_empty() {
            return Self::MatchNone;
        }

        Self::IdIn {
            table_alias,
            id_column,
            ids: ids.iter().copied().collect(),
        }
    }

    /// Renders the predicate as SQL.
    ///
    /// Identifiers are pre-validated and ids are integers, so the output is
    /// safe to splice into a statement.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::MatchNone => "1 = 0".to_owned(),
            Self::IdIn {
                table_alias,
                id_column,
                ids,
            } => {
                let id_list = ids
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{table_alias}.{id_column} IN ({id_list})")
            }
        }
    }

    /// Evaluates the predicate against one row id.
    #[must_use]
    pub fn matches(&self, id: EntityId) -> bool {
        match self {
            Self::MatchNone => false,
            Self::IdIn { ids, .. } => ids.binary_search(&id).is_ok(),
        }
    }
}

/// Output of the query-fragment emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessFilter {
    /// Principal sees every row; leave the query untouched.
    NoFilter,
    /// Principal sees only rows matching the expression.
    Filter(FilterExpression),
}

impl AccessFilter {
    /// Returns the SQL predicate to append, if any.
    #[must_use]
    pub fn where_fragment(&self) -> Option<String> {
        match self {
            Self::NoFilter => None,
            Self::Filter(expression) => Some(expression.to_sql()),
        }
    }

    /// Evaluates the filter against one row id.
    #[must_use]
    pub fn matches(&self, id: EntityId) -> bool {
        match self {
            Self::NoFilter => true,
            Self::Filter(expression) => expression.matches(id),
        }
    }
}
