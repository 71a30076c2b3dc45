use std::fmt::{Display, Formatter};
use std::time::Duration;

use relgate_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

const SQL_IDENTIFIER_MAX_LENGTH: usize = 63;

/// SQL identifier safe to interpolate into generated statements.
///
/// Table names, column names and aliases are never bound as parameters, so
/// they are restricted to `[A-Za-z_][A-Za-z0-9_]*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SqlIdentifier(String);

impl SqlIdentifier {
    /// Creates a validated SQL identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let mut characters = value.chars();

        let starts_valid = characters
            .next()
            .is_some_and(|first| first.is_ascii_alphabetic() || first == '_');
        let rest_valid =
            characters.all(|character| character.is_ascii_alphanumeric() || character == '_');

        if !starts_valid || !rest_valid || value.len() > SQL_IDENTIFIER_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "'{value}' is not a valid SQL identifier"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for SqlIdentifier {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

impl TryFrom<String> for SqlIdentifier {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SqlIdentifier> for String {
    fn from(value: SqlIdentifier) -> Self {
        value.0
    }
}

/// Kind of scoping entity stored in a bridge table's scope column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeAxis {
    /// The scope column holds customer ids.
    Customer,
    /// The scope column holds branch ids.
    Branch,
}

impl ScopeAxis {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Branch => "branch",
        }
    }
}

/// Raw relation configuration supplied by an integration at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationConfigInput {
    /// Table linking scoping entities to target entities.
    pub bridge_table: String,
    /// Column holding the target entity id.
    pub entity_column: String,
    /// Column holding the scoping entity id.
    pub scope_column: String,
    /// Kind of id stored in the scope column.
    pub scope_axis: ScopeAxis,
    /// Optional column holding the branch a customer-scoped row was made
    /// through. Branch-scoped principals only see rows on their branch.
    pub branch_column: Option<String>,
    /// Whether principal-scoped filtering applies to this entity type.
    pub access_filter_enabled: bool,
    /// Lifetime of cached resolver results. Zero disables caching.
    pub cache_ttl: Duration,
    /// Cache group flushed on bulk relation changes.
    pub cache_group: String,
}

/// Validated relation configuration for one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationConfig {
    bridge_table: SqlIdentifier,
    entity_column: SqlIdentifier,
    scope_column: SqlIdentifier,
    scope_axis: ScopeAxis,
    branch_column: Option<SqlIdentifier>,
    access_filter_enabled: bool,
    cache_ttl: Duration,
    cache_group: NonEmptyString,
}

impl RelationConfig {
    /// Validates raw integration input into a relation config.
    pub fn new(input: RelationConfigInput) -> AppResult<Self> {
        let cache_group = NonEmptyString::new(input.cache_group).map_err(|_| {
            AppError::Validation(format!(
                "cache group for bridge table '{}' must not be empty",
                input.bridge_table
            ))
        })?;

        if input.branch_column.is_some() && input.scope_axis != ScopeAxis::Customer {
            return Err(AppError::Validation(format!(
                "bridge table '{}' may only carry a branch column when scoped by customer",
                input.bridge_table
            )));
        }

        Ok(Self {
            bridge_table: SqlIdentifier::new(input.bridge_table)?,
            entity_column: SqlIdentifier::new(input.entity_column)?,
            scope_column: SqlIdentifier::new(input.scope_column)?,
            scope_axis: input.scope_axis,
            branch_column: input.branch_column.map(SqlIdentifier::new).transpose()?,
            access_filter_enabled: input.access_filter_enabled,
            cache_ttl: input.cache_ttl,
            cache_group,
        })
    }

    /// Returns the bridge table name.
    #[must_use]
    pub fn bridge_table(&self) -> &SqlIdentifier {
        &self.bridge_table
    }

    /// Returns the target entity id column.
    #[must_use]
    pub fn entity_column(&self) -> &SqlIdentifier {
        &self.entity_column
    }

    /// Returns the scoping entity id column.
    #[must_use]
    pub fn scope_column(&self) -> &SqlIdentifier {
        &self.scope_column
    }

    /// Returns the kind of id stored in the scope column.
    #[must_use]
    pub fn scope_axis(&self) -> ScopeAxis {
        self.scope_axis
    }

    /// Returns the branch column of a customer-scoped bridge, if any.
    #[must_use]
    pub fn branch_column(&self) -> Option<&SqlIdentifier> {
        self.branch_column.as_ref()
    }

    /// Returns whether principal-scoped filtering is enabled.
    #[must_use]
    pub fn access_filter_enabled(&self) -> bool {
        self.access_filter_enabled
    }

    /// Returns the cache lifetime.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Returns the cache lifetime in whole seconds, saturating at `u32::MAX`.
    ///
    /// Fractional seconds round up so a sub-second lifetime never reads as
    /// "caching disabled".
    #[must_use]
    pub fn cache_ttl_seconds(&self) -> u32 {
        let seconds = self
            .cache_ttl
            .as_secs()
            .saturating_add(u64::from(self.cache_ttl.subsec_nanos() > 0));
        u32::try_from(seconds).unwrap_or(u32::MAX)
    }

    /// Returns the cache group name.
    #[must_use]
    pub fn cache_group(&self) -> &str {
        self.cache_group.as_str()
    }
}

/// Lookup of entity ids sharing one attribute value, e.g. branches in a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeLookup {
    table: SqlIdentifier,
    id_column: SqlIdentifier,
    attribute_column: SqlIdentifier,
}

impl AttributeLookup {
    /// Creates a validated attribute lookup.
    pub fn new(
        table: impl Into<String>,
        id_column: impl Into<String>,
        attribute_column: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            table: SqlIdentifier::new(table)?,
            id_column: SqlIdentifier::new(id_column)?,
            attribute_column: SqlIdentifier::new(attribute_column)?,
        })
    }

    /// Returns the table holding the attribute.
    #[must_use]
    pub fn table(&self) -> &SqlIdentifier {
        &self.table
    }

    /// Returns the entity id column.
    #[must_use]
    pub fn id_column(&self) -> &SqlIdentifier {
        &self.id_column
    }

    /// Returns the attribute column compared against the lookup value.
    #[must_use]
    pub fn attribute_column(&self) -> &SqlIdentifier {
        &self.attribute_column
    }
}
