use std::fmt::{Display, Formatter};

use relgate_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Logical name of the customer entity type.
pub const CUSTOMER_ENTITY: &str = "customer";
/// Logical name of the branch entity type.
pub const BRANCH_ENTITY: &str = "branch";
/// Logical name of the agency entity type.
pub const AGENCY_ENTITY: &str = "agency";
/// Logical name of the company entity type (branches seen by partner integrations).
pub const COMPANY_ENTITY: &str = "company";

const ENTITY_TYPE_MAX_LENGTH: usize = 64;

/// Validated entity type name used as the registry key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityType(String);

impl EntityType {
    /// Creates a validated entity type name.
    ///
    /// Names are lowercase ASCII letters, digits, `_` or `-`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "entity type must not be empty".to_owned(),
            ));
        }

        if trimmed.len() > ENTITY_TYPE_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "entity type '{trimmed}' exceeds {ENTITY_TYPE_MAX_LENGTH} characters"
            )));
        }

        if !trimmed.chars().all(|character| {
            character.is_ascii_lowercase()
                || character.is_ascii_digit()
                || character == '_'
                || character == '-'
        }) {
            return Err(AppError::Validation(format!(
                "entity type '{trimmed}' may only contain lowercase letters, digits, '_' or '-'"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the entity type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for EntityType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

impl TryFrom<String> for EntityType {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityType> for String {
    fn from(value: EntityType) -> Self {
        value.0
    }
}
