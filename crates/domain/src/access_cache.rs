use relgate_core::{EntityId, PrincipalId};
use serde::{Deserialize, Serialize};

use crate::{AccessibleSet, EntityType};

/// Resolver operation whose result is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessQueryKind {
    /// Related scope count for one entity.
    Count,
    /// Accessible id set for one entity type.
    AccessibleIds,
}

impl AccessQueryKind {
    /// Returns the stable key segment.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::AccessibleIds => "accessible_ids",
        }
    }
}

/// Deterministic cache key for one resolver result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessCacheKey {
    kind: AccessQueryKind,
    cache_group: String,
    entity_type: EntityType,
    entity_id: Option<EntityId>,
    principal_id: Option<PrincipalId>,
}

impl AccessCacheKey {
    /// Key of a related scope count.
    #[must_use]
    pub fn count(
        cache_group: &str,
        entity_type: &EntityType,
        entity_id: EntityId,
        principal_id: Option<PrincipalId>,
    ) -> Self {
        Self {
            kind: AccessQueryKind::Count,
            cache_group: cache_group.to_owned(),
            entity_type: entity_type.clone(),
            entity_id: Some(entity_id),
            principal_id,
        }
    }

    /// Key of an accessible id set.
    #[must_use]
    pub fn accessible_ids(
        cache_group: &str,
        entity_type: &EntityType,
        principal_id: Option<PrincipalId>,
    ) -> Self {
        Self {
            kind: AccessQueryKind::AccessibleIds,
            cache_group: cache_group.to_owned(),
            entity_type: entity_type.clone(),
            entity_id: None,
            principal_id,
        }
    }

    /// Returns the cached operation.
    #[must_use]
    pub fn kind(&self) -> AccessQueryKind {
        self.kind
    }

    /// Returns the group flushed by bulk invalidation.
    #[must_use]
    pub fn cache_group(&self) -> &str {
        self.cache_group.as_str()
    }

    /// Returns the principal the value was computed for, if scoped.
    #[must_use]
    pub fn principal_id(&self) -> Option<PrincipalId> {
        self.principal_id
    }

    /// Returns the storage key
    /// `{group}:{kind}:{entity_type}:{entity_id|0}:{principal_id|global}`.
    #[must_use]
    pub fn storage_key(&self) -> String {
        let entity_id = self.entity_id.map_or(0, |value| value.value());
        let principal = self
            .principal_id
            .map_or_else(|| "global".to_owned(), |value| value.to_string());

        format!(
            "{}:{}:{}:{entity_id}:{principal}",
            self.cache_group,
            self.kind.as_str(),
            self.entity_type
        )
    }
}

/// Cached resolver result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachedAccessValue {
    /// Result of a count query.
    Count(u64),
    /// Result of an accessible id query.
    Set(AccessibleSet),
}
