use std::collections::BTreeMap;
use std::sync::Arc;

use relgate_core::{AppError, AppResult};
use relgate_domain::{EntityType, RelationConfig};
use tracing::debug;

use crate::{BridgeAccessStrategy, EntityAccessStrategy};

/// Relation config and strategy registered for one entity type.
#[derive(Clone)]
pub struct RegisteredRelation {
    entity_type: EntityType,
    config: RelationConfig,
    strategy: Arc<dyn EntityAccessStrategy>,
}

impl RegisteredRelation {
    /// Returns the registered entity type.
    #[must_use]
    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    /// Returns the relation config.
    #[must_use]
    pub fn config(&self) -> &RelationConfig {
        &self.config
    }

    /// Returns the access strategy.
    #[must_use]
    pub fn strategy(&self) -> &dyn EntityAccessStrategy {
        self.strategy.as_ref()
    }
}

/// Startup-phase builder collecting integration registrations.
#[derive(Default)]
pub struct RelationRegistryBuilder {
    relations: BTreeMap<EntityType, RegisteredRelation>,
}

impl RelationRegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a config with the default bridge strategy.
    ///
    /// A later registration for the same entity type replaces the earlier one.
    pub fn register(&mut self, entity_type: EntityType, config: RelationConfig) -> &mut Self {
        self.register_with_strategy(entity_type, config, Arc::new(BridgeAccessStrategy))
    }

    /// Registers a config with a custom access strategy.
    pub fn register_with_strategy(
        &mut self,
        entity_type: EntityType,
        config: RelationConfig,
        strategy: Arc<dyn EntityAccessStrategy>,
    ) -> &mut Self {
        let registration = RegisteredRelation {
            entity_type: entity_type.clone(),
            config,
            strategy,
        };

        if self
            .relations
            .insert(entity_type.clone(), registration)
            .is_some()
        {
            debug!(entity_type = %entity_type, "relation config overridden");
        }

        self
    }

    /// Freezes the registrations.
    #[must_use]
    pub fn build(self) -> RelationRegistry {
        RelationRegistry {
            relations: self.relations,
        }
    }
}

/// Immutable registry of relation configs shared by the resolver.
#[derive(Clone, Default)]
pub struct RelationRegistry {
    relations: BTreeMap<EntityType, RegisteredRelation>,
}

impl RelationRegistry {
    /// Returns the registration for an entity type.
    pub fn get(&self, entity_type: &EntityType) -> AppResult<&RegisteredRelation> {
        self.relations
            .get(entity_type)
            .ok_or_else(|| AppError::UnconfiguredEntityType(entity_type.to_string()))
    }

    /// Parses an entity type name and returns its registration.
    pub fn get_by_name(&self, entity_type: &str) -> AppResult<&RegisteredRelation> {
        let entity_type = EntityType::new(entity_type)?;
        self.get(&entity_type)
    }

    /// Lists registered entity types in name order.
    #[must_use]
    pub fn entity_types(&self) -> Vec<&EntityType> {
        self.relations.keys().collect()
    }
}
