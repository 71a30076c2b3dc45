use std::sync::Arc;
use std::time::Duration;

use relgate_application::{RegionAccessStrategy, RelationRegistry, RelationRegistryBuilder};
use relgate_core::AppResult;
use relgate_domain::{
    AGENCY_ENTITY, AttributeLookup, BRANCH_ENTITY, COMPANY_ENTITY, CUSTOMER_ENTITY, EntityType,
    RelationConfig, RelationConfigInput, ScopeAxis,
};

struct DefaultRelation {
    entity_type: &'static str,
    bridge_table: &'static str,
    entity_column: &'static str,
    scope_column: &'static str,
    scope_axis: ScopeAxis,
    branch_column: Option<&'static str>,
    cache_group: &'static str,
}

const DEFAULT_RELATIONS: [DefaultRelation; 4] = [
    DefaultRelation {
        entity_type: CUSTOMER_ENTITY,
        bridge_table: "customers",
        entity_column: "id",
        scope_column: "id",
        scope_axis: ScopeAxis::Customer,
        branch_column: None,
        cache_group: "customer_relations",
    },
    DefaultRelation {
        entity_type: BRANCH_ENTITY,
        bridge_table: "branches",
        entity_column: "id",
        scope_column: "id",
        scope_axis: ScopeAxis::Branch,
        branch_column: None,
        cache_group: "branch_relations",
    },
    DefaultRelation {
        entity_type: AGENCY_ENTITY,
        bridge_table: "customer_agencies",
        entity_column: "agency_id",
        scope_column: "customer_id",
        scope_axis: ScopeAxis::Customer,
        branch_column: Some("branch_id"),
        cache_group: "agency_relations",
    },
    DefaultRelation {
        entity_type: COMPANY_ENTITY,
        bridge_table: "branches",
        entity_column: "id",
        scope_column: "id",
        scope_axis: ScopeAxis::Branch,
        branch_column: None,
        cache_group: "branch_relations",
    },
];

/// Builds the registry for the relations backed by the bundled schema.
///
/// Companies are branches as seen by partner integrations: they share the
/// branch cache group and are additionally visible to external partners whose
/// home region matches the branch region.
pub fn default_relation_registry(cache_ttl: Duration) -> AppResult<RelationRegistry> {
    let mut builder = RelationRegistryBuilder::new();

    for relation in &DEFAULT_RELATIONS {
        let entity_type = EntityType::new(relation.entity_type)?;
        let config = RelationConfig::new(RelationConfigInput {
            bridge_table: relation.bridge_table.to_owned(),
            entity_column: relation.entity_column.to_owned(),
            scope_column: relation.scope_column.to_owned(),
            scope_axis: relation.scope_axis,
            branch_column: relation.branch_column.map(str::to_owned),
            access_filter_enabled: true,
            cache_ttl,
            cache_group: relation.cache_group.to_owned(),
        })?;

        if relation.entity_type == COMPANY_ENTITY {
            let region_lookup = AttributeLookup::new("branches", "id", "region_id")?;
            builder.register_with_strategy(
                entity_type,
                config,
                Arc::new(RegionAccessStrategy::new(region_lookup)),
            );
        } else {
            builder.register(entity_type, config);
        }
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use relgate_domain::ScopeAxis;

    use super::default_relation_registry;

    #[test]
    fn registers_every_bundled_entity_type() {
        let Ok(registry) = default_relation_registry(Duration::from_secs(300)) else {
            panic!("default registry must build");
        };

        let mut entity_types: Vec<&str> = registry
            .entity_types()
            .into_iter()
            .map(|entity_type| entity_type.as_str())
            .collect();
        entity_types.sort_unstable();

        assert_eq!(entity_types, vec!["agency", "branch", "company", "customer"]);
        assert!(registry.get_by_name("branch").is_ok_and(|registration| {
            registration.config().scope_axis() == ScopeAxis::Branch
                && registration.config().cache_ttl_seconds() == 300
        }));
        assert!(registry.get_by_name("company").is_ok_and(|registration| {
            registration.config().bridge_table().as_str() == "branches"
                && registration.config().cache_group() == "branch_relations"
        }));
        assert!(registry.get_by_name("agency").is_ok_and(|registration| {
            registration
                .config()
                .branch_column()
                .is_some_and(|column| column.as_str() == "branch_id")
        }));
    }
}
