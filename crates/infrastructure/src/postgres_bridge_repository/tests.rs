use std::collections::BTreeSet;
use std::time::Duration;

use relgate_application::BridgeRepository;
use relgate_core::{AppError, EntityId};
use relgate_domain::{AttributeLookup, RelationConfig, RelationConfigInput, ScopeAxis};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresBridgeRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres bridge tests: {error}");
    }

    Some(pool)
}

async fn execute_all(pool: &PgPool, statements: &[&str]) {
    for statement in statements {
        let result = sqlx::query(statement).execute(pool).await;
        assert!(result.is_ok(), "statement failed: {statement}: {result:?}");
    }
}

fn agency_config() -> RelationConfig {
    let config = RelationConfig::new(RelationConfigInput {
        bridge_table: "customer_agencies".to_owned(),
        entity_column: "agency_id".to_owned(),
        scope_column: "customer_id".to_owned(),
        scope_axis: ScopeAxis::Customer,
        branch_column: Some("branch_id".to_owned()),
        access_filter_enabled: true,
        cache_ttl: Duration::from_secs(60),
        cache_group: "agency_relations".to_owned(),
    });

    match config {
        Ok(config) => config,
        Err(error) => panic!("test config must be valid: {error}"),
    }
}

fn ids(values: &[u64]) -> BTreeSet<EntityId> {
    values.iter().copied().map(EntityId::new).collect()
}

#[tokio::test]
async fn counts_distinct_non_null_scopes() {
    let Some(pool) = test_pool().await else {
        return;
    };

    execute_all(
        &pool,
        &[
            "DELETE FROM customer_agencies WHERE agency_id IN (910101, 910102)",
            "DELETE FROM agencies WHERE id IN (910101, 910102)",
            "DELETE FROM customers WHERE id IN (910001, 910002)",
            "INSERT INTO customers (id, name) VALUES (910001, 'North'), (910002, 'South')",
            "INSERT INTO agencies (id, name) VALUES (910101, 'Alpha'), (910102, 'Beta')",
            "INSERT INTO customer_agencies (customer_id, agency_id) VALUES
                (910001, 910101), (910002, 910101), (NULL, 910101), (910002, 910102)",
        ],
    )
    .await;

    let repository = PostgresBridgeRepository::new(pool);
    let config = agency_config();

    let global = repository
        .count_linked_scopes(&config, EntityId::new(910101), None)
        .await;
    let scoped = repository
        .count_linked_scopes(&config, EntityId::new(910101), Some(&ids(&[910001])))
        .await;
    let listed = repository
        .list_entities_for_scopes(&config, &ids(&[910002]), None)
        .await;

    assert_eq!(global.ok(), Some(2));
    assert_eq!(scoped.ok(), Some(1));
    assert_eq!(listed.ok(), Some(ids(&[910101, 910102])));
}

#[tokio::test]
async fn link_and_unlink_report_whether_a_row_changed() {
    let Some(pool) = test_pool().await else {
        return;
    };

    execute_all(
        &pool,
        &[
            "DELETE FROM customer_agencies WHERE agency_id = 920101",
            "DELETE FROM agencies WHERE id = 920101",
            "DELETE FROM customers WHERE id = 920001",
            "INSERT INTO customers (id, name) VALUES (920001, 'North')",
            "INSERT INTO agencies (id, name) VALUES (920101, 'Alpha')",
        ],
    )
    .await;

    let repository = PostgresBridgeRepository::new(pool);
    let config = agency_config();
    let scope = EntityId::new(920001);
    let agency = EntityId::new(920101);

    assert!(matches!(repository.link(&config, scope, agency, None).await, Ok(true)));
    assert!(matches!(repository.link(&config, scope, agency, None).await, Ok(false)));
    assert_eq!(
        repository
            .list_entities_for_scopes(&config, &ids(&[920001]), None)
            .await
            .ok(),
        Some(ids(&[920101]))
    );
    assert!(matches!(repository.unlink(&config, scope, agency, None).await, Ok(true)));
    assert!(matches!(repository.unlink(&config, scope, agency, None).await, Ok(false)));
}

#[tokio::test]
async fn branch_links_confine_listing_to_that_branch() {
    let Some(pool) = test_pool().await else {
        return;
    };

    execute_all(
        &pool,
        &[
            "DELETE FROM customer_agencies WHERE agency_id IN (950101, 950102, 950103)",
            "DELETE FROM agencies WHERE id IN (950101, 950102, 950103)",
            "DELETE FROM branches WHERE id IN (950011, 950012)",
            "DELETE FROM customers WHERE id = 950001",
            "INSERT INTO customers (id, name) VALUES (950001, 'North')",
            "INSERT INTO branches (id, customer_id, name) VALUES
                (950011, 950001, 'Harbor'), (950012, 950001, 'Station')",
            "INSERT INTO agencies (id, name) VALUES
                (950101, 'Alpha'), (950102, 'Beta'), (950103, 'Gamma')",
        ],
    )
    .await;

    let repository = PostgresBridgeRepository::new(pool);
    let config = agency_config();
    let customer = EntityId::new(950001);
    let harbor = Some(EntityId::new(950011));
    let station = Some(EntityId::new(950012));

    let writes = [
        repository.link(&config, customer, EntityId::new(950101), harbor).await,
        repository.link(&config, customer, EntityId::new(950102), station).await,
        repository.link(&config, customer, EntityId::new(950103), None).await,
        repository.link(&config, customer, EntityId::new(950103), None).await,
    ];
    assert!(matches!(writes, [Ok(true), Ok(true), Ok(true), Ok(false)]));

    let at_station = repository
        .list_entities_for_scopes(&config, &ids(&[950001]), station)
        .await;
    let whole_customer = repository
        .list_entities_for_scopes(&config, &ids(&[950001]), None)
        .await;
    let count = repository
        .count_linked_scopes(&config, EntityId::new(950102), Some(&ids(&[950001])))
        .await;

    assert_eq!(at_station.ok(), Some(ids(&[950102])));
    assert_eq!(whole_customer.ok(), Some(ids(&[950101, 950102, 950103])));
    assert_eq!(count.ok(), Some(1));

    assert!(matches!(
        repository.unlink(&config, customer, EntityId::new(950102), None).await,
        Ok(false)
    ));
    assert!(matches!(
        repository.unlink(&config, customer, EntityId::new(950102), station).await,
        Ok(true)
    ));
}

#[tokio::test]
async fn attribute_lookup_lists_branches_in_region() {
    let Some(pool) = test_pool().await else {
        return;
    };

    execute_all(
        &pool,
        &[
            "DELETE FROM branches WHERE id IN (930201, 930202, 930203)",
            "DELETE FROM customers WHERE id = 930001",
            "DELETE FROM regions WHERE id IN (930501, 930502)",
            "INSERT INTO regions (id, name) VALUES (930501, 'North'), (930502, 'South')",
            "INSERT INTO customers (id, name) VALUES (930001, 'Acme')",
            "INSERT INTO branches (id, customer_id, region_id, name) VALUES
                (930201, 930001, 930501, 'Harbor'),
                (930202, 930001, 930502, 'Station'),
                (930203, 930001, 930501, 'Depot')",
        ],
    )
    .await;

    let Ok(lookup) = AttributeLookup::new("branches", "id", "region_id") else {
        panic!("test lookup must be valid");
    };
    let repository = PostgresBridgeRepository::new(pool);

    let companies = repository
        .list_entities_by_attribute(&lookup, EntityId::new(930501))
        .await;

    assert_eq!(companies.ok(), Some(ids(&[930201, 930203])));
}

#[tokio::test]
async fn self_mapped_bridges_cannot_be_linked() {
    let pool = match PgPoolOptions::new().connect_lazy("postgres://localhost/relgate") {
        Ok(pool) => pool,
        Err(error) => panic!("lazy pool must build: {error}"),
    };
    let Ok(config) = RelationConfig::new(RelationConfigInput {
        bridge_table: "customers".to_owned(),
        entity_column: "id".to_owned(),
        scope_column: "id".to_owned(),
        scope_axis: ScopeAxis::Customer,
        branch_column: None,
        access_filter_enabled: true,
        cache_ttl: Duration::from_secs(60),
        cache_group: "customer_relations".to_owned(),
    }) else {
        panic!("test config must be valid");
    };

    let result = PostgresBridgeRepository::new(pool)
        .link(&config, EntityId::new(1), EntityId::new(1), None)
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}
