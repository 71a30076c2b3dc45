use std::sync::Arc;
use std::time::Duration;

use relgate_application::{RelationAccessService, RelationWriteService};
use relgate_core::{EntityId, PrincipalId};
use relgate_domain::Affiliation;
use relgate_infrastructure::{InMemoryAccessCache, InMemoryRelationStore};

use crate::error::ApiResult;
use crate::middleware::RequestPrincipal;
use crate::relation_bootstrap::default_relation_registry;
use crate::state::AppState;

pub const OWNER: u64 = 100;
pub const EMPLOYEE: u64 = 200;
pub const STAFF: u64 = 300;
pub const PARTNER: u64 = 400;
pub const STRANGER: u64 = 999;

pub fn principal(value: u64) -> RequestPrincipal {
    RequestPrincipal(Some(PrincipalId::new(value)))
}

pub fn into_body<T>(result: ApiResult<axum::Json<T>>) -> T {
    match result {
        Ok(axum::Json(body)) => body,
        Err(error) => panic!("handler failed: {:?}", error.0),
    }
}

fn id(value: u64) -> Option<EntityId> {
    Some(EntityId::new(value))
}

/// Two customers, three branches and two agencies.
///
/// Customer 1 owns branches 11 (region 501) and 12 (region 502); customer 2
/// owns branch 13 (region 501). Agency 101 serves branch 12 and branch 13,
/// agency 102 serves branch 11 and branch 13. Companies are the branches
/// themselves.
pub async fn seeded_state() -> AppState {
    let store = Arc::new(InMemoryRelationStore::new());

    for customer_id in [1, 2] {
        store.insert_row("customers", &[("id", id(customer_id))]).await;
    }
    for (customer_id, branch_id, region_id) in [(1, 11, 501), (1, 12, 502), (2, 13, 501)] {
        store
            .insert_row(
                "branches",
                &[
                    ("id", id(branch_id)),
                    ("customer_id", id(customer_id)),
                    ("region_id", id(region_id)),
                ],
            )
            .await;
        store
            .add_branch(EntityId::new(customer_id), EntityId::new(branch_id))
            .await;
    }
    let agency_links = [(1, 12, 101), (2, 13, 101), (2, 13, 102), (1, 11, 102)];
    for (customer_id, branch_id, agency_id) in agency_links {
        store
            .insert_row(
                "customer_agencies",
                &[
                    ("customer_id", id(customer_id)),
                    ("branch_id", id(branch_id)),
                    ("agency_id", id(agency_id)),
                ],
            )
            .await;
    }

    let owner = PrincipalId::new(OWNER);
    store.add_owned_customer(owner, EntityId::new(1)).await;
    store.add_owned_customer(owner, EntityId::new(2)).await;
    store
        .add_affiliation(
            PrincipalId::new(EMPLOYEE),
            Affiliation {
                customer_id: EntityId::new(1),
                branch_id: EntityId::new(12),
                is_branch_admin: false,
            },
        )
        .await;
    store.add_staff(PrincipalId::new(STAFF)).await;
    store
        .set_partner_region(PrincipalId::new(PARTNER), EntityId::new(501))
        .await;

    let registry = match default_relation_registry(Duration::from_secs(300)) {
        Ok(registry) => Arc::new(registry),
        Err(error) => panic!("default registry must build: {error}"),
    };
    let access_service = RelationAccessService::new(registry, store.clone(), store.clone())
        .with_cache(Arc::new(InMemoryAccessCache::new()));

    AppState {
        relation_write_service: RelationWriteService::new(access_service.clone(), store),
        access_service,
    }
}
