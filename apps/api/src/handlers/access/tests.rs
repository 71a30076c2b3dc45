use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;

use crate::dto::InvalidateAccessRequest;
use crate::handlers::test_support::{
    EMPLOYEE, OWNER, PARTNER, STAFF, STRANGER, into_body, principal, seeded_state,
};
use crate::middleware::RequestPrincipal;

use super::{
    AccessFilterQuery, RelationCountQuery, access_filter_handler, accessible_ids_handler,
    invalidate_access_group_handler, invalidate_access_handler, relation_count_handler,
};

#[tokio::test]
async fn owner_lists_agencies_of_owned_customers() {
    let state = seeded_state().await;

    let body = into_body(
        accessible_ids_handler(
            State(state),
            Extension(principal(OWNER)),
            Path("agency".to_owned()),
        )
        .await,
    );

    assert!(!body.unrestricted);
    assert_eq!(body.ids, vec![101, 102]);
}

#[tokio::test]
async fn staff_is_unrestricted_and_anonymous_sees_nothing() {
    let state = seeded_state().await;

    let staff = into_body(
        accessible_ids_handler(
            State(state.clone()),
            Extension(principal(STAFF)),
            Path("agency".to_owned()),
        )
        .await,
    );
    let anonymous = into_body(
        accessible_ids_handler(
            State(state),
            Extension(RequestPrincipal(None)),
            Path("agency".to_owned()),
        )
        .await,
    );

    assert!(staff.unrestricted);
    assert!(!anonymous.unrestricted);
    assert!(anonymous.ids.is_empty());
}

#[tokio::test]
async fn partner_lists_companies_in_home_region() {
    let state = seeded_state().await;

    let body = into_body(
        accessible_ids_handler(
            State(state),
            Extension(principal(PARTNER)),
            Path("company".to_owned()),
        )
        .await,
    );

    assert_eq!(body.ids, vec![11, 13]);
}

#[tokio::test]
async fn counts_are_scoped_unless_disabled() {
    let state = seeded_state().await;

    let scoped = into_body(
        relation_count_handler(
            State(state.clone()),
            Extension(principal(EMPLOYEE)),
            Path(("agency".to_owned(), 101)),
            Query(RelationCountQuery { scoped: None }),
        )
        .await,
    );
    let global = into_body(
        relation_count_handler(
            State(state),
            Extension(principal(EMPLOYEE)),
            Path(("agency".to_owned(), 101)),
            Query(RelationCountQuery {
                scoped: Some(false),
            }),
        )
        .await,
    );

    assert!(scoped.scoped);
    assert_eq!(scoped.count, 1);
    assert!(!global.scoped);
    assert_eq!(global.count, 2);
}

#[tokio::test]
async fn filter_renders_per_principal() {
    let state = seeded_state().await;
    let query = || {
        Query(AccessFilterQuery {
            alias: "b".to_owned(),
            column: None,
        })
    };

    let employee = into_body(
        access_filter_handler(
            State(state.clone()),
            Extension(principal(EMPLOYEE)),
            Path("branch".to_owned()),
            query(),
        )
        .await,
    );
    let stranger = into_body(
        access_filter_handler(
            State(state.clone()),
            Extension(principal(STRANGER)),
            Path("branch".to_owned()),
            query(),
        )
        .await,
    );
    let staff = into_body(
        access_filter_handler(
            State(state),
            Extension(principal(STAFF)),
            Path("branch".to_owned()),
            query(),
        )
        .await,
    );

    assert_eq!(employee.where_fragment.as_deref(), Some("b.id IN (12)"));
    assert_eq!(stranger.where_fragment.as_deref(), Some("1 = 0"));
    assert_eq!(staff.where_fragment, None);
}

#[tokio::test]
async fn unsafe_filter_alias_is_a_bad_request() {
    let state = seeded_state().await;

    let result = access_filter_handler(
        State(state),
        Extension(principal(EMPLOYEE)),
        Path("branch".to_owned()),
        Query(AccessFilterQuery {
            alias: "b;--".to_owned(),
            column: None,
        }),
    )
    .await;

    assert!(matches!(result, Err(error) if error.status_code() == StatusCode::BAD_REQUEST));
}

#[tokio::test]
async fn unconfigured_entity_type_is_a_server_error() {
    let state = seeded_state().await;

    let result = accessible_ids_handler(
        State(state),
        Extension(principal(STAFF)),
        Path("invoice".to_owned()),
    )
    .await;

    assert!(
        matches!(result, Err(error) if error.status_code() == StatusCode::INTERNAL_SERVER_ERROR)
    );
}

#[tokio::test]
async fn invalidation_endpoints_return_no_content() {
    let state = seeded_state().await;

    let targeted = invalidate_access_handler(
        State(state.clone()),
        Path("agency".to_owned()),
        Json(InvalidateAccessRequest {
            entity_id: 101,
            principal_id: Some(OWNER),
        }),
    )
    .await;
    let group =
        invalidate_access_group_handler(State(state.clone()), Path("agency".to_owned())).await;
    let unknown = invalidate_access_group_handler(State(state), Path("invoice".to_owned())).await;

    assert!(matches!(targeted, Ok(StatusCode::NO_CONTENT)));
    assert!(matches!(group, Ok(StatusCode::NO_CONTENT)));
    assert!(unknown.is_err());
}
