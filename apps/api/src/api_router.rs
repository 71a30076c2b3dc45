use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

pub fn build_router(app_state: AppState) -> Router {
    let access_routes = Router::new()
        .route(
            "/api/access/{entity_type}/ids",
            get(handlers::access::accessible_ids_handler),
        )
        .route(
            "/api/access/{entity_type}/records/{entity_id}/count",
            get(handlers::access::relation_count_handler),
        )
        .route(
            "/api/access/{entity_type}/filter",
            get(handlers::access::access_filter_handler),
        )
        .route(
            "/api/access/{entity_type}/invalidate",
            post(handlers::access::invalidate_access_handler),
        )
        .route(
            "/api/access/{entity_type}/invalidate-group",
            post(handlers::access::invalidate_access_group_handler),
        )
        .route(
            "/api/relations/{entity_type}/link",
            post(handlers::relations::link_relation_handler),
        )
        .route(
            "/api/relations/{entity_type}/unlink",
            post(handlers::relations::unlink_relation_handler),
        )
        .route_layer(from_fn(middleware::resolve_principal));

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(access_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
