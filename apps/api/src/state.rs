use relgate_application::{RelationAccessService, RelationWriteService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_service: RelationAccessService,
    pub relation_write_service: RelationWriteService,
}
