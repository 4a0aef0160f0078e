//! Route definitions for the `/contracts` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::contracts;
use crate::state::AppState;

/// Routes mounted at `/contracts`.
///
/// ```text
/// GET    /               -> list_contracts
/// POST   /               -> create_contract
/// GET    /{id}           -> get_contract
/// PUT    /{id}           -> update_contract
/// DELETE /{id}           -> delete_contract
/// POST   /{id}/status    -> update_status
/// GET    /{id}/document  -> download_document
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(contracts::list_contracts).post(contracts::create_contract),
        )
        .route(
            "/{id}",
            get(contracts::get_contract)
                .put(contracts::update_contract)
                .delete(contracts::delete_contract),
        )
        .route("/{id}/status", post(contracts::update_status))
        .route("/{id}/document", get(contracts::download_document))
}
