//! Route definitions for the `/contract-templates` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::contract_templates;
use crate::state::AppState;

/// Routes mounted at `/contract-templates`.
///
/// ```text
/// GET    /                    -> list_templates
/// POST   /                    -> create_template
/// GET    /placeholders        -> placeholder_catalogue (?type=)
/// POST   /preview             -> preview
/// GET    /{id}                -> get_template
/// PUT    /{id}                -> update_template
/// DELETE /{id}                -> delete_template
/// GET    /{id}/placeholders   -> template_placeholders
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(contract_templates::list_templates).post(contract_templates::create_template),
        )
        .route(
            "/placeholders",
            get(contract_templates::placeholder_catalogue),
        )
        .route("/preview", post(contract_templates::preview))
        .route(
            "/{id}",
            get(contract_templates::get_template)
                .put(contract_templates::update_template)
                .delete(contract_templates::delete_template),
        )
        .route(
            "/{id}/placeholders",
            get(contract_templates::template_placeholders),
        )
}
