//! Route definitions for the `/cases` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::cases;
use crate::state::AppState;

/// Routes mounted at `/cases`.
///
/// ```text
/// GET    /                                 -> list_cases
/// POST   /                                 -> create_case
/// GET    /{id}                             -> get_case
/// PUT    /{id}                             -> update_case
/// DELETE /{id}                             -> delete_case
/// GET    /{id}/actions                     -> list_actions
/// POST   /{id}/transition                  -> transition_case
/// PUT    /{id}/caseworkers                 -> set_caseworkers
/// POST   /{id}/caseworkers/{user_id}/lead  -> set_lead
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cases::list_cases).post(cases::create_case))
        .route(
            "/{id}",
            get(cases::get_case)
                .put(cases::update_case)
                .delete(cases::delete_case),
        )
        .route("/{id}/actions", get(cases::list_actions))
        .route("/{id}/transition", post(cases::transition_case))
        .route("/{id}/caseworkers", put(cases::set_caseworkers))
        .route("/{id}/caseworkers/{user_id}/lead", post(cases::set_lead))
}
