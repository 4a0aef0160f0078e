//! Route definitions for the `/mentors` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::mentors;
use crate::state::AppState;

/// Routes mounted at `/mentors`.
///
/// ```text
/// GET    /       -> list_mentors
/// POST   /       -> create_mentor
/// GET    /{id}   -> get_mentor
/// PUT    /{id}   -> update_mentor
/// DELETE /{id}   -> delete_mentor
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(mentors::list_mentors).post(mentors::create_mentor),
        )
        .route(
            "/{id}",
            get(mentors::get_mentor)
                .put(mentors::update_mentor)
                .delete(mentors::delete_mentor),
        )
}
