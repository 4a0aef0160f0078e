//! Route definitions for the `/freelancers` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::freelancers;
use crate::state::AppState;

/// Routes mounted at `/freelancers`.
///
/// ```text
/// GET    /       -> list_freelancers
/// POST   /       -> create_freelancer
/// GET    /{id}   -> get_freelancer
/// PUT    /{id}   -> update_freelancer
/// DELETE /{id}   -> delete_freelancer
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(freelancers::list_freelancers).post(freelancers::create_freelancer),
        )
        .route(
            "/{id}",
            get(freelancers::get_freelancer)
                .put(freelancers::update_freelancer)
                .delete(freelancers::delete_freelancer),
        )
}
