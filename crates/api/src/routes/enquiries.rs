//! Route definitions for the `/enquiries` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::enquiries;
use crate::state::AppState;

/// Routes mounted at `/enquiries`.
///
/// ```text
/// GET    /                          -> list_enquiries
/// POST   /                          -> create_enquiry
/// GET    /{id}                      -> get_enquiry
/// PUT    /{id}                      -> update_enquiry
/// DELETE /{id}                      -> delete_enquiry
/// POST   /{id}/initial-assessment   -> submit_initial_assessment
/// POST   /{id}/full-assessment      -> submit_full_assessment
/// POST   /{id}/advance              -> advance_enquiry
/// POST   /{id}/closure              -> close_enquiry
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(enquiries::list_enquiries).post(enquiries::create_enquiry),
        )
        .route(
            "/{id}",
            get(enquiries::get_enquiry)
                .put(enquiries::update_enquiry)
                .delete(enquiries::delete_enquiry),
        )
        .route(
            "/{id}/initial-assessment",
            post(enquiries::submit_initial_assessment),
        )
        .route(
            "/{id}/full-assessment",
            post(enquiries::submit_full_assessment),
        )
        .route("/{id}/advance", post(enquiries::advance_enquiry))
        .route("/{id}/closure", post(enquiries::close_enquiry))
}
