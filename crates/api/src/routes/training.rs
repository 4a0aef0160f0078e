//! Route definitions for the `/training` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::training;
use crate::state::AppState;

/// Routes mounted at `/training`.
///
/// ```text
/// GET    /events                                       -> list_events
/// POST   /events                                       -> create_event
/// GET    /events/{id}                                  -> get_event
/// PUT    /events/{id}                                  -> update_event
/// DELETE /events/{id}                                  -> delete_event
/// GET    /events/{id}/participants                     -> list_participants
/// POST   /events/{id}/participants                     -> add_participant
/// POST   /events/{id}/participants/import              -> import_participants
/// DELETE /events/{id}/participants/{participant_id}    -> delete_participant
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/events",
            get(training::list_events).post(training::create_event),
        )
        .route(
            "/events/{id}",
            get(training::get_event)
                .put(training::update_event)
                .delete(training::delete_event),
        )
        .route(
            "/events/{id}/participants",
            get(training::list_participants).post(training::add_participant),
        )
        .route(
            "/events/{id}/participants/import",
            post(training::import_participants),
        )
        .route(
            "/events/{id}/participants/{participant_id}",
            delete(training::delete_participant),
        )
}
