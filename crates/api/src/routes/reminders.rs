//! Route definitions for the `/reminders` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::reminders;
use crate::state::AppState;

/// Routes mounted at `/reminders`.
///
/// ```text
/// GET    /                -> list_reminders
/// POST   /                -> create_reminder
/// GET    /{id}            -> get_reminder
/// DELETE /{id}            -> delete_reminder
/// POST   /{id}/complete   -> complete_reminder
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(reminders::list_reminders).post(reminders::create_reminder),
        )
        .route(
            "/{id}",
            get(reminders::get_reminder).delete(reminders::delete_reminder),
        )
        .route("/{id}/complete", post(reminders::complete_reminder))
}
