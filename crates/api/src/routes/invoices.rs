//! Route definitions for the `/invoices` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::invoices;
use crate::state::AppState;

/// Routes mounted at `/invoices`.
///
/// ```text
/// GET    /              -> list_invoices
/// POST   /              -> create_invoice
/// GET    /{id}          -> get_invoice
/// PUT    /{id}          -> update_invoice
/// DELETE /{id}          -> delete_invoice
/// POST   /{id}/status   -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(invoices::list_invoices).post(invoices::create_invoice),
        )
        .route(
            "/{id}",
            get(invoices::get_invoice)
                .put(invoices::update_invoice)
                .delete(invoices::delete_invoice),
        )
        .route("/{id}/status", post(invoices::update_status))
}
