use axum::routing::get;
use axum::Router;

use crate::handlers::export;
use crate::state::AppState;

/// Routes mounted at `/export`.
///
/// ```text
/// GET /{entity}   -> export_csv (cases | freelancers | contacts | invoices | mentors)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{entity}", get(export::export_csv))
}
