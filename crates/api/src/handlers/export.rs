//! CSV export of directory and case data.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use fosterdesk_core::csv::build_csv;
use fosterdesk_db::repositories::{
    CaseRepo, ContactRepo, FreelancerRepo, InvoiceRepo, MentorRepo,
};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Entities that can be exported.
pub const EXPORTABLE_ENTITIES: &[&str] = &["cases", "freelancers", "contacts", "invoices", "mentors"];

/// GET /api/export/{entity}
///
/// Download every row of `entity` as `text/csv`.
pub async fn export_csv(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> AppResult<Response> {
    let csv = match entity.as_str() {
        "cases" => build_csv(&CaseRepo::list_all(&state.pool).await?),
        "freelancers" => build_csv(&FreelancerRepo::list_all(&state.pool).await?),
        "contacts" => build_csv(&ContactRepo::list_all(&state.pool).await?),
        "invoices" => build_csv(&InvoiceRepo::list_all(&state.pool).await?),
        "mentors" => build_csv(&MentorRepo::list_all(&state.pool).await?),
        other => {
            return Err(AppError::BadRequest(format!(
                "Unknown export entity '{other}'. Must be one of: {}",
                EXPORTABLE_ENTITIES.join(", ")
            )))
        }
    };

    tracing::info!(user_id = auth.user_id, entity = %entity, bytes = csv.len(), "CSV exported");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{entity}.csv\""),
        )
        .body(Body::from(csv))
        .map_err(|e| AppError::InternalError(format!("Failed to build response: {e}")))
}
