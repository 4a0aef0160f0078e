//! Handlers for the `/invoices` resource.
//!
//! Totals are always computed server-side from the lines. Lines and parties
//! are editable only while the invoice is a draft.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use fosterdesk_core::error::CoreError;
use fosterdesk_core::invoice::{
    compute_total, validate_invoice_number, validate_transition, InvoiceStatus,
};
use fosterdesk_core::types::DbId;
use fosterdesk_core::validation::validate_optional_text;
use fosterdesk_db::models::invoice::{
    CreateInvoice, Invoice, InvoiceListParams, UpdateInvoice, UpdateInvoiceStatus,
};
use fosterdesk_db::repositories::InvoiceRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireWriter;
use crate::query::page;
use crate::response::DataResponse;
use crate::state::AppState;

fn invoice_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Invoice",
        id,
    })
}

async fn ensure_invoice_exists(state: &AppState, id: DbId) -> AppResult<Invoice> {
    InvoiceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| invoice_not_found(id))
}

fn stored_status(invoice: &Invoice) -> AppResult<InvoiceStatus> {
    InvoiceStatus::from_str(&invoice.status).map_err(AppError::InternalError)
}

/// GET /api/invoices?status=&freelancer_id=&contact_id=&limit=&offset=
pub async fn list_invoices(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<InvoiceListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = &params.status {
        InvoiceStatus::from_str(status).map_err(AppError::BadRequest)?;
    }
    let (limit, offset) = page(params.limit, params.offset);

    let invoices = InvoiceRepo::list_filtered(
        &state.pool,
        params.status.as_deref(),
        params.freelancer_id,
        params.contact_id,
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse { data: invoices }))
}

/// POST /api/invoices
///
/// Create a draft invoice. `total_pence` is derived from the lines.
pub async fn create_invoice(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Json(input): Json<CreateInvoice>,
) -> AppResult<impl IntoResponse> {
    validate_invoice_number(&input.invoice_number).map_err(AppError::BadRequest)?;
    validate_optional_text("Notes", input.notes.as_deref()).map_err(AppError::BadRequest)?;
    let total = compute_total(&input.lines)?;

    let invoice = InvoiceRepo::create(&state.pool, user.user_id, &input, total).await?;

    tracing::info!(
        user_id = user.user_id,
        invoice_id = invoice.id,
        total_pence = total,
        "Invoice created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: invoice })))
}

/// GET /api/invoices/{id}
pub async fn get_invoice(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let invoice = ensure_invoice_exists(&state, id).await?;
    Ok(Json(DataResponse { data: invoice }))
}

/// PUT /api/invoices/{id}
pub async fn update_invoice(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateInvoice>,
) -> AppResult<impl IntoResponse> {
    if let Some(number) = &input.invoice_number {
        validate_invoice_number(number).map_err(AppError::BadRequest)?;
    }
    validate_optional_text("Notes", input.notes.as_deref()).map_err(AppError::BadRequest)?;
    let total = input.lines.as_deref().map(compute_total).transpose()?;

    let existing = ensure_invoice_exists(&state, id).await?;
    let status = stored_status(&existing)?;
    if !status.is_editable() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Invoice is {status}; only draft invoices can be edited"
        ))));
    }

    let invoice = InvoiceRepo::update(&state.pool, id, status.as_str(), &input, total)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Invoice status changed concurrently; reload and try again".into(),
            ))
        })?;

    tracing::info!(user_id = user.user_id, invoice_id = id, "Invoice updated");

    Ok(Json(DataResponse { data: invoice }))
}

/// POST /api/invoices/{id}/status
///
/// Draft -> sent -> paid, with overdue and void along the way. Sending
/// stamps `issued_at` if unset; paying stamps `paid_at`.
pub async fn update_status(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateInvoiceStatus>,
) -> AppResult<impl IntoResponse> {
    let target = InvoiceStatus::from_str(&input.status).map_err(AppError::BadRequest)?;

    let existing = ensure_invoice_exists(&state, id).await?;
    let current = stored_status(&existing)?;
    validate_transition(current, target, existing.lines.len())?;

    let invoice = InvoiceRepo::update_status(&state.pool, id, current.as_str(), target.as_str())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Invoice status changed concurrently; reload and try again".into(),
            ))
        })?;

    tracing::info!(
        user_id = user.user_id,
        invoice_id = id,
        from = %current,
        to = %target,
        "Invoice status changed"
    );

    Ok(Json(DataResponse { data: invoice }))
}

/// DELETE /api/invoices/{id}
pub async fn delete_invoice(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !InvoiceRepo::delete(&state.pool, id).await? {
        return Err(invoice_not_found(id));
    }

    tracing::info!(user_id = user.user_id, invoice_id = id, "Invoice deleted");

    Ok(StatusCode::NO_CONTENT)
}
