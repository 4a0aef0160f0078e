//! Handlers for the `/contacts` resource (local authorities, social workers,
//! schools, and other external people).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use fosterdesk_core::directory::{validate_contact_type, validate_notes, validate_person};
use fosterdesk_core::error::CoreError;
use fosterdesk_core::search::ilike_pattern;
use fosterdesk_core::types::DbId;
use fosterdesk_core::validation::validate_optional_text;
use fosterdesk_db::models::contact::{ContactListParams, CreateContact, UpdateContact};
use fosterdesk_db::repositories::ContactRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireWriter;
use crate::query::page;
use crate::response::DataResponse;
use crate::state::AppState;

fn contact_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Contact",
        id,
    })
}

fn validate_fields(
    full_name: Option<&str>,
    organisation: Option<&str>,
    email: Option<&str>,
    phone: Option<&str>,
    contact_type: Option<&str>,
    notes: Option<&str>,
) -> Result<(), String> {
    validate_person(full_name, email, phone)?;
    validate_optional_text("Organisation", organisation)?;
    if let Some(contact_type) = contact_type {
        validate_contact_type(contact_type)?;
    }
    validate_notes(notes)
}

/// GET /api/contacts?contact_type=&search=&limit=&offset=
pub async fn list_contacts(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ContactListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(contact_type) = &params.contact_type {
        validate_contact_type(contact_type).map_err(AppError::BadRequest)?;
    }
    let pattern = ilike_pattern(params.search.as_deref());
    let (limit, offset) = page(params.limit, params.offset);

    let contacts = ContactRepo::list_filtered(
        &state.pool,
        params.contact_type.as_deref(),
        pattern.as_deref(),
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse { data: contacts }))
}

/// POST /api/contacts
pub async fn create_contact(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Json(input): Json<CreateContact>,
) -> AppResult<impl IntoResponse> {
    validate_fields(
        Some(&input.full_name),
        input.organisation.as_deref(),
        input.email.as_deref(),
        input.phone.as_deref(),
        input.contact_type.as_deref(),
        input.notes.as_deref(),
    )
    .map_err(AppError::BadRequest)?;

    let contact = ContactRepo::create(&state.pool, &input).await?;

    tracing::info!(user_id = user.user_id, contact_id = contact.id, "Contact created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: contact })))
}

/// GET /api/contacts/{id}
pub async fn get_contact(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let contact = ContactRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| contact_not_found(id))?;

    Ok(Json(DataResponse { data: contact }))
}

/// PUT /api/contacts/{id}
pub async fn update_contact(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateContact>,
) -> AppResult<impl IntoResponse> {
    validate_fields(
        input.full_name.as_deref(),
        input.organisation.as_deref(),
        input.email.as_deref(),
        input.phone.as_deref(),
        input.contact_type.as_deref(),
        input.notes.as_deref(),
    )
    .map_err(AppError::BadRequest)?;

    let contact = ContactRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| contact_not_found(id))?;

    tracing::info!(user_id = user.user_id, contact_id = id, "Contact updated");

    Ok(Json(DataResponse { data: contact }))
}

/// DELETE /api/contacts/{id}
pub async fn delete_contact(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !ContactRepo::delete(&state.pool, id).await? {
        return Err(contact_not_found(id));
    }

    tracing::info!(user_id = user.user_id, contact_id = id, "Contact deleted");

    Ok(StatusCode::NO_CONTENT)
}
