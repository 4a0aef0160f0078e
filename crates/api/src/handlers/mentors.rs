//! Handlers for the `/mentors` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use fosterdesk_core::directory::{validate_max_mentees, validate_notes, validate_person};
use fosterdesk_core::error::CoreError;
use fosterdesk_core::search::ilike_pattern;
use fosterdesk_core::types::DbId;
use fosterdesk_core::validation::validate_optional_text;
use fosterdesk_db::models::mentor::{CreateMentor, MentorListParams, UpdateMentor};
use fosterdesk_db::repositories::MentorRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireWriter;
use crate::query::page;
use crate::response::DataResponse;
use crate::state::AppState;

fn mentor_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Mentor",
        id,
    })
}

fn validate_fields(
    full_name: Option<&str>,
    email: Option<&str>,
    phone: Option<&str>,
    specialism: Option<&str>,
    max_mentees: Option<i32>,
    notes: Option<&str>,
) -> Result<(), String> {
    validate_person(full_name, email, phone)?;
    validate_optional_text("Specialism", specialism)?;
    validate_max_mentees(max_mentees)?;
    validate_notes(notes)
}

/// GET /api/mentors?is_active=&search=&limit=&offset=
pub async fn list_mentors(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<MentorListParams>,
) -> AppResult<impl IntoResponse> {
    let pattern = ilike_pattern(params.search.as_deref());
    let (limit, offset) = page(params.limit, params.offset);

    let mentors =
        MentorRepo::list_filtered(&state.pool, params.is_active, pattern.as_deref(), limit, offset)
            .await?;

    Ok(Json(DataResponse { data: mentors }))
}

/// POST /api/mentors
pub async fn create_mentor(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Json(input): Json<CreateMentor>,
) -> AppResult<impl IntoResponse> {
    validate_fields(
        Some(&input.full_name),
        input.email.as_deref(),
        input.phone.as_deref(),
        input.specialism.as_deref(),
        input.max_mentees,
        input.notes.as_deref(),
    )
    .map_err(AppError::BadRequest)?;

    let mentor = MentorRepo::create(&state.pool, &input).await?;

    tracing::info!(user_id = user.user_id, mentor_id = mentor.id, "Mentor created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: mentor })))
}

/// GET /api/mentors/{id}
pub async fn get_mentor(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let mentor = MentorRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| mentor_not_found(id))?;

    Ok(Json(DataResponse { data: mentor }))
}

/// PUT /api/mentors/{id}
pub async fn update_mentor(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMentor>,
) -> AppResult<impl IntoResponse> {
    validate_fields(
        input.full_name.as_deref(),
        input.email.as_deref(),
        input.phone.as_deref(),
        input.specialism.as_deref(),
        input.max_mentees,
        input.notes.as_deref(),
    )
    .map_err(AppError::BadRequest)?;

    let mentor = MentorRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| mentor_not_found(id))?;

    tracing::info!(user_id = user.user_id, mentor_id = id, "Mentor updated");

    Ok(Json(DataResponse { data: mentor }))
}

/// DELETE /api/mentors/{id}
pub async fn delete_mentor(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !MentorRepo::delete(&state.pool, id).await? {
        return Err(mentor_not_found(id));
    }

    tracing::info!(user_id = user.user_id, mentor_id = id, "Mentor deleted");

    Ok(StatusCode::NO_CONTENT)
}
