//! Handlers for the `/freelancers` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use fosterdesk_core::directory::{
    validate_day_rate, validate_freelancer_role, validate_notes, validate_person, validate_skills,
};
use fosterdesk_core::error::CoreError;
use fosterdesk_core::search::ilike_pattern;
use fosterdesk_core::types::DbId;
use fosterdesk_db::models::freelancer::{
    CreateFreelancer, FreelancerListParams, UpdateFreelancer,
};
use fosterdesk_db::repositories::FreelancerRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireWriter;
use crate::query::page;
use crate::response::DataResponse;
use crate::state::AppState;

fn freelancer_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Freelancer",
        id,
    })
}

fn validate_fields(
    full_name: Option<&str>,
    email: Option<&str>,
    phone: Option<&str>,
    role: Option<&str>,
    day_rate_pence: Option<i64>,
    skills: Option<&[String]>,
    notes: Option<&str>,
) -> Result<(), String> {
    validate_person(full_name, email, phone)?;
    if let Some(role) = role {
        validate_freelancer_role(role)?;
    }
    validate_day_rate(day_rate_pence)?;
    validate_skills(skills)?;
    validate_notes(notes)
}

/// GET /api/freelancers?role=&is_active=&search=&limit=&offset=
pub async fn list_freelancers(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<FreelancerListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(role) = &params.role {
        validate_freelancer_role(role).map_err(AppError::BadRequest)?;
    }
    let pattern = ilike_pattern(params.search.as_deref());
    let (limit, offset) = page(params.limit, params.offset);

    let freelancers = FreelancerRepo::list_filtered(
        &state.pool,
        params.role.as_deref(),
        params.is_active,
        pattern.as_deref(),
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse { data: freelancers }))
}

/// POST /api/freelancers
pub async fn create_freelancer(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Json(input): Json<CreateFreelancer>,
) -> AppResult<impl IntoResponse> {
    validate_fields(
        Some(&input.full_name),
        input.email.as_deref(),
        input.phone.as_deref(),
        input.role.as_deref(),
        input.day_rate_pence,
        input.skills.as_deref(),
        input.notes.as_deref(),
    )
    .map_err(AppError::BadRequest)?;

    let freelancer = FreelancerRepo::create(&state.pool, &input).await?;

    tracing::info!(
        user_id = user.user_id,
        freelancer_id = freelancer.id,
        "Freelancer created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: freelancer })))
}

/// GET /api/freelancers/{id}
pub async fn get_freelancer(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let freelancer = FreelancerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| freelancer_not_found(id))?;

    Ok(Json(DataResponse { data: freelancer }))
}

/// PUT /api/freelancers/{id}
pub async fn update_freelancer(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateFreelancer>,
) -> AppResult<impl IntoResponse> {
    validate_fields(
        input.full_name.as_deref(),
        input.email.as_deref(),
        input.phone.as_deref(),
        input.role.as_deref(),
        input.day_rate_pence,
        input.skills.as_deref(),
        input.notes.as_deref(),
    )
    .map_err(AppError::BadRequest)?;

    let freelancer = FreelancerRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| freelancer_not_found(id))?;

    tracing::info!(user_id = user.user_id, freelancer_id = id, "Freelancer updated");

    Ok(Json(DataResponse { data: freelancer }))
}

/// DELETE /api/freelancers/{id}
///
/// Invoices that reference the freelancer keep their rows with the
/// reference cleared.
pub async fn delete_freelancer(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !FreelancerRepo::delete(&state.pool, id).await? {
        return Err(freelancer_not_found(id));
    }

    tracing::info!(user_id = user.user_id, freelancer_id = id, "Freelancer deleted");

    Ok(StatusCode::NO_CONTENT)
}
