//! Handlers for the `/reminders` resource.
//!
//! Most reminders are created by assessment submission; this resource lets
//! staff add their own, list what is due, and mark items done.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use fosterdesk_core::error::CoreError;
use fosterdesk_core::reminder::{validate_reminder, ReminderStatus};
use fosterdesk_core::types::DbId;
use fosterdesk_db::models::reminder::{CreateReminder, ReminderListParams};
use fosterdesk_db::repositories::ReminderRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireWriter;
use crate::query::page;
use crate::response::DataResponse;
use crate::state::AppState;

fn reminder_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Reminder",
        id,
    })
}

/// GET /api/reminders?status=&related_entity_type=&related_entity_id=&due_before=
pub async fn list_reminders(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ReminderListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = &params.status {
        ReminderStatus::from_str(status).map_err(AppError::BadRequest)?;
    }
    let (limit, offset) = page(params.limit, params.offset);

    let reminders = ReminderRepo::list_filtered(
        &state.pool,
        params.status.as_deref(),
        params.related_entity_type.as_deref(),
        params.related_entity_id,
        params.due_before,
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse { data: reminders }))
}

/// POST /api/reminders
pub async fn create_reminder(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Json(input): Json<CreateReminder>,
) -> AppResult<impl IntoResponse> {
    validate_reminder(
        &input.title,
        input.description.as_deref(),
        input.related_entity_type.as_deref(),
        input.related_entity_id,
    )
    .map_err(AppError::BadRequest)?;

    let reminder = ReminderRepo::create(&state.pool, Some(user.user_id), &input).await?;

    tracing::info!(user_id = user.user_id, reminder_id = reminder.id, "Reminder created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: reminder })))
}

/// GET /api/reminders/{id}
pub async fn get_reminder(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let reminder = ReminderRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| reminder_not_found(id))?;

    Ok(Json(DataResponse { data: reminder }))
}

/// POST /api/reminders/{id}/complete
///
/// Only pending reminders can be completed.
pub async fn complete_reminder(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let Some(reminder) = ReminderRepo::complete(&state.pool, id, user.user_id).await? else {
        return match ReminderRepo::find_by_id(&state.pool, id).await? {
            Some(_) => Err(AppError::Core(CoreError::Conflict(
                "Reminder is already completed".into(),
            ))),
            None => Err(reminder_not_found(id)),
        };
    };

    tracing::info!(user_id = user.user_id, reminder_id = id, "Reminder completed");

    Ok(Json(DataResponse { data: reminder }))
}

/// DELETE /api/reminders/{id}
pub async fn delete_reminder(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !ReminderRepo::delete(&state.pool, id).await? {
        return Err(reminder_not_found(id));
    }

    tracing::info!(user_id = user.user_id, reminder_id = id, "Reminder deleted");

    Ok(StatusCode::NO_CONTENT)
}
