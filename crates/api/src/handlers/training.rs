//! Handlers for the `/training` resource: events and their participants.
//!
//! Participants can be added one at a time or imported from CSV. An import
//! processes every row independently: a bad row is reported and skipped, and
//! rows already stored stay stored.

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Path, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use fosterdesk_core::csv::parse_csv;
use fosterdesk_core::error::CoreError;
use fosterdesk_core::training::{
    participant_from_record, summarize, validate_event, validate_import_table, ImportRowResult,
    ImportSummary, ParticipantInput,
};
use fosterdesk_core::types::DbId;
use fosterdesk_core::validation::validate_optional_text;
use fosterdesk_db::models::training::{
    CreateTrainingEvent, TrainingEvent, TrainingEventListParams, TrainingParticipant,
    UpdateTrainingEvent,
};
use fosterdesk_db::repositories::TrainingRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireWriter;
use crate::query::page;
use crate::response::DataResponse;
use crate::state::AppState;

/// Unique constraint backing one-registration-per-email within an event.
const PARTICIPANT_EMAIL_CONSTRAINT: &str = "uq_training_participants_event_email";

/// An event with its registered participants.
#[derive(Debug, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: TrainingEvent,
    pub participants: Vec<TrainingParticipant>,
}

/// Response for a CSV import.
#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub summary: ImportSummary,
    pub results: Vec<ImportRowResult>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn event_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "TrainingEvent",
        id,
    })
}

async fn ensure_event_exists(state: &AppState, id: DbId) -> AppResult<TrainingEvent> {
    TrainingRepo::find_event(&state.pool, id)
        .await?
        .ok_or_else(|| event_not_found(id))
}

fn is_duplicate_participant(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.constraint() == Some(PARTICIPANT_EMAIL_CONSTRAINT)
    )
}

/// Pull the CSV payload out of the first file field of a multipart form.
async fn read_multipart_csv(mut multipart: Multipart) -> AppResult<Bytes> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.file_name().is_none() && field.name() != Some("file") {
            continue;
        }
        return field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()));
    }
    Err(AppError::BadRequest(
        "Multipart upload must include a CSV file field".into(),
    ))
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// GET /api/training/events?from=&limit=&offset=
pub async fn list_events(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TrainingEventListParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = page(params.limit, params.offset);
    let events = TrainingRepo::list_events(&state.pool, params.from, limit, offset).await?;
    Ok(Json(DataResponse { data: events }))
}

/// POST /api/training/events
pub async fn create_event(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Json(input): Json<CreateTrainingEvent>,
) -> AppResult<impl IntoResponse> {
    validate_event(
        &input.title,
        input.description.as_deref(),
        input.starts_at,
        input.ends_at,
        input.capacity,
    )
    .map_err(AppError::BadRequest)?;
    validate_optional_text("Location", input.location.as_deref()).map_err(AppError::BadRequest)?;

    let event = TrainingRepo::create_event(&state.pool, user.user_id, &input).await?;

    tracing::info!(user_id = user.user_id, event_id = event.id, "Training event created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}

/// GET /api/training/events/{id}
pub async fn get_event(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let event = ensure_event_exists(&state, id).await?;
    let participants = TrainingRepo::list_participants(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: EventDetail {
            event,
            participants,
        },
    }))
}

/// PUT /api/training/events/{id}
///
/// The merged event is validated as a whole, and capacity cannot drop below
/// the number of participants already registered.
pub async fn update_event(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTrainingEvent>,
) -> AppResult<impl IntoResponse> {
    let existing = ensure_event_exists(&state, id).await?;

    let capacity = input.capacity.or(existing.capacity);
    validate_event(
        input.title.as_deref().unwrap_or(&existing.title),
        input.description.as_deref().or(existing.description.as_deref()),
        input.starts_at.unwrap_or(existing.starts_at),
        input.ends_at.or(existing.ends_at),
        capacity,
    )
    .map_err(AppError::BadRequest)?;
    validate_optional_text("Location", input.location.as_deref()).map_err(AppError::BadRequest)?;

    if let Some(capacity) = input.capacity {
        if i64::from(capacity) < existing.participant_count {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Capacity cannot be below the {} participants already registered",
                existing.participant_count
            ))));
        }
    }

    let event = TrainingRepo::update_event(&state.pool, id, &input)
        .await?
        .ok_or_else(|| event_not_found(id))?;

    tracing::info!(user_id = user.user_id, event_id = id, "Training event updated");

    Ok(Json(DataResponse { data: event }))
}

/// DELETE /api/training/events/{id}
///
/// Participants are removed with the event.
pub async fn delete_event(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !TrainingRepo::delete_event(&state.pool, id).await? {
        return Err(event_not_found(id));
    }

    tracing::info!(user_id = user.user_id, event_id = id, "Training event deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

/// GET /api/training/events/{id}/participants
pub async fn list_participants(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_event_exists(&state, id).await?;
    let participants = TrainingRepo::list_participants(&state.pool, id).await?;
    Ok(Json(DataResponse { data: participants }))
}

/// POST /api/training/events/{id}/participants
pub async fn add_participant(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ParticipantInput>,
) -> AppResult<impl IntoResponse> {
    input.validate().map_err(AppError::BadRequest)?;
    ensure_event_exists(&state, id).await?;

    let participant = TrainingRepo::add_participant(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Conflict("Event is at capacity".into())))?;

    tracing::info!(
        user_id = user.user_id,
        event_id = id,
        participant_id = participant.id,
        "Participant added"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: participant })))
}

/// POST /api/training/events/{id}/participants/import
///
/// Accepts a raw `text/csv` body or a `multipart/form-data` upload. Needs
/// `full_name` (or `name`) and `email` columns; `attended` is optional.
/// Returns one result per data row.
pub async fn import_participants(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    request: Request,
) -> AppResult<impl IntoResponse> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    let data = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        read_multipart_csv(multipart).await?
    } else {
        Bytes::from_request(request, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
    };

    let table = parse_csv(&data).map_err(AppError::BadRequest)?;
    validate_import_table(&table).map_err(AppError::BadRequest)?;
    ensure_event_exists(&state, id).await?;

    let mut results = Vec::with_capacity(table.rows.len());
    for record in &table.rows {
        let input = match participant_from_record(&table, record) {
            Ok(input) => input,
            Err(msg) => {
                results.push(ImportRowResult::failed(record.line, msg));
                continue;
            }
        };

        let result = match TrainingRepo::add_participant(&state.pool, id, &input).await {
            Ok(Some(participant)) => ImportRowResult::ok(record.line, participant.id),
            Ok(None) => ImportRowResult::failed(record.line, "Event is at capacity"),
            Err(e) if is_duplicate_participant(&e) => ImportRowResult::failed(
                record.line,
                format!("{} is already registered for this event", input.email.trim()),
            ),
            Err(e) => {
                tracing::error!(
                    event_id = id,
                    row = record.line,
                    error = %e,
                    "Participant import row failed"
                );
                ImportRowResult::failed(record.line, "Could not save participant")
            }
        };
        results.push(result);
    }

    let summary = summarize(&results);
    tracing::info!(
        user_id = user.user_id,
        event_id = id,
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Participant import finished"
    );

    Ok(Json(DataResponse {
        data: ImportReport { summary, results },
    }))
}

/// DELETE /api/training/events/{id}/participants/{participant_id}
pub async fn delete_participant(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path((id, participant_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    if !TrainingRepo::delete_participant(&state.pool, id, participant_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "TrainingParticipant",
            id: participant_id,
        }));
    }

    tracing::info!(
        user_id = user.user_id,
        event_id = id,
        participant_id,
        "Participant removed"
    );

    Ok(StatusCode::NO_CONTENT)
}
