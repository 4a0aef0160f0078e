//! Handlers for the `/enquiries` resource (recruitment pipeline).
//!
//! Submitting an assessment updates the enquiry and creates its follow-up
//! reminder in one transaction, then publishes
//! `enquiry.assessment_submitted`.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use fosterdesk_core::enquiry::{
    advance_stage, apply_assessment, follow_up, validate_assessment_notes, validate_closure,
    AssessmentKind, AssessmentRecord, CaseClosure, EnquiryStatus, PipelineStage,
    ENQUIRY_ENTITY_TYPE,
};
use fosterdesk_core::error::CoreError;
use fosterdesk_core::search::ilike_pattern;
use fosterdesk_core::types::DbId;
use fosterdesk_core::validation::{
    validate_name, validate_optional_email, validate_optional_phone, validate_optional_text,
};
use fosterdesk_db::models::enquiry::{
    CloseEnquiry, CreateEnquiry, Enquiry, EnquiryListParams, SubmitAssessment, UpdateEnquiry,
};
use fosterdesk_db::models::reminder::Reminder;
use fosterdesk_db::repositories::EnquiryRepo;
use fosterdesk_events::bus::{EVENT_ASSESSMENT_SUBMITTED, EVENT_ENQUIRY_CLOSED};
use fosterdesk_events::PlatformEvent;
use serde::Serialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireWriter;
use crate::query::page;
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of an assessment submission.
#[derive(Debug, Serialize)]
pub struct AssessmentSubmitted {
    pub enquiry: Enquiry,
    pub reminder: Reminder,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn enquiry_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Enquiry",
        id,
    })
}

async fn ensure_enquiry_exists(state: &AppState, id: DbId) -> AppResult<Enquiry> {
    EnquiryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| enquiry_not_found(id))
}

fn pipeline_position(enquiry: &Enquiry) -> AppResult<(PipelineStage, EnquiryStatus)> {
    let stage = PipelineStage::from_str(&enquiry.stage).map_err(AppError::InternalError)?;
    let status = EnquiryStatus::from_str(&enquiry.status).map_err(AppError::InternalError)?;
    Ok((stage, status))
}

fn concurrent_change() -> AppError {
    AppError::Core(CoreError::Conflict(
        "Enquiry changed while the request was being processed; reload and try again".into(),
    ))
}

fn validate_contact_details(
    email: Option<&str>,
    phone: Option<&str>,
    source: Option<&str>,
    notes: Option<&str>,
) -> AppResult<()> {
    validate_optional_email("Email", email).map_err(AppError::BadRequest)?;
    validate_optional_phone(phone).map_err(AppError::BadRequest)?;
    validate_optional_text("Source", source).map_err(AppError::BadRequest)?;
    validate_optional_text("Notes", notes).map_err(AppError::BadRequest)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/enquiries?stage=&status=&search=&limit=&offset=
pub async fn list_enquiries(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<EnquiryListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(stage) = &params.stage {
        PipelineStage::from_str(stage).map_err(AppError::BadRequest)?;
    }
    if let Some(status) = &params.status {
        EnquiryStatus::from_str(status).map_err(AppError::BadRequest)?;
    }
    let pattern = ilike_pattern(params.search.as_deref());
    let (limit, offset) = page(params.limit, params.offset);

    let enquiries = EnquiryRepo::list_filtered(
        &state.pool,
        params.stage.as_deref(),
        params.status.as_deref(),
        pattern.as_deref(),
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse { data: enquiries }))
}

/// POST /api/enquiries
///
/// New enquiries start at stage `Inquiry` with status `open`.
pub async fn create_enquiry(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Json(input): Json<CreateEnquiry>,
) -> AppResult<impl IntoResponse> {
    validate_name("Applicant name", &input.applicant_name).map_err(AppError::BadRequest)?;
    validate_contact_details(
        input.email.as_deref(),
        input.phone.as_deref(),
        input.source.as_deref(),
        input.notes.as_deref(),
    )?;

    let enquiry = EnquiryRepo::create(&state.pool, user.user_id, &input).await?;

    tracing::info!(user_id = user.user_id, enquiry_id = enquiry.id, "Enquiry created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: enquiry })))
}

/// GET /api/enquiries/{id}
pub async fn get_enquiry(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let enquiry = ensure_enquiry_exists(&state, id).await?;
    Ok(Json(DataResponse { data: enquiry }))
}

/// PUT /api/enquiries/{id}
pub async fn update_enquiry(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEnquiry>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.applicant_name {
        validate_name("Applicant name", name).map_err(AppError::BadRequest)?;
    }
    validate_contact_details(
        input.email.as_deref(),
        input.phone.as_deref(),
        input.source.as_deref(),
        input.notes.as_deref(),
    )?;

    let enquiry = EnquiryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| enquiry_not_found(id))?;

    tracing::info!(user_id = user.user_id, enquiry_id = id, "Enquiry updated");

    Ok(Json(DataResponse { data: enquiry }))
}

/// DELETE /api/enquiries/{id}
pub async fn delete_enquiry(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !EnquiryRepo::delete(&state.pool, id).await? {
        return Err(enquiry_not_found(id));
    }

    tracing::info!(user_id = user.user_id, enquiry_id = id, "Enquiry deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Assessments
// ---------------------------------------------------------------------------

/// POST /api/enquiries/{id}/initial-assessment
pub async fn submit_initial_assessment(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SubmitAssessment>,
) -> AppResult<impl IntoResponse> {
    submit_assessment(&state, user, id, AssessmentKind::Initial, input).await
}

/// POST /api/enquiries/{id}/full-assessment
pub async fn submit_full_assessment(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SubmitAssessment>,
) -> AppResult<impl IntoResponse> {
    submit_assessment(&state, user, id, AssessmentKind::Full, input).await
}

/// Record the assessment, move the enquiry, and create exactly one follow-up
/// reminder due a fixed offset after submission.
async fn submit_assessment(
    state: &AppState,
    user: AuthUser,
    id: DbId,
    kind: AssessmentKind,
    input: SubmitAssessment,
) -> AppResult<(StatusCode, Json<DataResponse<AssessmentSubmitted>>)> {
    validate_assessment_notes(input.notes.as_deref()).map_err(AppError::BadRequest)?;
    validate_optional_text("Assessor", input.assessor.as_deref()).map_err(AppError::BadRequest)?;

    let enquiry = ensure_enquiry_exists(state, id).await?;
    let (stage, status) = pipeline_position(&enquiry)?;

    let outcome = apply_assessment(kind, input.result, stage, status, enquiry.initial_passed())?;

    let now = Utc::now();
    let record = AssessmentRecord {
        result: input.result,
        assessor: input.assessor,
        notes: input.notes,
        submitted_by: user.user_id,
        submitted_at: now,
    };
    let reminder = follow_up(kind, input.result, &enquiry.applicant_name, now);

    let (enquiry, reminder) =
        EnquiryRepo::submit_assessment(&state.pool, &enquiry, kind, &record, outcome, &reminder)
            .await?
            .ok_or_else(concurrent_change)?;

    tracing::info!(
        user_id = user.user_id,
        enquiry_id = id,
        reminder_id = reminder.id,
        assessment = kind.label(),
        result = input.result.as_str(),
        stage = %enquiry.stage,
        "Assessment submitted"
    );

    state.event_bus.publish(
        PlatformEvent::new(EVENT_ASSESSMENT_SUBMITTED)
            .with_source(ENQUIRY_ENTITY_TYPE, id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "applicant_name": enquiry.applicant_name,
                "email": enquiry.email,
                "assessment": kind.label(),
                "result": input.result.as_str(),
                "reminder_id": reminder.id,
            })),
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: AssessmentSubmitted { enquiry, reminder },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Stage and closure
// ---------------------------------------------------------------------------

/// POST /api/enquiries/{id}/advance
///
/// Move the enquiry one stage forward.
pub async fn advance_enquiry(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let enquiry = ensure_enquiry_exists(&state, id).await?;
    let (stage, status) = pipeline_position(&enquiry)?;

    let next = advance_stage(
        stage,
        status,
        enquiry.initial_passed(),
        enquiry.full_passed(),
    )?;

    let enquiry = EnquiryRepo::advance_stage(&state.pool, id, stage, status, next)
        .await?
        .ok_or_else(concurrent_change)?;

    tracing::info!(
        user_id = user.user_id,
        enquiry_id = id,
        from = %stage,
        to = %next,
        "Enquiry advanced"
    );

    Ok(Json(DataResponse { data: enquiry }))
}

/// POST /api/enquiries/{id}/closure
///
/// Close the enquiry as approved, declined, or withdrawn and publish
/// `enquiry.closed`.
pub async fn close_enquiry(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CloseEnquiry>,
) -> AppResult<impl IntoResponse> {
    validate_optional_text("Reason", input.reason.as_deref()).map_err(AppError::BadRequest)?;

    let enquiry = ensure_enquiry_exists(&state, id).await?;
    let (stage, status) = pipeline_position(&enquiry)?;

    validate_closure(input.outcome, stage, status)?;

    let closure = CaseClosure {
        outcome: input.outcome,
        reason: input.reason,
        closed_by: user.user_id,
        closed_at: Utc::now(),
    };

    let enquiry = EnquiryRepo::close(&state.pool, id, status, &closure)
        .await?
        .ok_or_else(concurrent_change)?;

    let outcome = closure.outcome.status().as_str();
    tracing::info!(user_id = user.user_id, enquiry_id = id, outcome, "Enquiry closed");

    state.event_bus.publish(
        PlatformEvent::new(EVENT_ENQUIRY_CLOSED)
            .with_source(ENQUIRY_ENTITY_TYPE, id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "applicant_name": enquiry.applicant_name,
                "email": enquiry.email,
                "outcome": outcome,
            })),
    );

    Ok(Json(DataResponse { data: enquiry }))
}
