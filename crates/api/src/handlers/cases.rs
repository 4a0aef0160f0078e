//! Handlers for the `/cases` resource.
//!
//! Status changes go through `/transition` only, which validates against
//! the case workflow and maintains the key dates. Caseworker assignment keeps
//! at most one lead per case.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use fosterdesk_core::case_status::{
    plan_transition, validate_case_reference, CaseAction, CaseStatus,
};
use fosterdesk_core::caseworkers::{validate_assignments, Assignment};
use fosterdesk_core::error::CoreError;
use fosterdesk_core::search::ilike_pattern;
use fosterdesk_core::types::DbId;
use fosterdesk_core::validation::{validate_name, validate_optional_text};
use fosterdesk_db::models::case::{
    Case, CaseCaseworker, CaseDetail, CaseListParams, CreateCase, SetCaseworkers, TransitionCase,
    UpdateCase,
};
use fosterdesk_db::repositories::{CaseRepo, UserRepo};
use fosterdesk_events::bus::EVENT_CASE_TRANSITIONED;
use fosterdesk_events::PlatformEvent;
use serde::Serialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireWriter;
use crate::query::page;
use crate::response::DataResponse;
use crate::state::AppState;

/// One action button offered for a case in its current status.
#[derive(Debug, Serialize)]
pub struct AvailableAction {
    pub action: CaseAction,
    pub label: &'static str,
    /// Status the case moves to when the action is taken.
    pub target_status: &'static str,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn case_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Case", id })
}

async fn ensure_case_exists(state: &AppState, id: DbId) -> AppResult<Case> {
    CaseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| case_not_found(id))
}

fn stored_status(case: &Case) -> AppResult<CaseStatus> {
    CaseStatus::from_str(&case.status).map_err(AppError::InternalError)
}

async fn detail(state: &AppState, case: Case) -> AppResult<CaseDetail> {
    let caseworkers = CaseRepo::list_caseworkers(&state.pool, case.id).await?;
    Ok(CaseDetail::new(case, caseworkers))
}

/// Validate an assignment list and check every user is an active account.
async fn validate_caseworkers(state: &AppState, assignments: &[Assignment]) -> AppResult<()> {
    validate_assignments(assignments)?;
    if assignments.is_empty() {
        return Ok(());
    }

    let ids: Vec<DbId> = assignments.iter().map(|a| a.user_id).collect();
    let active = UserRepo::count_active(&state.pool, &ids).await?;
    if active != ids.len() as i64 {
        return Err(AppError::Core(CoreError::Validation(
            "Every assigned caseworker must be an active user".into(),
        )));
    }
    Ok(())
}

fn validate_case_fields(
    reference: Option<&str>,
    client_full_name: Option<&str>,
    summary: Option<&str>,
    outcome_notes: Option<&str>,
) -> AppResult<()> {
    if let Some(reference) = reference {
        validate_case_reference(reference).map_err(AppError::BadRequest)?;
    }
    if let Some(name) = client_full_name {
        validate_name("Client full name", name).map_err(AppError::BadRequest)?;
    }
    validate_optional_text("Summary", summary).map_err(AppError::BadRequest)?;
    validate_optional_text("Outcome notes", outcome_notes).map_err(AppError::BadRequest)?;
    Ok(())
}

/// Build the error for a guarded write that matched no row.
async fn stale_write(state: &AppState, id: DbId, expected_version: Option<i32>) -> AppError {
    match CaseRepo::find_by_id(&state.pool, id).await {
        Ok(None) => case_not_found(id),
        Ok(Some(current)) => match expected_version {
            Some(expected) if expected != current.version => AppError::Core(
                CoreError::stale_version("Case", expected, current.version),
            ),
            _ => AppError::Core(CoreError::Conflict(
                "Case was modified concurrently; reload and try again".into(),
            )),
        },
        Err(e) => AppError::Database(e),
    }
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/cases?status=&caseworker_id=&search=&limit=&offset=
///
/// Each case in the list carries its key dates and caseworkers.
pub async fn list_cases(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<CaseListParams>,
) -> AppResult<impl IntoResponse> {
    let status = params
        .status
        .as_deref()
        .map(CaseStatus::from_str)
        .transpose()
        .map_err(AppError::BadRequest)?;
    let pattern = ilike_pattern(params.search.as_deref());
    let (limit, offset) = page(params.limit, params.offset);

    let cases = CaseRepo::list_filtered(
        &state.pool,
        status.map(CaseStatus::label),
        params.caseworker_id,
        pattern.as_deref(),
        limit,
        offset,
    )
    .await?;

    let ids: Vec<DbId> = cases.iter().map(|c| c.id).collect();
    let mut by_case: HashMap<DbId, Vec<CaseCaseworker>> = HashMap::new();
    for caseworker in CaseRepo::list_caseworkers_for_cases(&state.pool, &ids).await? {
        by_case.entry(caseworker.case_id).or_default().push(caseworker);
    }

    let details: Vec<CaseDetail> = cases
        .into_iter()
        .map(|case| {
            let caseworkers = by_case.remove(&case.id).unwrap_or_default();
            CaseDetail::new(case, caseworkers)
        })
        .collect();

    Ok(Json(DataResponse { data: details }))
}

/// POST /api/cases
///
/// Open a new case in status `New`. A reference number is generated when
/// none is supplied.
pub async fn create_case(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Json(input): Json<CreateCase>,
) -> AppResult<impl IntoResponse> {
    validate_case_fields(
        input.case_reference_number.as_deref(),
        Some(&input.client_full_name),
        input.summary.as_deref(),
        None,
    )?;
    validate_caseworkers(&state, &input.assigned_caseworkers).await?;

    let case = CaseRepo::create(&state.pool, user.user_id, &input).await?;

    tracing::info!(
        user_id = user.user_id,
        case_id = case.id,
        reference = %case.case_reference_number,
        "Case created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: detail(&state, case).await?,
        }),
    ))
}

/// GET /api/cases/{id}
pub async fn get_case(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let case = ensure_case_exists(&state, id).await?;
    Ok(Json(DataResponse {
        data: detail(&state, case).await?,
    }))
}

/// PUT /api/cases/{id}
pub async fn update_case(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCase>,
) -> AppResult<impl IntoResponse> {
    validate_case_fields(
        input.case_reference_number.as_deref(),
        input.client_full_name.as_deref(),
        input.summary.as_deref(),
        input.outcome_notes.as_deref(),
    )?;

    let case = match CaseRepo::update(&state.pool, id, &input).await? {
        Some(case) => case,
        None => return Err(stale_write(&state, id, input.expected_version).await),
    };

    tracing::info!(
        user_id = user.user_id,
        case_id = id,
        version = case.version,
        "Case updated"
    );

    Ok(Json(DataResponse {
        data: detail(&state, case).await?,
    }))
}

/// DELETE /api/cases/{id}
pub async fn delete_case(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !CaseRepo::delete(&state.pool, id).await? {
        return Err(case_not_found(id));
    }

    tracing::info!(user_id = user.user_id, case_id = id, "Case deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// GET /api/cases/{id}/actions
pub async fn list_actions(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let case = ensure_case_exists(&state, id).await?;
    let status = stored_status(&case)?;

    let actions: Vec<AvailableAction> = status
        .available_actions()
        .into_iter()
        .map(|action| AvailableAction {
            action,
            label: action.label(),
            target_status: action.target().label(),
        })
        .collect();

    Ok(Json(DataResponse { data: actions }))
}

/// POST /api/cases/{id}/transition
///
/// Move the case to a new status. Entering `Open` stamps the opened date,
/// closing requires outcome notes and stamps the closed date, and re-opening
/// clears it.
pub async fn transition_case(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<TransitionCase>,
) -> AppResult<impl IntoResponse> {
    let target = CaseStatus::from_str(&input.status).map_err(AppError::BadRequest)?;
    validate_optional_text("Outcome notes", input.outcome_notes.as_deref())
        .map_err(AppError::BadRequest)?;

    let case = ensure_case_exists(&state, id).await?;
    if let Some(expected) = input.expected_version {
        if expected != case.version {
            return Err(AppError::Core(CoreError::stale_version(
                "Case",
                expected,
                case.version,
            )));
        }
    }

    let from = stored_status(&case)?;
    let plan = plan_transition(
        from,
        target,
        case.key_dates(),
        input.outcome_notes.as_deref(),
        Utc::now(),
    )?;

    let updated = match CaseRepo::apply_transition(
        &state.pool,
        id,
        &plan,
        input.outcome_notes.as_deref(),
        input.expected_version,
    )
    .await?
    {
        Some(updated) => updated,
        None => return Err(stale_write(&state, id, input.expected_version).await),
    };

    tracing::info!(
        user_id = user.user_id,
        case_id = id,
        from = %plan.from,
        to = %plan.to,
        "Case status changed"
    );

    state.event_bus.publish(
        PlatformEvent::new(EVENT_CASE_TRANSITIONED)
            .with_source("case", id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "from": plan.from.label(),
                "to": plan.to.label(),
            })),
    );

    Ok(Json(DataResponse {
        data: detail(&state, updated).await?,
    }))
}

// ---------------------------------------------------------------------------
// Caseworkers
// ---------------------------------------------------------------------------

/// PUT /api/cases/{id}/caseworkers
///
/// Replace the full assignment list. At most one entry may be the lead.
pub async fn set_caseworkers(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetCaseworkers>,
) -> AppResult<impl IntoResponse> {
    ensure_case_exists(&state, id).await?;
    validate_caseworkers(&state, &input.assigned_caseworkers).await?;

    CaseRepo::set_caseworkers(&state.pool, id, &input.assigned_caseworkers).await?;

    tracing::info!(
        user_id = user.user_id,
        case_id = id,
        count = input.assigned_caseworkers.len(),
        "Case caseworkers replaced"
    );

    let caseworkers = CaseRepo::list_caseworkers(&state.pool, id).await?;
    Ok(Json(DataResponse { data: caseworkers }))
}

/// POST /api/cases/{id}/caseworkers/{user_id}/lead
///
/// Make an assigned caseworker the lead. Any previous lead is cleared in the
/// same transaction.
pub async fn set_lead(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path((id, caseworker_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    ensure_case_exists(&state, id).await?;

    if !CaseRepo::set_lead(&state.pool, id, caseworker_id).await? {
        return Err(AppError::Core(CoreError::Validation(format!(
            "User {caseworker_id} is not assigned to this case"
        ))));
    }

    tracing::info!(
        user_id = user.user_id,
        case_id = id,
        lead_user_id = caseworker_id,
        "Lead caseworker set"
    );

    let caseworkers = CaseRepo::list_caseworkers(&state.pool, id).await?;
    Ok(Json(DataResponse { data: caseworkers }))
}
