//! Handlers for the `/contracts` resource.
//!
//! A contract is generated from a template and keeps only its filled values.
//! Documents are always rendered from the template's current content, so
//! missing-field checks and downloads reflect later template edits.

use std::str::FromStr;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use fosterdesk_core::contract::{
    document_filename, validate_contract_name, validate_transition, ContractStatus,
};
use fosterdesk_core::error::CoreError;
use fosterdesk_core::template::{parse, values_from_json};
use fosterdesk_core::types::DbId;
use fosterdesk_core::validation::validate_optional_email;
use fosterdesk_db::models::contract::{
    Contract, ContractListParams, CreateContract, UpdateContract, UpdateContractStatus,
};
use fosterdesk_db::models::contract_template::ContractTemplate;
use fosterdesk_db::repositories::{ContractRepo, ContractTemplateRepo};
use fosterdesk_events::bus::EVENT_CONTRACT_SENT;
use fosterdesk_events::PlatformEvent;
use serde::Serialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireWriter;
use crate::query::page;
use crate::response::DataResponse;
use crate::state::AppState;

/// A contract with the template placeholders it has no value for yet.
#[derive(Debug, Serialize)]
pub struct ContractDetail {
    #[serde(flatten)]
    pub contract: Contract,
    pub missing_placeholders: Vec<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn contract_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Contract",
        id,
    })
}

async fn ensure_contract_exists(state: &AppState, id: DbId) -> AppResult<Contract> {
    ContractRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| contract_not_found(id))
}

/// The contract's source template, if it still exists.
async fn current_template(
    state: &AppState,
    contract: &Contract,
) -> AppResult<Option<ContractTemplate>> {
    match contract.template_id {
        Some(template_id) => Ok(ContractTemplateRepo::find_by_id(&state.pool, template_id).await?),
        None => Ok(None),
    }
}

fn template_deleted(consequence: &str) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "The template for this contract has been deleted; {consequence}"
    )))
}

fn missing_placeholders(template: Option<&ContractTemplate>, contract: &Contract) -> Vec<String> {
    let Some(template) = template else {
        return Vec::new();
    };
    let values = values_from_json(&contract.filled_data);
    parse(&template.content)
        .missing(&values)
        .into_iter()
        .map(String::from)
        .collect()
}

async fn detail(state: &AppState, contract: Contract) -> AppResult<ContractDetail> {
    let template = current_template(state, &contract).await?;
    let missing_placeholders = missing_placeholders(template.as_ref(), &contract);
    Ok(ContractDetail {
        contract,
        missing_placeholders,
    })
}

fn stored_status(contract: &Contract) -> AppResult<ContractStatus> {
    ContractStatus::from_str(&contract.status).map_err(AppError::InternalError)
}

/// Build the error for a guarded write that matched no row.
async fn stale_write(state: &AppState, id: DbId, expected_version: Option<i32>) -> AppError {
    match ContractRepo::find_by_id(&state.pool, id).await {
        Ok(None) => contract_not_found(id),
        Ok(Some(current)) => match expected_version {
            Some(expected) => AppError::Core(CoreError::stale_version(
                "Contract",
                expected,
                current.version,
            )),
            None => AppError::Core(CoreError::Conflict(
                "Contract was modified concurrently; reload and try again".into(),
            )),
        },
        Err(e) => AppError::Database(e),
    }
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/contracts?status=&template_id=&role_type=&limit=&offset=
pub async fn list_contracts(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ContractListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = &params.status {
        ContractStatus::from_str(status).map_err(AppError::BadRequest)?;
    }
    let (limit, offset) = page(params.limit, params.offset);

    let contracts = ContractRepo::list_filtered(
        &state.pool,
        params.status.as_deref(),
        params.template_id,
        params.role_type.as_deref(),
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse { data: contracts }))
}

/// POST /api/contracts
///
/// Generate a draft contract from a template. The contract inherits the
/// template's role type.
pub async fn create_contract(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Json(input): Json<CreateContract>,
) -> AppResult<impl IntoResponse> {
    validate_contract_name(&input.name).map_err(AppError::BadRequest)?;
    validate_optional_email("Recipient email", input.recipient_email.as_deref())
        .map_err(AppError::BadRequest)?;

    let template = ContractTemplateRepo::find_by_id(&state.pool, input.template_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "ContractTemplate",
                id: input.template_id,
            })
        })?;

    let contract =
        ContractRepo::create(&state.pool, user.user_id, &template.role_type, &input).await?;

    tracing::info!(
        user_id = user.user_id,
        contract_id = contract.id,
        template_id = template.id,
        "Contract generated"
    );

    let missing_placeholders = missing_placeholders(Some(&template), &contract);
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ContractDetail {
                contract,
                missing_placeholders,
            },
        }),
    ))
}

/// GET /api/contracts/{id}
pub async fn get_contract(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let contract = ensure_contract_exists(&state, id).await?;
    Ok(Json(DataResponse {
        data: detail(&state, contract).await?,
    }))
}

/// PUT /api/contracts/{id}
///
/// Re-edit the filled values. Only draft and sent contracts are editable.
pub async fn update_contract(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateContract>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        validate_contract_name(name).map_err(AppError::BadRequest)?;
    }
    validate_optional_email("Recipient email", input.recipient_email.as_deref())
        .map_err(AppError::BadRequest)?;

    let existing = ensure_contract_exists(&state, id).await?;
    let status = stored_status(&existing)?;
    if !status.is_editable() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Contract is {status} and can no longer be edited"
        ))));
    }

    let contract = match ContractRepo::update(&state.pool, id, status.as_str(), &input).await? {
        Some(contract) => contract,
        None => return Err(stale_write(&state, id, input.expected_version).await),
    };

    tracing::info!(
        user_id = user.user_id,
        contract_id = id,
        version = contract.version,
        "Contract updated"
    );

    Ok(Json(DataResponse {
        data: detail(&state, contract).await?,
    }))
}

/// DELETE /api/contracts/{id}
pub async fn delete_contract(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !ContractRepo::delete(&state.pool, id).await? {
        return Err(contract_not_found(id));
    }

    tracing::info!(user_id = user.user_id, contract_id = id, "Contract deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Status and document
// ---------------------------------------------------------------------------

/// POST /api/contracts/{id}/status
///
/// Move the contract through its lifecycle. Sending is refused while any
/// template placeholder is unfilled or the template has been deleted, and
/// publishes `contract.sent` for email automation.
pub async fn update_status(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateContractStatus>,
) -> AppResult<impl IntoResponse> {
    let target = ContractStatus::from_str(&input.status).map_err(AppError::BadRequest)?;

    let existing = ensure_contract_exists(&state, id).await?;
    let current = stored_status(&existing)?;
    let template = current_template(&state, &existing).await?;
    if target == ContractStatus::Sent && template.is_none() {
        return Err(template_deleted("it cannot be sent"));
    }
    let missing = missing_placeholders(template.as_ref(), &existing);
    let missing_refs: Vec<&str> = missing.iter().map(String::as_str).collect();

    validate_transition(current, target, &missing_refs)?;

    // Guard on the version we validated against so a concurrent edit cannot
    // slip in between the check and the write.
    let guard = input.expected_version.or(Some(existing.version));
    let contract = match ContractRepo::update_status(&state.pool, id, target.as_str(), guard).await?
    {
        Some(contract) => contract,
        None => return Err(stale_write(&state, id, input.expected_version).await),
    };

    tracing::info!(
        user_id = user.user_id,
        contract_id = id,
        from = %current,
        to = %target,
        "Contract status changed"
    );

    if target == ContractStatus::Sent {
        let document_url = contract
            .generated_doc_url
            .clone()
            .unwrap_or_else(|| format!("/api/contracts/{id}/document"));
        state.event_bus.publish(
            PlatformEvent::new(EVENT_CONTRACT_SENT)
                .with_source("contract", id)
                .with_actor(user.user_id)
                .with_payload(json!({
                    "contract_name": contract.name,
                    "recipient_email": contract.recipient_email,
                    "document_url": document_url,
                })),
        );
    }

    Ok(Json(DataResponse {
        data: ContractDetail {
            contract,
            missing_placeholders: missing,
        },
    }))
}

/// GET /api/contracts/{id}/document
///
/// Download the rendered contract as plain text. Unfilled placeholders
/// appear as `[name]`.
pub async fn download_document(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let contract = ensure_contract_exists(&state, id).await?;
    let template = current_template(&state, &contract)
        .await?
        .ok_or_else(|| template_deleted("no document can be rendered"))?;

    let rendered = parse(&template.content).render(&values_from_json(&contract.filled_data));
    let filename = document_filename(&contract.name, contract.id);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(rendered))
        .map_err(|e| AppError::InternalError(format!("Failed to build response: {e}")))
}
