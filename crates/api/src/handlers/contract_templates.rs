//! Handlers for the `/contract-templates` resource.
//!
//! Besides CRUD, the editor uses the placeholder catalogue, per-template
//! placeholder extraction, and a stateless preview that renders unsaved
//! content.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use fosterdesk_core::error::CoreError;
use fosterdesk_core::search::ilike_pattern;
use fosterdesk_core::template::{
    extract_placeholders, parse, unrecognised_placeholders, validate_template_content,
    validate_template_name, TemplateRole,
};
use fosterdesk_core::types::DbId;
use fosterdesk_db::models::contract_template::{
    ContractTemplate, ContractTemplateListParams, CreateContractTemplate, UpdateContractTemplate,
};
use fosterdesk_db::repositories::ContractTemplateRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireWriter;
use crate::query::{page, TypeParams};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A template together with what the editor needs to know about its body.
#[derive(Debug, Serialize)]
pub struct TemplateDetail {
    #[serde(flatten)]
    pub template: ContractTemplate,
    /// Placeholders used in `content`, first-seen order.
    pub placeholders: Vec<String>,
    /// Used placeholders that are not in the recommended set for the role.
    pub unrecognised_placeholders: Vec<String>,
}

impl TemplateDetail {
    fn new(template: ContractTemplate) -> Self {
        let placeholders = extract_placeholders(&template.content);
        let unrecognised_placeholders = TemplateRole::from_str(&template.role_type)
            .map(|role| unrecognised_placeholders(&template.content, role))
            .unwrap_or_default();
        Self {
            template,
            placeholders,
            unrecognised_placeholders,
        }
    }
}

/// Recommended placeholders for one template role.
#[derive(Debug, Serialize)]
pub struct RolePlaceholders {
    pub role_type: &'static str,
    pub placeholders: &'static [&'static str],
}

/// Request body for `POST /contract-templates/preview`.
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub content: String,
    #[serde(default)]
    pub values: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub rendered: String,
    pub placeholders: Vec<String>,
    pub missing: Vec<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_role(role_type: &str) -> AppResult<TemplateRole> {
    TemplateRole::from_str(role_type).map_err(AppError::BadRequest)
}

async fn ensure_template_exists(state: &AppState, id: DbId) -> AppResult<ContractTemplate> {
    ContractTemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "ContractTemplate",
                id,
            })
        })
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/contract-templates?role_type=&search=&limit=&offset=
pub async fn list_templates(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ContractTemplateListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(role_type) = &params.role_type {
        parse_role(role_type)?;
    }
    let pattern = ilike_pattern(params.search.as_deref());
    let (limit, offset) = page(params.limit, params.offset);

    let templates = ContractTemplateRepo::list_filtered(
        &state.pool,
        params.role_type.as_deref(),
        pattern.as_deref(),
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse { data: templates }))
}

/// POST /api/contract-templates
pub async fn create_template(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Json(input): Json<CreateContractTemplate>,
) -> AppResult<impl IntoResponse> {
    validate_template_name(&input.name).map_err(AppError::BadRequest)?;
    parse_role(&input.role_type)?;
    validate_template_content(&input.content).map_err(AppError::BadRequest)?;

    let template = ContractTemplateRepo::create(&state.pool, user.user_id, &input).await?;

    tracing::info!(
        user_id = user.user_id,
        template_id = template.id,
        role_type = %template.role_type,
        "Contract template created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: TemplateDetail::new(template),
        }),
    ))
}

/// GET /api/contract-templates/{id}
pub async fn get_template(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = ensure_template_exists(&state, id).await?;
    Ok(Json(DataResponse {
        data: TemplateDetail::new(template),
    }))
}

/// PUT /api/contract-templates/{id}
///
/// Editing a template never touches contracts already generated from it;
/// their documents pick up the new content the next time they are rendered.
pub async fn update_template(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateContractTemplate>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        validate_template_name(name).map_err(AppError::BadRequest)?;
    }
    if let Some(role_type) = &input.role_type {
        parse_role(role_type)?;
    }
    if let Some(content) = &input.content {
        validate_template_content(content).map_err(AppError::BadRequest)?;
    }

    let template = ContractTemplateRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "ContractTemplate",
                id,
            })
        })?;

    tracing::info!(user_id = user.user_id, template_id = id, "Contract template updated");

    Ok(Json(DataResponse {
        data: TemplateDetail::new(template),
    }))
}

/// DELETE /api/contract-templates/{id}
///
/// Contracts generated from the template survive with `template_id = null`.
pub async fn delete_template(
    RequireWriter(user): RequireWriter,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !ContractTemplateRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "ContractTemplate",
            id,
        }));
    }

    tracing::info!(user_id = user.user_id, template_id = id, "Contract template deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Placeholders
// ---------------------------------------------------------------------------

/// GET /api/contract-templates/placeholders?type=
///
/// Recommended placeholders for one role, or for every role when `type` is
/// omitted.
pub async fn placeholder_catalogue(
    _auth: AuthUser,
    Query(params): Query<TypeParams>,
) -> AppResult<impl IntoResponse> {
    let roles: Vec<TemplateRole> = match params.role_type.as_deref() {
        Some(role_type) => vec![parse_role(role_type)?],
        None => TemplateRole::ALL.to_vec(),
    };

    let catalogue: Vec<RolePlaceholders> = roles
        .into_iter()
        .map(|role| RolePlaceholders {
            role_type: role.as_str(),
            placeholders: role.recommended_placeholders(),
        })
        .collect();

    Ok(Json(DataResponse { data: catalogue }))
}

/// GET /api/contract-templates/{id}/placeholders
pub async fn template_placeholders(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = ensure_template_exists(&state, id).await?;
    Ok(Json(DataResponse {
        data: extract_placeholders(&template.content),
    }))
}

/// POST /api/contract-templates/preview
///
/// Render unsaved content with sample values. Nothing is stored.
pub async fn preview(
    _auth: AuthUser,
    Json(input): Json<PreviewRequest>,
) -> AppResult<impl IntoResponse> {
    validate_template_content(&input.content).map_err(AppError::BadRequest)?;

    let template = parse(&input.content);
    let response = PreviewResponse {
        rendered: template.render(&input.values),
        placeholders: template.placeholders().into_iter().map(String::from).collect(),
        missing: template
            .missing(&input.values)
            .into_iter()
            .map(String::from)
            .collect(),
    };

    Ok(Json(DataResponse { data: response }))
}
