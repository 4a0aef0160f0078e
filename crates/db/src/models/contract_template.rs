//! Contract template model and DTOs.

use fosterdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `contract_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContractTemplate {
    pub id: DbId,
    pub name: String,
    /// `company`, `freelancer`, `mentor`, or `delivery`.
    pub role_type: String,
    pub content: String,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateContractTemplate {
    pub name: String,
    pub role_type: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContractTemplate {
    pub name: Option<String>,
    pub role_type: Option<String>,
    pub content: Option<String>,
}

/// Query parameters for listing templates.
#[derive(Debug, Deserialize)]
pub struct ContractTemplateListParams {
    pub role_type: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
