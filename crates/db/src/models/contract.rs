//! Generated contract model and DTOs.

use fosterdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `contracts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contract {
    pub id: DbId,
    pub template_id: Option<DbId>,
    pub role_type: String,
    pub name: String,
    /// Placeholder name -> value, as a JSON object.
    pub filled_data: serde_json::Value,
    pub status: String,
    pub recipient_email: Option<String>,
    pub generated_doc_url: Option<String>,
    pub sent_at: Option<Timestamp>,
    pub signed_at: Option<Timestamp>,
    pub version: i32,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Generate a contract from a template.
#[derive(Debug, Deserialize)]
pub struct CreateContract {
    pub template_id: DbId,
    pub name: String,
    #[serde(default)]
    pub filled_data: serde_json::Map<String, serde_json::Value>,
    pub recipient_email: Option<String>,
}

/// Re-edit a contract's filled data. `filled_data` replaces the stored map.
#[derive(Debug, Deserialize)]
pub struct UpdateContract {
    pub name: Option<String>,
    pub filled_data: Option<serde_json::Map<String, serde_json::Value>>,
    pub recipient_email: Option<String>,
    pub expected_version: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContractStatus {
    pub status: String,
    pub expected_version: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ContractListParams {
    pub status: Option<String>,
    pub template_id: Option<DbId>,
    pub role_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
