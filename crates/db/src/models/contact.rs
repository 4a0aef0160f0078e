//! External contact model and DTOs.

use fosterdesk_core::csv::{opt, CsvRow};
use fosterdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `contacts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contact {
    pub id: DbId,
    pub full_name: String,
    pub organisation: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub contact_type: String,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CsvRow for Contact {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "full_name",
        "organisation",
        "email",
        "phone",
        "contact_type",
        "notes",
        "created_at",
    ];

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.full_name.clone(),
            opt(&self.organisation),
            opt(&self.email),
            opt(&self.phone),
            self.contact_type.clone(),
            opt(&self.notes),
            self.created_at.to_rfc3339(),
        ]
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateContact {
    pub full_name: String,
    pub organisation: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub contact_type: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContact {
    pub full_name: Option<String>,
    pub organisation: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub contact_type: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContactListParams {
    pub contact_type: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
