//! Mentor model and DTOs.

use fosterdesk_core::csv::{opt, CsvRow};
use fosterdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `mentors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Mentor {
    pub id: DbId,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialism: Option<String>,
    pub max_mentees: i32,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CsvRow for Mentor {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "full_name",
        "email",
        "phone",
        "specialism",
        "max_mentees",
        "is_active",
        "created_at",
    ];

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.full_name.clone(),
            opt(&self.email),
            opt(&self.phone),
            opt(&self.specialism),
            self.max_mentees.to_string(),
            self.is_active.to_string(),
            self.created_at.to_rfc3339(),
        ]
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateMentor {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialism: Option<String>,
    pub max_mentees: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMentor {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialism: Option<String>,
    pub max_mentees: Option<i32>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct MentorListParams {
    pub is_active: Option<bool>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
