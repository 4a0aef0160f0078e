//! Freelancer model and DTOs.

use fosterdesk_core::csv::{opt, CsvRow};
use fosterdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `freelancers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Freelancer {
    pub id: DbId,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub day_rate_pence: Option<i64>,
    pub skills: Vec<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CsvRow for Freelancer {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "full_name",
        "email",
        "phone",
        "role",
        "day_rate_pence",
        "skills",
        "is_active",
        "created_at",
    ];

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.full_name.clone(),
            opt(&self.email),
            opt(&self.phone),
            self.role.clone(),
            opt(&self.day_rate_pence),
            self.skills.join(";"),
            self.is_active.to_string(),
            self.created_at.to_rfc3339(),
        ]
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateFreelancer {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub day_rate_pence: Option<i64>,
    pub skills: Option<Vec<String>>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFreelancer {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub day_rate_pence: Option<i64>,
    pub skills: Option<Vec<String>>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct FreelancerListParams {
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
