//! Case model, caseworker assignments, and DTOs.

use fosterdesk_core::case_status::KeyDates;
use fosterdesk_core::caseworkers::Assignment;
use fosterdesk_core::csv::{opt, CsvRow};
use fosterdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `cases` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Case {
    pub id: DbId,
    pub case_reference_number: String,
    pub client_full_name: String,
    /// Display label, e.g. `"In Progress"`.
    pub status: String,
    pub summary: Option<String>,
    pub outcome_notes: Option<String>,
    #[serde(skip)]
    pub opened_at: Option<Timestamp>,
    #[serde(skip)]
    pub review_due_at: Option<Timestamp>,
    #[serde(skip)]
    pub closed_at: Option<Timestamp>,
    pub version: i32,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Case {
    pub fn key_dates(&self) -> KeyDates {
        KeyDates {
            opened: self.opened_at,
            review_due: self.review_due_at,
            closed: self.closed_at,
        }
    }
}

impl CsvRow for Case {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "case_reference_number",
        "client_full_name",
        "status",
        "opened_at",
        "review_due_at",
        "closed_at",
        "summary",
        "outcome_notes",
        "created_at",
    ];

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.case_reference_number.clone(),
            self.client_full_name.clone(),
            self.status.clone(),
            opt(&self.opened_at.map(|t| t.to_rfc3339())),
            opt(&self.review_due_at.map(|t| t.to_rfc3339())),
            opt(&self.closed_at.map(|t| t.to_rfc3339())),
            opt(&self.summary),
            opt(&self.outcome_notes),
            self.created_at.to_rfc3339(),
        ]
    }
}

/// A row from `case_caseworkers` joined with the user's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CaseCaseworker {
    pub case_id: DbId,
    pub user_id: DbId,
    pub username: String,
    pub is_lead: bool,
}

/// A case with its key dates grouped and its caseworkers attached.
#[derive(Debug, Clone, Serialize)]
pub struct CaseDetail {
    #[serde(flatten)]
    pub case: Case,
    pub key_dates: KeyDates,
    pub assigned_caseworkers: Vec<CaseCaseworker>,
}

impl CaseDetail {
    pub fn new(case: Case, assigned_caseworkers: Vec<CaseCaseworker>) -> Self {
        Self {
            key_dates: case.key_dates(),
            case,
            assigned_caseworkers,
        }
    }
}

/// DTO for opening a new case. Status always starts at `New`.
#[derive(Debug, Deserialize)]
pub struct CreateCase {
    /// Generated as `CASE-000001` style when omitted.
    pub case_reference_number: Option<String>,
    pub client_full_name: String,
    pub summary: Option<String>,
    pub review_due_at: Option<Timestamp>,
    #[serde(default)]
    pub assigned_caseworkers: Vec<Assignment>,
}

/// DTO for editing case details. Status changes go through the transition endpoint.
#[derive(Debug, Deserialize)]
pub struct UpdateCase {
    pub case_reference_number: Option<String>,
    pub client_full_name: Option<String>,
    pub summary: Option<String>,
    pub outcome_notes: Option<String>,
    pub review_due_at: Option<Timestamp>,
    pub expected_version: Option<i32>,
}

/// Request body for a status transition.
#[derive(Debug, Deserialize)]
pub struct TransitionCase {
    pub status: String,
    pub outcome_notes: Option<String>,
    pub expected_version: Option<i32>,
}

/// Replace the full caseworker list.
#[derive(Debug, Deserialize)]
pub struct SetCaseworkers {
    pub assigned_caseworkers: Vec<Assignment>,
}

#[derive(Debug, Deserialize)]
pub struct CaseListParams {
    pub status: Option<String>,
    pub caseworker_id: Option<DbId>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
