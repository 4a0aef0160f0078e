//! Enquiry (recruitment pipeline) model and DTOs.

use fosterdesk_core::enquiry::{
    AssessmentRecord, AssessmentResult, CaseClosure, ClosureOutcome,
};
use fosterdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `enquiries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Enquiry {
    pub id: DbId,
    pub applicant_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub stage: String,
    pub status: String,
    pub initial_assessment: Option<Json<AssessmentRecord>>,
    pub full_assessment: Option<Json<AssessmentRecord>>,
    pub case_closure: Option<Json<CaseClosure>>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Enquiry {
    pub fn initial_passed(&self) -> bool {
        self.initial_assessment
            .as_ref()
            .is_some_and(|a| a.result == AssessmentResult::Pass)
    }

    pub fn full_passed(&self) -> bool {
        self.full_assessment
            .as_ref()
            .is_some_and(|a| a.result == AssessmentResult::Pass)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateEnquiry {
    pub applicant_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
}

/// Contact details only; stage and status move through dedicated endpoints.
#[derive(Debug, Deserialize)]
pub struct UpdateEnquiry {
    pub applicant_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
}

/// Request body for an initial or full assessment.
#[derive(Debug, Deserialize)]
pub struct SubmitAssessment {
    pub result: AssessmentResult,
    pub assessor: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CloseEnquiry {
    pub outcome: ClosureOutcome,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EnquiryListParams {
    pub stage: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
