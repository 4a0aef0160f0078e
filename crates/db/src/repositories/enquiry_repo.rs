//! Repository for the `enquiries` table.
//!
//! Stage and status changes are guarded on the values the caller validated
//! against, so a concurrent change makes the write return `None`.

use fosterdesk_core::enquiry::{
    AssessmentKind, AssessmentRecord, CaseClosure, EnquiryStatus, FollowUp, PipelineStage,
    SubmissionOutcome, ENQUIRY_ENTITY_TYPE,
};
use fosterdesk_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::enquiry::{CreateEnquiry, Enquiry, UpdateEnquiry};
use crate::models::reminder::{CreateReminder, Reminder};
use crate::repositories::ReminderRepo;

const COLUMNS: &str = "id, applicant_name, email, phone, source, notes, stage, status, \
                       initial_assessment, full_assessment, case_closure, \
                       created_by, created_at, updated_at";

/// Provides CRUD and pipeline operations for enquiries.
pub struct EnquiryRepo;

impl EnquiryRepo {
    pub async fn create(
        pool: &PgPool,
        created_by: DbId,
        input: &CreateEnquiry,
    ) -> Result<Enquiry, sqlx::Error> {
        let query = format!(
            "INSERT INTO enquiries (applicant_name, email, phone, source, notes, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enquiry>(&query)
            .bind(&input.applicant_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.source)
            .bind(&input.notes)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Enquiry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM enquiries WHERE id = $1");
        sqlx::query_as::<_, Enquiry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_filtered(
        pool: &PgPool,
        stage: Option<&str>,
        status: Option<&str>,
        name_pattern: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Enquiry>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        if stage.is_some() {
            conditions.push(format!("stage = ${param_idx}"));
            param_idx += 1;
        }
        if status.is_some() {
            conditions.push(format!("status = ${param_idx}"));
            param_idx += 1;
        }
        if name_pattern.is_some() {
            conditions.push(format!("applicant_name ILIKE ${param_idx}"));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM enquiries {where_clause} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, Enquiry>(&query);
        if let Some(s) = stage {
            q = q.bind(s);
        }
        if let Some(s) = status {
            q = q.bind(s);
        }
        if let Some(p) = name_pattern {
            q = q.bind(p);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEnquiry,
    ) -> Result<Option<Enquiry>, sqlx::Error> {
        let query = format!(
            "UPDATE enquiries SET \
                applicant_name = COALESCE($2, applicant_name), \
                email = COALESCE($3, email), \
                phone = COALESCE($4, phone), \
                source = COALESCE($5, source), \
                notes = COALESCE($6, notes) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enquiry>(&query)
            .bind(id)
            .bind(&input.applicant_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.source)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM enquiries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Store an assessment, move the enquiry, and create its follow-up
    /// reminder in one transaction.
    ///
    /// `current` is the enquiry the outcome was computed from; returns `None`
    /// when its stage or status changed in the meantime.
    pub async fn submit_assessment(
        pool: &PgPool,
        current: &Enquiry,
        kind: AssessmentKind,
        record: &AssessmentRecord,
        outcome: SubmissionOutcome,
        follow_up: &FollowUp,
    ) -> Result<Option<(Enquiry, Reminder)>, sqlx::Error> {
        let column = match kind {
            AssessmentKind::Initial => "initial_assessment",
            AssessmentKind::Full => "full_assessment",
        };

        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE enquiries SET {column} = $2, stage = $3, status = $4 \
             WHERE id = $1 AND stage = $5 AND status = $6 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Enquiry>(&query)
            .bind(current.id)
            .bind(Json(record))
            .bind(outcome.stage.label())
            .bind(outcome.status.as_str())
            .bind(&current.stage)
            .bind(&current.status)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(enquiry) = updated else {
            tx.rollback().await?;
            return Ok(None);
        };

        let reminder = ReminderRepo::create(
            &mut *tx,
            Some(record.submitted_by),
            &CreateReminder {
                title: follow_up.title.clone(),
                description: Some(follow_up.description.clone()),
                due_at: follow_up.due_at,
                related_entity_type: Some(ENQUIRY_ENTITY_TYPE.to_string()),
                related_entity_id: Some(enquiry.id),
                assigned_to: Some(record.submitted_by),
            },
        )
        .await?;

        tx.commit().await?;
        Ok(Some((enquiry, reminder)))
    }

    /// Move to `to` if the enquiry is still at `from` with status `from_status`.
    pub async fn advance_stage(
        pool: &PgPool,
        id: DbId,
        from: PipelineStage,
        from_status: EnquiryStatus,
        to: PipelineStage,
    ) -> Result<Option<Enquiry>, sqlx::Error> {
        let query = format!(
            "UPDATE enquiries SET stage = $3 \
             WHERE id = $1 AND stage = $2 AND status = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enquiry>(&query)
            .bind(id)
            .bind(from.label())
            .bind(to.label())
            .bind(from_status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Record the closure document and final status if the enquiry is still in `from_status`.
    pub async fn close(
        pool: &PgPool,
        id: DbId,
        from_status: EnquiryStatus,
        closure: &CaseClosure,
    ) -> Result<Option<Enquiry>, sqlx::Error> {
        let query = format!(
            "UPDATE enquiries SET case_closure = $3, status = $4 \
             WHERE id = $1 AND status = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enquiry>(&query)
            .bind(id)
            .bind(from_status.as_str())
            .bind(Json(closure))
            .bind(closure.outcome.status().as_str())
            .fetch_optional(pool)
            .await
    }
}
