//! Repository for the `cases` and `case_caseworkers` tables.

use fosterdesk_core::case_status::TransitionPlan;
use fosterdesk_core::caseworkers::Assignment;
use fosterdesk_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::case::{Case, CaseCaseworker, CreateCase, UpdateCase};

const COLUMNS: &str = "id, case_reference_number, client_full_name, status, summary, \
                       outcome_notes, opened_at, review_due_at, closed_at, version, \
                       created_by, created_at, updated_at";

const CASEWORKER_COLUMNS: &str = "cc.case_id, cc.user_id, u.username, cc.is_lead";

/// Provides CRUD, status, and assignment operations for cases.
pub struct CaseRepo;

impl CaseRepo {
    /// Insert a case in status `New` together with its initial caseworkers.
    pub async fn create(
        pool: &PgPool,
        created_by: DbId,
        input: &CreateCase,
    ) -> Result<Case, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO cases \
                (case_reference_number, client_full_name, summary, review_due_at, created_by) \
             VALUES ( \
                COALESCE($1, 'CASE-' || lpad(nextval('case_reference_seq')::text, 6, '0')), \
                $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let case = sqlx::query_as::<_, Case>(&query)
            .bind(&input.case_reference_number)
            .bind(&input.client_full_name)
            .bind(&input.summary)
            .bind(input.review_due_at)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        Self::replace_caseworkers_inner(&mut tx, case.id, &input.assigned_caseworkers).await?;

        tx.commit().await?;
        Ok(case)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Case>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cases WHERE id = $1");
        sqlx::query_as::<_, Case>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List cases with optional status, caseworker, and name/reference filters.
    pub async fn list_filtered(
        pool: &PgPool,
        status: Option<&str>,
        caseworker_id: Option<DbId>,
        search_pattern: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Case>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        if status.is_some() {
            conditions.push(format!("status = ${param_idx}"));
            param_idx += 1;
        }
        if caseworker_id.is_some() {
            conditions.push(format!(
                "id IN (SELECT case_id FROM case_caseworkers WHERE user_id = ${param_idx})"
            ));
            param_idx += 1;
        }
        if search_pattern.is_some() {
            conditions.push(format!(
                "(client_full_name ILIKE ${param_idx} OR case_reference_number ILIKE ${param_idx})"
            ));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM cases {where_clause} \
             ORDER BY updated_at DESC, id DESC \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, Case>(&query);
        if let Some(s) = status {
            q = q.bind(s);
        }
        if let Some(c) = caseworker_id {
            q = q.bind(c);
        }
        if let Some(p) = search_pattern {
            q = q.bind(p);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Every case, oldest first. Used by CSV export.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Case>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cases ORDER BY id");
        sqlx::query_as::<_, Case>(&query).fetch_all(pool).await
    }

    /// Edit case details and bump `version`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCase,
    ) -> Result<Option<Case>, sqlx::Error> {
        let query = format!(
            "UPDATE cases SET \
                case_reference_number = COALESCE($2, case_reference_number), \
                client_full_name = COALESCE($3, client_full_name), \
                summary = COALESCE($4, summary), \
                outcome_notes = COALESCE($5, outcome_notes), \
                review_due_at = COALESCE($6, review_due_at), \
                version = version + 1 \
             WHERE id = $1 AND ($7::INTEGER IS NULL OR version = $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Case>(&query)
            .bind(id)
            .bind(&input.case_reference_number)
            .bind(&input.client_full_name)
            .bind(&input.summary)
            .bind(&input.outcome_notes)
            .bind(input.review_due_at)
            .bind(input.expected_version)
            .fetch_optional(pool)
            .await
    }

    /// Persist a validated status transition.
    ///
    /// The row is only written while it is still in `plan.from`, so a
    /// concurrent transition makes this return `None`.
    pub async fn apply_transition(
        pool: &PgPool,
        id: DbId,
        plan: &TransitionPlan,
        outcome_notes: Option<&str>,
        expected_version: Option<i32>,
    ) -> Result<Option<Case>, sqlx::Error> {
        let query = format!(
            "UPDATE cases SET \
                status = $3, \
                opened_at = $4, \
                closed_at = $5, \
                outcome_notes = COALESCE($6, outcome_notes), \
                version = version + 1 \
             WHERE id = $1 AND status = $2 AND ($7::INTEGER IS NULL OR version = $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Case>(&query)
            .bind(id)
            .bind(plan.from.label())
            .bind(plan.to.label())
            .bind(plan.key_dates.opened)
            .bind(plan.key_dates.closed)
            .bind(outcome_notes)
            .bind(expected_version)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cases WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -- caseworkers ---------------------------------------------------------

    pub async fn list_caseworkers(
        pool: &PgPool,
        case_id: DbId,
    ) -> Result<Vec<CaseCaseworker>, sqlx::Error> {
        let query = format!(
            "SELECT {CASEWORKER_COLUMNS} FROM case_caseworkers cc \
             JOIN users u ON u.id = cc.user_id \
             WHERE cc.case_id = $1 \
             ORDER BY cc.is_lead DESC, u.username"
        );
        sqlx::query_as::<_, CaseCaseworker>(&query)
            .bind(case_id)
            .fetch_all(pool)
            .await
    }

    /// Caseworkers for several cases at once, for list responses.
    pub async fn list_caseworkers_for_cases(
        pool: &PgPool,
        case_ids: &[DbId],
    ) -> Result<Vec<CaseCaseworker>, sqlx::Error> {
        let query = format!(
            "SELECT {CASEWORKER_COLUMNS} FROM case_caseworkers cc \
             JOIN users u ON u.id = cc.user_id \
             WHERE cc.case_id = ANY($1) \
             ORDER BY cc.case_id, cc.is_lead DESC, u.username"
        );
        sqlx::query_as::<_, CaseCaseworker>(&query)
            .bind(case_ids)
            .fetch_all(pool)
            .await
    }

    /// Replace the whole assignment list in one transaction.
    pub async fn set_caseworkers(
        pool: &PgPool,
        case_id: DbId,
        assignments: &[Assignment],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::replace_caseworkers_inner(&mut tx, case_id, assignments).await?;
        sqlx::query("UPDATE cases SET version = version + 1 WHERE id = $1")
            .bind(case_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Make `user_id` the sole lead on a case.
    ///
    /// Returns `false` (and changes nothing) when the user is not assigned.
    pub async fn set_lead(pool: &PgPool, case_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE case_caseworkers SET is_lead = false \
             WHERE case_id = $1 AND is_lead AND user_id <> $2",
        )
        .bind(case_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            "UPDATE case_caseworkers SET is_lead = true WHERE case_id = $1 AND user_id = $2",
        )
        .bind(case_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("UPDATE cases SET version = version + 1 WHERE id = $1")
            .bind(case_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn replace_caseworkers_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        case_id: DbId,
        assignments: &[Assignment],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM case_caseworkers WHERE case_id = $1")
            .bind(case_id)
            .execute(&mut **tx)
            .await?;

        for assignment in assignments {
            sqlx::query(
                "INSERT INTO case_caseworkers (case_id, user_id, is_lead) VALUES ($1, $2, $3)",
            )
            .bind(case_id)
            .bind(assignment.user_id)
            .bind(assignment.is_lead)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    /// Cases whose review date falls before `before` and are not closed.
    pub async fn count_reviews_due(pool: &PgPool, before: Timestamp) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM cases \
             WHERE review_due_at < $1 AND closed_at IS NULL",
        )
        .bind(before)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
