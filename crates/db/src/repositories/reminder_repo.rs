//! Repository for the `reminders` table.

use fosterdesk_core::types::{DbId, Timestamp};
use sqlx::{PgExecutor, PgPool};

use crate::models::reminder::{CreateReminder, Reminder};

const COLUMNS: &str = "id, title, description, due_at, related_entity_type, related_entity_id, \
                       status, assigned_to, completed_at, completed_by, created_by, \
                       created_at, updated_at";

/// Provides CRUD operations for reminders.
pub struct ReminderRepo;

impl ReminderRepo {
    /// Insert a pending reminder. Accepts a pool or an open transaction.
    pub async fn create<'e, E>(
        executor: E,
        created_by: Option<DbId>,
        input: &CreateReminder,
    ) -> Result<Reminder, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO reminders \
                (title, description, due_at, related_entity_type, related_entity_id, \
                 assigned_to, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reminder>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.due_at)
            .bind(&input.related_entity_type)
            .bind(input.related_entity_id)
            .bind(input.assigned_to)
            .bind(created_by)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Reminder>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reminders WHERE id = $1");
        sqlx::query_as::<_, Reminder>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List reminders, soonest due first.
    pub async fn list_filtered(
        pool: &PgPool,
        status: Option<&str>,
        related_entity_type: Option<&str>,
        related_entity_id: Option<DbId>,
        due_before: Option<Timestamp>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Reminder>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        if status.is_some() {
            conditions.push(format!("status = ${param_idx}"));
            param_idx += 1;
        }
        if related_entity_type.is_some() {
            conditions.push(format!("related_entity_type = ${param_idx}"));
            param_idx += 1;
        }
        if related_entity_id.is_some() {
            conditions.push(format!("related_entity_id = ${param_idx}"));
            param_idx += 1;
        }
        if due_before.is_some() {
            conditions.push(format!("due_at <= ${param_idx}"));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM reminders {where_clause} \
             ORDER BY due_at ASC, id ASC \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, Reminder>(&query);
        if let Some(s) = status {
            q = q.bind(s);
        }
        if let Some(t) = related_entity_type {
            q = q.bind(t);
        }
        if let Some(i) = related_entity_id {
            q = q.bind(i);
        }
        if let Some(d) = due_before {
            q = q.bind(d);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Mark a pending reminder completed. Returns `None` if it is missing or
    /// already completed.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        completed_by: DbId,
    ) -> Result<Option<Reminder>, sqlx::Error> {
        let query = format!(
            "UPDATE reminders SET status = 'completed', completed_at = NOW(), completed_by = $2 \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reminder>(&query)
            .bind(id)
            .bind(completed_by)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reminders WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
