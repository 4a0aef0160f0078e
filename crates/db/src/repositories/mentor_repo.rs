//! Repository for the `mentors` table.

use fosterdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::mentor::{CreateMentor, Mentor, UpdateMentor};

const COLUMNS: &str = "id, full_name, email, phone, specialism, max_mentees, notes, \
                       is_active, created_at, updated_at";

/// Provides CRUD operations for mentors.
pub struct MentorRepo;

impl MentorRepo {
    pub async fn create(pool: &PgPool, input: &CreateMentor) -> Result<Mentor, sqlx::Error> {
        let query = format!(
            "INSERT INTO mentors (full_name, email, phone, specialism, max_mentees, notes) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 3), $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Mentor>(&query)
            .bind(&input.full_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.specialism)
            .bind(input.max_mentees)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Mentor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM mentors WHERE id = $1");
        sqlx::query_as::<_, Mentor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_filtered(
        pool: &PgPool,
        is_active: Option<bool>,
        search_pattern: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Mentor>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        if is_active.is_some() {
            conditions.push(format!("is_active = ${param_idx}"));
            param_idx += 1;
        }
        if search_pattern.is_some() {
            conditions.push(format!(
                "(full_name ILIKE ${param_idx} OR specialism ILIKE ${param_idx})"
            ));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM mentors {where_clause} \
             ORDER BY full_name, id \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, Mentor>(&query);
        if let Some(a) = is_active {
            q = q.bind(a);
        }
        if let Some(p) = search_pattern {
            q = q.bind(p);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Every mentor, oldest first. Used by CSV export.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Mentor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM mentors ORDER BY id");
        sqlx::query_as::<_, Mentor>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMentor,
    ) -> Result<Option<Mentor>, sqlx::Error> {
        let query = format!(
            "UPDATE mentors SET \
                full_name = COALESCE($2, full_name), \
                email = COALESCE($3, email), \
                phone = COALESCE($4, phone), \
                specialism = COALESCE($5, specialism), \
                max_mentees = COALESCE($6, max_mentees), \
                notes = COALESCE($7, notes), \
                is_active = COALESCE($8, is_active) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Mentor>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.specialism)
            .bind(input.max_mentees)
            .bind(&input.notes)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM mentors WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
