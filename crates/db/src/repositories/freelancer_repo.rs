//! Repository for the `freelancers` table.

use fosterdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::freelancer::{CreateFreelancer, Freelancer, UpdateFreelancer};

const COLUMNS: &str = "id, full_name, email, phone, role, day_rate_pence, skills, notes, \
                       is_active, created_at, updated_at";

/// Provides CRUD operations for freelancers.
pub struct FreelancerRepo;

impl FreelancerRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateFreelancer,
    ) -> Result<Freelancer, sqlx::Error> {
        let query = format!(
            "INSERT INTO freelancers \
                (full_name, email, phone, role, day_rate_pence, skills, notes) \
             VALUES ($1, $2, $3, COALESCE($4, 'freelancer'), $5, COALESCE($6, '{{}}'::TEXT[]), $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Freelancer>(&query)
            .bind(&input.full_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.role)
            .bind(input.day_rate_pence)
            .bind(&input.skills)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Freelancer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM freelancers WHERE id = $1");
        sqlx::query_as::<_, Freelancer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_filtered(
        pool: &PgPool,
        role: Option<&str>,
        is_active: Option<bool>,
        search_pattern: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Freelancer>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        if role.is_some() {
            conditions.push(format!("role = ${param_idx}"));
            param_idx += 1;
        }
        if is_active.is_some() {
            conditions.push(format!("is_active = ${param_idx}"));
            param_idx += 1;
        }
        if search_pattern.is_some() {
            conditions.push(format!(
                "(full_name ILIKE ${param_idx} OR email ILIKE ${param_idx})"
            ));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM freelancers {where_clause} \
             ORDER BY full_name, id \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, Freelancer>(&query);
        if let Some(r) = role {
            q = q.bind(r);
        }
        if let Some(a) = is_active {
            q = q.bind(a);
        }
        if let Some(p) = search_pattern {
            q = q.bind(p);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Every freelancer, oldest first. Used by CSV export.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Freelancer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM freelancers ORDER BY id");
        sqlx::query_as::<_, Freelancer>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFreelancer,
    ) -> Result<Option<Freelancer>, sqlx::Error> {
        let query = format!(
            "UPDATE freelancers SET \
                full_name = COALESCE($2, full_name), \
                email = COALESCE($3, email), \
                phone = COALESCE($4, phone), \
                role = COALESCE($5, role), \
                day_rate_pence = COALESCE($6, day_rate_pence), \
                skills = COALESCE($7, skills), \
                notes = COALESCE($8, notes), \
                is_active = COALESCE($9, is_active) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Freelancer>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.role)
            .bind(input.day_rate_pence)
            .bind(&input.skills)
            .bind(&input.notes)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM freelancers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
