//! Repository for the `contacts` table.

use fosterdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::contact::{Contact, CreateContact, UpdateContact};

const COLUMNS: &str = "id, full_name, organisation, email, phone, contact_type, notes, \
                       created_at, updated_at";

/// Provides CRUD operations for external contacts.
pub struct ContactRepo;

impl ContactRepo {
    pub async fn create(pool: &PgPool, input: &CreateContact) -> Result<Contact, sqlx::Error> {
        let query = format!(
            "INSERT INTO contacts (full_name, organisation, email, phone, contact_type, notes) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 'other'), $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(&input.full_name)
            .bind(&input.organisation)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.contact_type)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Contact>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contacts WHERE id = $1");
        sqlx::query_as::<_, Contact>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_filtered(
        pool: &PgPool,
        contact_type: Option<&str>,
        search_pattern: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Contact>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        if contact_type.is_some() {
            conditions.push(format!("contact_type = ${param_idx}"));
            param_idx += 1;
        }
        if search_pattern.is_some() {
            conditions.push(format!(
                "(full_name ILIKE ${param_idx} OR organisation ILIKE ${param_idx})"
            ));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM contacts {where_clause} \
             ORDER BY full_name, id \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, Contact>(&query);
        if let Some(t) = contact_type {
            q = q.bind(t);
        }
        if let Some(p) = search_pattern {
            q = q.bind(p);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Every contact, oldest first. Used by CSV export.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Contact>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contacts ORDER BY id");
        sqlx::query_as::<_, Contact>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateContact,
    ) -> Result<Option<Contact>, sqlx::Error> {
        let query = format!(
            "UPDATE contacts SET \
                full_name = COALESCE($2, full_name), \
                organisation = COALESCE($3, organisation), \
                email = COALESCE($4, email), \
                phone = COALESCE($5, phone), \
                contact_type = COALESCE($6, contact_type), \
                notes = COALESCE($7, notes) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.organisation)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.contact_type)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
