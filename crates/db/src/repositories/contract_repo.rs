//! Repository for the `contracts` table.
//!
//! Updates take an optional `expected_version`; when given, the row is only
//! written if its `version` still matches, and `None` is returned otherwise.

use fosterdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::contract::{Contract, CreateContract, UpdateContract};

const COLUMNS: &str = "id, template_id, role_type, name, filled_data, status, \
                       recipient_email, generated_doc_url, sent_at, signed_at, version, \
                       created_by, created_at, updated_at";

/// Provides CRUD operations for generated contracts.
pub struct ContractRepo;

impl ContractRepo {
    /// Insert a draft contract and point `generated_doc_url` at its download route.
    pub async fn create(
        pool: &PgPool,
        created_by: DbId,
        role_type: &str,
        input: &CreateContract,
    ) -> Result<Contract, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO contracts \
                (template_id, role_type, name, filled_data, recipient_email, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(input.template_id)
        .bind(role_type)
        .bind(&input.name)
        .bind(serde_json::Value::Object(input.filled_data.clone()))
        .bind(&input.recipient_email)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE contracts SET generated_doc_url = '/api/contracts/' || id || '/document' \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let contract = sqlx::query_as::<_, Contract>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(contract)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Contract>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contracts WHERE id = $1");
        sqlx::query_as::<_, Contract>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List contracts with optional filters, newest first.
    pub async fn list_filtered(
        pool: &PgPool,
        status: Option<&str>,
        template_id: Option<DbId>,
        role_type: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Contract>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        if status.is_some() {
            conditions.push(format!("status = ${param_idx}"));
            param_idx += 1;
        }
        if template_id.is_some() {
            conditions.push(format!("template_id = ${param_idx}"));
            param_idx += 1;
        }
        if role_type.is_some() {
            conditions.push(format!("role_type = ${param_idx}"));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM contracts {where_clause} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, Contract>(&query);
        if let Some(s) = status {
            q = q.bind(s);
        }
        if let Some(t) = template_id {
            q = q.bind(t);
        }
        if let Some(r) = role_type {
            q = q.bind(r);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Apply an edit and bump `version` if the contract is still in `from_status`.
    /// `filled_data` replaces the stored map.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        from_status: &str,
        input: &UpdateContract,
    ) -> Result<Option<Contract>, sqlx::Error> {
        let query = format!(
            "UPDATE contracts SET \
                name = COALESCE($2, name), \
                filled_data = COALESCE($3, filled_data), \
                recipient_email = COALESCE($4, recipient_email), \
                version = version + 1 \
             WHERE id = $1 AND ($5::INTEGER IS NULL OR version = $5) AND status = $6 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.filled_data.clone().map(serde_json::Value::Object))
            .bind(&input.recipient_email)
            .bind(input.expected_version)
            .bind(from_status)
            .fetch_optional(pool)
            .await
    }

    /// Set the status, stamping `sent_at` / `signed_at` on those transitions.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
        expected_version: Option<i32>,
    ) -> Result<Option<Contract>, sqlx::Error> {
        let query = format!(
            "UPDATE contracts SET \
                status = $2, \
                sent_at = CASE WHEN $2 = 'sent' THEN NOW() ELSE sent_at END, \
                signed_at = CASE WHEN $2 = 'signed' THEN NOW() ELSE signed_at END, \
                version = version + 1 \
             WHERE id = $1 AND ($3::INTEGER IS NULL OR version = $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(id)
            .bind(status)
            .bind(expected_version)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contracts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
