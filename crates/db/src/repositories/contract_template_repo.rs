//! Repository for the `contract_templates` table.

use fosterdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::contract_template::{
    ContractTemplate, CreateContractTemplate, UpdateContractTemplate,
};

const COLUMNS: &str = "id, name, role_type, content, created_by, created_at, updated_at";

/// Provides CRUD operations for contract templates.
pub struct ContractTemplateRepo;

impl ContractTemplateRepo {
    pub async fn create(
        pool: &PgPool,
        created_by: DbId,
        input: &CreateContractTemplate,
    ) -> Result<ContractTemplate, sqlx::Error> {
        let query = format!(
            "INSERT INTO contract_templates (name, role_type, content, created_by) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContractTemplate>(&query)
            .bind(&input.name)
            .bind(&input.role_type)
            .bind(&input.content)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ContractTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contract_templates WHERE id = $1");
        sqlx::query_as::<_, ContractTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List templates, optionally filtered by role type and an `ILIKE` name pattern.
    pub async fn list_filtered(
        pool: &PgPool,
        role_type: Option<&str>,
        name_pattern: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ContractTemplate>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        if role_type.is_some() {
            conditions.push(format!("role_type = ${param_idx}"));
            param_idx += 1;
        }
        if name_pattern.is_some() {
            conditions.push(format!("name ILIKE ${param_idx}"));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM contract_templates {where_clause} \
             ORDER BY name \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, ContractTemplate>(&query);
        if let Some(r) = role_type {
            q = q.bind(r);
        }
        if let Some(p) = name_pattern {
            q = q.bind(p);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateContractTemplate,
    ) -> Result<Option<ContractTemplate>, sqlx::Error> {
        let query = format!(
            "UPDATE contract_templates SET \
                name = COALESCE($2, name), \
                role_type = COALESCE($3, role_type), \
                content = COALESCE($4, content) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContractTemplate>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.role_type)
            .bind(&input.content)
            .fetch_optional(pool)
            .await
    }

    /// Delete a template. Contracts generated from it keep their data with
    /// `template_id` set to NULL.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contract_templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
