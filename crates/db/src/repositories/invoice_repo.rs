//! Repository for the `invoices` table.

use fosterdesk_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::invoice::{CreateInvoice, Invoice, UpdateInvoice};

const COLUMNS: &str = "id, invoice_number, freelancer_id, contact_id, lines, total_pence, \
                       status, issued_at, due_at, paid_at, notes, created_by, \
                       created_at, updated_at";

/// Provides CRUD operations for invoices.
pub struct InvoiceRepo;

impl InvoiceRepo {
    /// Insert a draft invoice. `total_pence` must come from
    /// `fosterdesk_core::invoice::compute_total` over `input.lines`.
    pub async fn create(
        pool: &PgPool,
        created_by: DbId,
        input: &CreateInvoice,
        total_pence: i64,
    ) -> Result<Invoice, sqlx::Error> {
        let query = format!(
            "INSERT INTO invoices \
                (invoice_number, freelancer_id, contact_id, lines, total_pence, \
                 issued_at, due_at, notes, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(&input.invoice_number)
            .bind(input.freelancer_id)
            .bind(input.contact_id)
            .bind(Json(&input.lines))
            .bind(total_pence)
            .bind(input.issued_at)
            .bind(input.due_at)
            .bind(&input.notes)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invoices WHERE id = $1");
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_filtered(
        pool: &PgPool,
        status: Option<&str>,
        freelancer_id: Option<DbId>,
        contact_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Invoice>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        if status.is_some() {
            conditions.push(format!("status = ${param_idx}"));
            param_idx += 1;
        }
        if freelancer_id.is_some() {
            conditions.push(format!("freelancer_id = ${param_idx}"));
            param_idx += 1;
        }
        if contact_id.is_some() {
            conditions.push(format!("contact_id = ${param_idx}"));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM invoices {where_clause} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, Invoice>(&query);
        if let Some(s) = status {
            q = q.bind(s);
        }
        if let Some(f) = freelancer_id {
            q = q.bind(f);
        }
        if let Some(c) = contact_id {
            q = q.bind(c);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Every invoice, oldest first. Used by CSV export.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Invoice>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invoices ORDER BY id");
        sqlx::query_as::<_, Invoice>(&query).fetch_all(pool).await
    }

    /// Apply an edit if the invoice is still in `from_status`. When `lines` is
    /// given, `total_pence` must be its computed total.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        from_status: &str,
        input: &UpdateInvoice,
        total_pence: Option<i64>,
    ) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!(
            "UPDATE invoices SET \
                invoice_number = COALESCE($2, invoice_number), \
                freelancer_id = COALESCE($3, freelancer_id), \
                contact_id = COALESCE($4, contact_id), \
                lines = COALESCE($5, lines), \
                total_pence = COALESCE($6, total_pence), \
                issued_at = COALESCE($7, issued_at), \
                due_at = COALESCE($8, due_at), \
                notes = COALESCE($9, notes) \
             WHERE id = $1 AND status = $10 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(&input.invoice_number)
            .bind(input.freelancer_id)
            .bind(input.contact_id)
            .bind(input.lines.as_ref().map(Json))
            .bind(total_pence)
            .bind(input.issued_at)
            .bind(input.due_at)
            .bind(&input.notes)
            .bind(from_status)
            .fetch_optional(pool)
            .await
    }

    /// Set the status if it is still `from`. Sending stamps `issued_at`
    /// when empty; paying stamps `paid_at`.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        from: &str,
        to: &str,
    ) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!(
            "UPDATE invoices SET \
                status = $3, \
                issued_at = CASE WHEN $3 = 'sent' THEN COALESCE(issued_at, NOW()) ELSE issued_at END, \
                paid_at = CASE WHEN $3 = 'paid' THEN NOW() ELSE paid_at END \
             WHERE id = $1 AND status = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(pool)
            .await
    }

    /// Move every `sent` invoice whose due date is before `now` to `overdue`.
    pub async fn mark_overdue(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE invoices SET status = 'overdue' \
             WHERE status = 'sent' AND due_at IS NOT NULL AND due_at < $1",
        )
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
