//! Invoice model and DTOs.

use fosterdesk_core::csv::{opt, CsvRow};
use fosterdesk_core::invoice::InvoiceLine;
use fosterdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `invoices` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invoice {
    pub id: DbId,
    pub invoice_number: String,
    pub freelancer_id: Option<DbId>,
    pub contact_id: Option<DbId>,
    pub lines: Json<Vec<InvoiceLine>>,
    pub total_pence: i64,
    pub status: String,
    pub issued_at: Option<Timestamp>,
    pub due_at: Option<Timestamp>,
    pub paid_at: Option<Timestamp>,
    pub notes: Option<String>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CsvRow for Invoice {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "invoice_number",
        "freelancer_id",
        "contact_id",
        "line_count",
        "total_pence",
        "status",
        "issued_at",
        "due_at",
        "paid_at",
    ];

    fn csv_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.invoice_number.clone(),
            opt(&self.freelancer_id),
            opt(&self.contact_id),
            self.lines.len().to_string(),
            self.total_pence.to_string(),
            self.status.clone(),
            opt(&self.issued_at.map(|t| t.to_rfc3339())),
            opt(&self.due_at.map(|t| t.to_rfc3339())),
            opt(&self.paid_at.map(|t| t.to_rfc3339())),
        ]
    }
}

/// DTO for creating an invoice. `total_pence` is computed from `lines`.
#[derive(Debug, Deserialize)]
pub struct CreateInvoice {
    pub invoice_number: String,
    pub freelancer_id: Option<DbId>,
    pub contact_id: Option<DbId>,
    #[serde(default)]
    pub lines: Vec<InvoiceLine>,
    pub issued_at: Option<Timestamp>,
    pub due_at: Option<Timestamp>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInvoice {
    pub invoice_number: Option<String>,
    pub freelancer_id: Option<DbId>,
    pub contact_id: Option<DbId>,
    pub lines: Option<Vec<InvoiceLine>>,
    pub issued_at: Option<Timestamp>,
    pub due_at: Option<Timestamp>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceStatus {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceListParams {
    pub status: Option<String>,
    pub freelancer_id: Option<DbId>,
    pub contact_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
