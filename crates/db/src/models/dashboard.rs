//! Dashboard summary aggregates.

use serde::Serialize;
use sqlx::FromRow;

/// `(label, count)` pair from a `GROUP BY`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub cases_by_status: Vec<StatusCount>,
    pub enquiries_by_stage: Vec<StatusCount>,
    pub contracts_by_status: Vec<StatusCount>,
    pub pending_reminders: i64,
    pub overdue_reminders: i64,
    pub upcoming_training_events: i64,
    /// Open cases whose review date has passed.
    pub reviews_overdue: i64,
    pub outstanding_invoice_pence: i64,
}
