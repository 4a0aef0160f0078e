//! Read-only aggregates for the dashboard summary.

use fosterdesk_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::dashboard::{DashboardSummary, StatusCount};
use crate::repositories::{CaseRepo, TrainingRepo};

/// Provides dashboard aggregation queries.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Gather the headline counts as of `now`. Upcoming training covers the
    /// next 30 days.
    pub async fn summary(pool: &PgPool, now: Timestamp) -> Result<DashboardSummary, sqlx::Error> {
        let cases_by_status = Self::group_count(pool, "cases", "status").await?;
        let enquiries_by_stage = Self::group_count(pool, "enquiries", "stage").await?;
        let contracts_by_status = Self::group_count(pool, "contracts", "status").await?;

        let (pending_reminders, overdue_reminders): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE due_at < $1) \
             FROM reminders WHERE status = 'pending'",
        )
        .bind(now)
        .fetch_one(pool)
        .await?;

        let upcoming_training_events =
            TrainingRepo::count_events_between(pool, now, now + chrono::Duration::days(30)).await?;

        let reviews_overdue = CaseRepo::count_reviews_due(pool, now).await?;

        let (outstanding_invoice_pence,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_pence), 0)::BIGINT FROM invoices \
             WHERE status IN ('sent', 'overdue')",
        )
        .fetch_one(pool)
        .await?;

        Ok(DashboardSummary {
            cases_by_status,
            enquiries_by_stage,
            contracts_by_status,
            pending_reminders,
            overdue_reminders,
            upcoming_training_events,
            reviews_overdue,
            outstanding_invoice_pence,
        })
    }

    /// `SELECT column, COUNT(*) FROM table GROUP BY column`. Both names are
    /// compile-time constants from this module.
    async fn group_count(
        pool: &PgPool,
        table: &'static str,
        column: &'static str,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        let query = format!(
            "SELECT {column} AS status, COUNT(*) AS count FROM {table} \
             GROUP BY {column} ORDER BY {column}"
        );
        sqlx::query_as::<_, StatusCount>(&query).fetch_all(pool).await
    }
}
