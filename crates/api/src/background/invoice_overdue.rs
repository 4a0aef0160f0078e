//! Periodic sweep that flags unpaid invoices past their due date.
//!
//! Any `sent` invoice whose `due_at` has passed moves to `overdue`. Runs on a
//! fixed interval using `tokio::time::interval`; the first tick fires
//! immediately so a restart catches up straight away.

use std::time::Duration;

use chrono::Utc;
use fosterdesk_db::repositories::InvoiceRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Run the overdue sweep every `period` until `cancel` is triggered.
pub async fn run(pool: PgPool, period: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = period.as_secs(), "Invoice overdue sweep started");

    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Invoice overdue sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match InvoiceRepo::mark_overdue(&pool, Utc::now()).await {
                    Ok(0) => tracing::debug!("Invoice overdue sweep: nothing to flag"),
                    Ok(flagged) => {
                        tracing::info!(flagged, "Invoice overdue sweep: invoices marked overdue");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Invoice overdue sweep failed");
                    }
                }
            }
        }
    }
}
