//! Reminder model and DTOs.

use fosterdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `reminders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reminder {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub due_at: Timestamp,
    pub related_entity_type: Option<String>,
    pub related_entity_id: Option<DbId>,
    pub status: String,
    pub assigned_to: Option<DbId>,
    pub completed_at: Option<Timestamp>,
    pub completed_by: Option<DbId>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReminder {
    pub title: String,
    pub description: Option<String>,
    pub due_at: Timestamp,
    pub related_entity_type: Option<String>,
    pub related_entity_id: Option<DbId>,
    pub assigned_to: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct ReminderListParams {
    pub status: Option<String>,
    pub related_entity_type: Option<String>,
    pub related_entity_id: Option<DbId>,
    /// Only reminders due at or before this instant.
    pub due_before: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
