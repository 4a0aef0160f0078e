//! Training event and participant models.

use fosterdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `training_events` table, with its participant count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrainingEvent {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: Timestamp,
    pub ends_at: Option<Timestamp>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
    pub participant_count: i64,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateTrainingEvent {
    pub title: String,
    pub description: Option<String>,
    pub starts_at: Timestamp,
    pub ends_at: Option<Timestamp>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTrainingEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct TrainingEventListParams {
    /// Only events starting at or after this instant.
    pub from: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A row from the `training_participants` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrainingParticipant {
    pub id: DbId,
    pub event_id: DbId,
    pub full_name: String,
    pub email: String,
    pub attended: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
