//! Repository for `training_events` and `training_participants`.

use fosterdesk_core::training::ParticipantInput;
use fosterdesk_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::training::{
    CreateTrainingEvent, TrainingEvent, TrainingParticipant, UpdateTrainingEvent,
};

/// Event columns plus the live participant count, selected from alias `e`.
const EVENT_COLUMNS: &str = "e.id, e.title, e.description, e.starts_at, e.ends_at, e.location, \
                             e.capacity, \
                             (SELECT COUNT(*) FROM training_participants p \
                              WHERE p.event_id = e.id) AS participant_count, \
                             e.created_by, e.created_at, e.updated_at";

const PARTICIPANT_COLUMNS: &str = "id, event_id, full_name, email, attended, created_at, updated_at";

/// Provides CRUD operations for training events and their participants.
pub struct TrainingRepo;

impl TrainingRepo {
    pub async fn create_event(
        pool: &PgPool,
        created_by: DbId,
        input: &CreateTrainingEvent,
    ) -> Result<TrainingEvent, sqlx::Error> {
        let query = format!(
            "WITH e AS ( \
                INSERT INTO training_events \
                    (title, description, starts_at, ends_at, location, capacity, created_by) \
                VALUES ($1, $2, $3, $4, $5, $6, $7) \
                RETURNING * \
             ) SELECT {EVENT_COLUMNS} FROM e"
        );
        sqlx::query_as::<_, TrainingEvent>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(&input.location)
            .bind(input.capacity)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_event(pool: &PgPool, id: DbId) -> Result<Option<TrainingEvent>, sqlx::Error> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM training_events e WHERE e.id = $1");
        sqlx::query_as::<_, TrainingEvent>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List events by start time, optionally only those starting at or after `from`.
    pub async fn list_events(
        pool: &PgPool,
        from: Option<Timestamp>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TrainingEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM training_events e \
             WHERE ($1::TIMESTAMPTZ IS NULL OR e.starts_at >= $1) \
             ORDER BY e.starts_at, e.id \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, TrainingEvent>(&query)
            .bind(from)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn update_event(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTrainingEvent,
    ) -> Result<Option<TrainingEvent>, sqlx::Error> {
        let query = format!(
            "WITH e AS ( \
                UPDATE training_events SET \
                    title = COALESCE($2, title), \
                    description = COALESCE($3, description), \
                    starts_at = COALESCE($4, starts_at), \
                    ends_at = COALESCE($5, ends_at), \
                    location = COALESCE($6, location), \
                    capacity = COALESCE($7, capacity) \
                WHERE id = $1 \
                RETURNING * \
             ) SELECT {EVENT_COLUMNS} FROM e"
        );
        sqlx::query_as::<_, TrainingEvent>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(&input.location)
            .bind(input.capacity)
            .fetch_optional(pool)
            .await
    }

    /// Delete an event and (by cascade) its participants.
    pub async fn delete_event(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM training_events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count events starting in `[from, to)`.
    pub async fn count_events_between(
        pool: &PgPool,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM training_events WHERE starts_at >= $1 AND starts_at < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    // -- participants --------------------------------------------------------

    pub async fn list_participants(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<TrainingParticipant>, sqlx::Error> {
        let query = format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM training_participants \
             WHERE event_id = $1 ORDER BY full_name, id"
        );
        sqlx::query_as::<_, TrainingParticipant>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// Add a participant if the event still has room.
    ///
    /// Returns `None` when the event is at capacity or does not exist. The
    /// event row is locked for the check so concurrent imports cannot
    /// overshoot the capacity. The email is stored lower-cased; a duplicate
    /// email on the same event is a unique violation.
    pub async fn add_participant(
        pool: &PgPool,
        event_id: DbId,
        input: &ParticipantInput,
    ) -> Result<Option<TrainingParticipant>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let capacity: Option<(Option<i32>,)> =
            sqlx::query_as("SELECT capacity FROM training_events WHERE id = $1 FOR UPDATE")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((capacity,)) = capacity else {
            return Ok(None);
        };

        if let Some(capacity) = capacity {
            let (taken,): (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM training_participants WHERE event_id = $1")
                    .bind(event_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if taken >= i64::from(capacity) {
                return Ok(None);
            }
        }

        let query = format!(
            "INSERT INTO training_participants (event_id, full_name, email, attended) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {PARTICIPANT_COLUMNS}"
        );
        let participant = sqlx::query_as::<_, TrainingParticipant>(&query)
            .bind(event_id)
            .bind(input.full_name.trim())
            .bind(input.normalized_email())
            .bind(input.attended)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(participant))
    }

    pub async fn delete_participant(
        pool: &PgPool,
        event_id: DbId,
        participant_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM training_participants WHERE id = $1 AND event_id = $2")
                .bind(participant_id)
                .bind(event_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
