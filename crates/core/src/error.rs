use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a stale-write conflict on a versioned row.
    pub fn stale_version(entity: &str, expected: i32, actual: i32) -> Self {
        CoreError::Conflict(format!(
            "{entity} was modified by someone else (expected version {expected}, found {actual})"
        ))
    }
}
