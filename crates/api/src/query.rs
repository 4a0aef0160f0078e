//! Shared query parameter helpers for API handlers.

use fosterdesk_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use serde::Deserialize;

/// `?type=` filter used by the placeholder catalogue.
#[derive(Debug, Deserialize)]
pub struct TypeParams {
    #[serde(rename = "type")]
    pub role_type: Option<String>,
}

/// Clamp `?limit=&offset=` to the list bounds, returning `(limit, offset)`.
pub fn page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        clamp_limit(limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT),
        clamp_offset(offset),
    )
}
