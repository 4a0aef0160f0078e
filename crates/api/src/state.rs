use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    pub pool: fosterdesk_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Handlers publish domain events here after their write commits.
    pub event_bus: Arc<fosterdesk_events::EventBus>,
}
