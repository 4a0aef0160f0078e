//! Role gates layered on [`AuthUser`]. A failed gate is 403, not 401: the
//! caller is known but may not do this.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use fosterdesk_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// User management. Admins only.
pub struct RequireAdmin(pub AuthUser);

/// Any write to CRM records: admins and caseworkers. Viewers are read-only.
pub struct RequireWriter(pub AuthUser);

async fn gated(
    parts: &mut Parts,
    state: &AppState,
    allowed: fn(&AuthUser) -> bool,
    denial: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if allowed(&user) {
        Ok(user)
    } else {
        tracing::debug!(user_id = user.user_id, role = %user.role, "Role gate denied request");
        Err(AppError::Core(CoreError::Forbidden(denial.to_string())))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        gated(parts, state, AuthUser::is_admin, "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

impl FromRequestParts<AppState> for RequireWriter {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        gated(
            parts,
            state,
            AuthUser::can_write,
            "Caseworker or Admin role required",
        )
        .await
        .map(RequireWriter)
    }
}
