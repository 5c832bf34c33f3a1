//! Route handlers, one module per resource.

pub mod admin;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;

use domain::Session;
use gateway::Gateway;

use crate::AppState;
use crate::error::ApiError;

/// Parses a path segment as a UUID or rejects with 400.
pub(crate) fn parse_uuid(id: &str) -> Result<uuid::Uuid, ApiError> {
    uuid::Uuid::parse_str(id).map_err(|e| ApiError::BadRequest(format!("invalid id format: {e}")))
}

/// Resolves the authenticated session or rejects with 401.
pub(crate) async fn require_session<G: Gateway>(
    state: &AppState<G>,
) -> Result<Session, ApiError> {
    state
        .gateway
        .current_user()
        .await?
        .ok_or(ApiError::Unauthorized)
}

/// Resolves the session and requires the admin role.
pub(crate) async fn require_admin<G: Gateway>(state: &AppState<G>) -> Result<Session, ApiError> {
    let session = require_session(state).await?;
    if !session.role.is_admin() {
        return Err(ApiError::Forbidden);
    }
    Ok(session)
}
