//! Liveness endpoint for the storefront server.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use gateway::Gateway;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub gateway: &'static str,
}

/// GET /health — liveness plus a cheap probe of the remote gateway.
pub async fn check<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
) -> (StatusCode, Json<HealthResponse>) {
    match state.gateway.list_categories().await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                service: "spice-heaven-api",
                gateway: "reachable",
            }),
        ),
        Err(error) => {
            tracing::warn!(%error, "gateway health probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    service: "spice-heaven-api",
                    gateway: "unreachable",
                }),
            )
        }
    }
}
