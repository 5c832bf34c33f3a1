//! Admin back-office endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use common::{OrderId, UserId};
use domain::{OrderQuery, OrderStatus, UserAccount};
use gateway::Gateway;
use query::SalesReport;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::orders::{OrderListParams, OrderPageResponse, OrderResponse, apply_params, order_response, page_response};
use crate::routes::{parse_uuid, require_admin};

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: String,
}

impl From<UserAccount> for UserResponse {
    fn from(user: UserAccount) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            name: user.name,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// GET /admin/orders — every order, paginated and filterable.
#[tracing::instrument(skip(state, params))]
pub async fn list_orders<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Query(params): Query<OrderListParams>,
) -> Result<Json<OrderPageResponse>, ApiError> {
    require_admin(state.as_ref()).await?;
    let query = apply_params(OrderQuery::all_orders(), &params)?;
    let page = state.orders.orders(&query).await?;
    Ok(Json(page_response(page)))
}

/// PUT /admin/orders/:id/status — status transition with stock side
/// effects.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    require_admin(state.as_ref()).await?;
    let id = OrderId::from_uuid(parse_uuid(&id)?);
    let status = req
        .status
        .parse::<OrderStatus>()
        .map_err(|_| ApiError::BadRequest(format!("unknown status '{}'", req.status)))?;

    let order = state.checkout.update_order_status(id, status).await?;
    let items = state.gateway.fetch_order_items(id).await?;
    Ok(Json(order_response(order, items)))
}

/// GET /admin/sales-report — aggregates over delivered orders.
#[tracing::instrument(skip(state))]
pub async fn sales_report<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
) -> Result<Json<SalesReport>, ApiError> {
    require_admin(state.as_ref()).await?;
    let report = state.orders.sales_report().await?;
    Ok(Json(report))
}

/// GET /admin/users — list customer accounts.
#[tracing::instrument(skip(state))]
pub async fn list_users<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    require_admin(state.as_ref()).await?;
    let users = state.gateway.list_users().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// DELETE /admin/users/:id — remove a customer account.
#[tracing::instrument(skip(state))]
pub async fn delete_user<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, ApiError> {
    require_admin(state.as_ref()).await?;
    let id = UserId::from_uuid(parse_uuid(&id)?);
    state.gateway.delete_user(id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
