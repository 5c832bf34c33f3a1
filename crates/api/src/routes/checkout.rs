//! Checkout endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use domain::ShippingInfo;
use gateway::Gateway;
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;
use crate::routes::orders::{OrderResponse, order_response};
use crate::routes::require_session;

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub address: String,
    pub city: String,
    pub pincode: String,
    pub mobile: String,
}

/// POST /checkout — place an order from the current cart.
#[tracing::instrument(skip(state, req))]
pub async fn place_order<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Json(req): Json<CheckoutRequest>,
) -> Result<(axum::http::StatusCode, Json<OrderResponse>), ApiError> {
    let session = require_session(state.as_ref()).await?;
    let shipping = ShippingInfo::new(&req.address, &req.city, &req.pincode, &req.mobile);

    let order = state
        .checkout
        .place_order(&state.cart, session.user_id, &shipping)
        .await?;
    let items = state.gateway.fetch_order_items(order.id).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(order_response(order, items)),
    ))
}
