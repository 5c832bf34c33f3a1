//! Cart endpoints.
//!
//! The cart itself lives in process; for authenticated sessions every
//! mutation is mirrored to the gateway in the background.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::ProductId;
use domain::CartLine;
use gateway::Gateway;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::parse_uuid;

// -- Request types --

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartLineResponse {
    pub product_id: String,
    pub product_name: String,
    pub unit_price_paise: i64,
    pub quantity: u32,
    pub line_total_paise: i64,
}

#[derive(Serialize)]
pub struct CartResponse {
    pub lines: Vec<CartLineResponse>,
    pub total_paise: i64,
    pub total_display: String,
    pub item_count: u32,
}

fn cart_response<G: Gateway + 'static>(state: &AppState<G>) -> CartResponse {
    let lines: Vec<CartLineResponse> = state
        .cart
        .lines()
        .iter()
        .map(|line: &CartLine| CartLineResponse {
            product_id: line.product.id.to_string(),
            product_name: line.product.name.clone(),
            unit_price_paise: line.product.price.paise(),
            quantity: line.quantity,
            line_total_paise: line.line_total().paise(),
        })
        .collect();
    let total = state.cart.total();
    CartResponse {
        lines,
        total_paise: total.paise(),
        total_display: total.to_string(),
        item_count: state.cart.count(),
    }
}

// -- Handlers --

/// GET /cart — current cart contents and total.
pub async fn view<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
) -> Result<Json<CartResponse>, ApiError> {
    Ok(Json(cart_response(state.as_ref())))
}

/// POST /cart/items — add a quantity of a product, merging lines.
#[tracing::instrument(skip(state, req))]
pub async fn add_item<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let id = ProductId::from_uuid(parse_uuid(&req.product_id)?);
    let product = state.catalog.get_product(id).await?;
    state.cart.add_line(product, req.quantity).await;
    Ok(Json(cart_response(state.as_ref())))
}

/// PUT /cart/items/:id — set a line's quantity.
#[tracing::instrument(skip(state, req))]
pub async fn update_item<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let id = ProductId::from_uuid(parse_uuid(&id)?);
    state.cart.update_quantity(id, req.quantity).await;
    Ok(Json(cart_response(state.as_ref())))
}

/// DELETE /cart/items/:id — remove a line.
#[tracing::instrument(skip(state))]
pub async fn remove_item<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let id = ProductId::from_uuid(parse_uuid(&id)?);
    state.cart.remove_line(id).await;
    Ok(Json(cart_response(state.as_ref())))
}

/// DELETE /cart — empty the cart.
#[tracing::instrument(skip(state))]
pub async fn clear<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
) -> Result<Json<CartResponse>, ApiError> {
    state.cart.clear().await;
    Ok(Json(cart_response(state.as_ref())))
}
