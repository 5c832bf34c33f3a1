//! Customer order endpoints: listing, details, cancellation.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use common::OrderId;
use domain::{
    CancelActor, Order, OrderItem, OrderPage, OrderQuery, OrderSortField, OrderStatus,
    SortDirection,
};
use gateway::Gateway;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::{parse_uuid, require_session};

// -- Request types --

/// Listing parameters shared by the customer and admin order lists.
#[derive(Deserialize, Default)]
pub struct OrderListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub status: Option<String>,
    /// Inclusive lower bound on creation time, RFC 3339.
    pub from: Option<String>,
    /// Inclusive upper bound on creation time, RFC 3339.
    pub to: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_paise: i64,
    pub line_total_paise: i64,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub status: String,
    pub total_paise: i64,
    pub total_display: String,
    pub address: String,
    pub city: String,
    pub pincode: String,
    pub mobile: String,
    pub cancel_reason: Option<String>,
    pub cancelled_at: Option<String>,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Serialize)]
pub struct OrderPageResponse {
    pub orders: Vec<OrderResponse>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

pub(crate) fn order_response(order: Order, items: Vec<OrderItem>) -> OrderResponse {
    OrderResponse {
        id: order.id.to_string(),
        status: order.status.to_string(),
        total_paise: order.total_amount.paise(),
        total_display: order.total_amount.to_string(),
        address: order.shipping.address,
        city: order.shipping.city,
        pincode: order.shipping.pincode,
        mobile: order.shipping.mobile,
        cancel_reason: order.cancel_reason,
        cancelled_at: order.cancelled_at.map(|t| t.to_rfc3339()),
        created_at: order.created_at.to_rfc3339(),
        items: items
            .into_iter()
            .map(|item| OrderItemResponse {
                product_id: item.product_id.to_string(),
                product_name: item.product_name.clone(),
                quantity: item.quantity,
                unit_price_paise: item.unit_price.paise(),
                line_total_paise: item.line_total().paise(),
            })
            .collect(),
    }
}

pub(crate) fn page_response(page: OrderPage) -> OrderPageResponse {
    let total_pages = page.total_pages();
    OrderPageResponse {
        orders: page
            .orders
            .into_iter()
            .map(|o| order_response(o.order, o.items))
            .collect(),
        total_count: page.total_count,
        page: page.page,
        page_size: page.page_size,
        total_pages,
    }
}

/// Applies optional listing parameters on top of a default query.
pub(crate) fn apply_params(mut query: OrderQuery, params: &OrderListParams) -> Result<OrderQuery, ApiError> {
    if let Some(page) = params.page {
        query.page = page.max(1);
    }
    if let Some(page_size) = params.page_size {
        query.page_size = page_size.clamp(1, 100);
    }
    if let Some(status) = &params.status {
        query.status = Some(
            status
                .parse::<OrderStatus>()
                .map_err(|_| ApiError::BadRequest(format!("unknown status '{status}'")))?,
        );
    }
    if let Some(from) = &params.from {
        query.from = Some(parse_timestamp(from)?);
    }
    if let Some(to) = &params.to {
        query.to = Some(parse_timestamp(to)?);
    }
    if let Some(sort) = &params.sort {
        query.sort_field = match sort.as_str() {
            "created_at" => OrderSortField::CreatedAt,
            "total_amount" => OrderSortField::TotalAmount,
            "status" => OrderSortField::Status,
            "id" => OrderSortField::Id,
            other => return Err(ApiError::BadRequest(format!("unknown sort field '{other}'"))),
        };
    }
    if let Some(dir) = &params.dir {
        query.sort_direction = match dir.as_str() {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            other => {
                return Err(ApiError::BadRequest(format!(
                    "unknown sort direction '{other}'"
                )));
            }
        };
    }
    Ok(query)
}

fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, ApiError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&chrono::Utc))
        .map_err(|e| ApiError::BadRequest(format!("invalid timestamp '{s}': {e}")))
}

// -- Handlers --

/// GET /orders — the authenticated customer's orders, paginated.
#[tracing::instrument(skip(state, params))]
pub async fn list<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Query(params): Query<OrderListParams>,
) -> Result<Json<OrderPageResponse>, ApiError> {
    let session = require_session(state.as_ref()).await?;
    let query = apply_params(OrderQuery::for_customer(session.user_id), &params)?;
    let page = state.orders.orders(&query).await?;
    Ok(Json(page_response(page)))
}

/// GET /orders/:id — one order with its items; owners and admins only.
#[tracing::instrument(skip(state))]
pub async fn get<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let session = require_session(state.as_ref()).await?;
    let id = OrderId::from_uuid(parse_uuid(&id)?);
    let details = state.orders.order_details(id).await?;
    if details.order.user_id != session.user_id && !session.role.is_admin() {
        // Do not reveal that the order exists.
        return Err(ApiError::NotFound(format!("order {id} not found")));
    }
    Ok(Json(order_response(details.order, details.items)))
}

/// POST /orders/:id/cancel — customer cancellation with stock
/// restoration.
#[tracing::instrument(skip(state, req))]
pub async fn cancel<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<String>,
    Json(req): Json<CancelRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let session = require_session(state.as_ref()).await?;
    let id = OrderId::from_uuid(parse_uuid(&id)?);

    let details = state.orders.order_details(id).await?;
    if details.order.user_id != session.user_id && !session.role.is_admin() {
        return Err(ApiError::NotFound(format!("order {id} not found")));
    }

    let order = state
        .checkout
        .cancel_order(id, req.reason, CancelActor::Customer)
        .await?;
    let items = state.gateway.fetch_order_items(id).await?;
    Ok(Json(order_response(order, items)))
}
