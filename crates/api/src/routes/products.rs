//! Catalog browsing and admin product management endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use common::{Money, ProductId};
use domain::{NewProduct, Product, ProductPatch};
use gateway::Gateway;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::{parse_uuid, require_admin};

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_paise: i64,
    pub category: String,
    pub stock: u32,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Deserialize, Default)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_paise: Option<i64>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Deserialize)]
pub struct RestockRequest {
    pub quantity: u32,
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price_paise: i64,
    pub price_display: String,
    pub category: String,
    pub stock: u32,
    pub image_url: String,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name,
            description: product.description,
            price_paise: product.price.paise(),
            price_display: product.price.to_string(),
            category: product.category,
            stock: product.stock,
            image_url: product.image_url,
        }
    }
}

// -- Handlers --

/// GET /products — list products, optionally filtered by category.
#[tracing::instrument(skip(state))]
pub async fn list<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state
        .catalog
        .list_products(params.category.as_deref())
        .await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// GET /products/:id — fetch one product.
#[tracing::instrument(skip(state))]
pub async fn get<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let id = ProductId::from_uuid(parse_uuid(&id)?);
    let product = state.catalog.get_product(id).await?;
    Ok(Json(product.into()))
}

/// POST /products — create a product (admin).
#[tracing::instrument(skip(state, req))]
pub async fn create<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(axum::http::StatusCode, Json<ProductResponse>), ApiError> {
    require_admin(state.as_ref()).await?;
    let product = state
        .catalog
        .create_product(NewProduct {
            name: req.name,
            description: req.description,
            price: Money::from_paise(req.price_paise),
            category: req.category,
            stock: req.stock,
            image_url: req.image_url,
        })
        .await?;
    Ok((axum::http::StatusCode::CREATED, Json(product.into())))
}

/// PATCH /products/:id — partial product update (admin).
#[tracing::instrument(skip(state, req))]
pub async fn update<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    require_admin(state.as_ref()).await?;
    let id = ProductId::from_uuid(parse_uuid(&id)?);
    let patch = ProductPatch {
        name: req.name,
        description: req.description,
        price: req.price_paise.map(Money::from_paise),
        category: req.category,
        image_url: req.image_url,
    };
    let product = state.catalog.update_product(id, patch).await?;
    Ok(Json(product.into()))
}

/// DELETE /products/:id — remove a product (admin).
#[tracing::instrument(skip(state))]
pub async fn delete<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, ApiError> {
    require_admin(state.as_ref()).await?;
    let id = ProductId::from_uuid(parse_uuid(&id)?);
    state.catalog.delete_product(id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// POST /products/:id/restock — add stock units (admin).
#[tracing::instrument(skip(state, req))]
pub async fn restock<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<String>,
    Json(req): Json<RestockRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    require_admin(state.as_ref()).await?;
    let id = ProductId::from_uuid(parse_uuid(&id)?);
    state.catalog.restock(id, req.quantity).await?;
    let product = state.catalog.get_product(id).await?;
    Ok(Json(product.into()))
}
