//! Category endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::CategoryId;
use domain::Category;
use gateway::Gateway;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::{parse_uuid, require_admin};

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name,
        }
    }
}

/// GET /categories — list all categories.
pub async fn list<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = state.catalog.list_categories().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// POST /categories — create a category (admin).
#[tracing::instrument(skip(state, req))]
pub async fn create<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(axum::http::StatusCode, Json<CategoryResponse>), ApiError> {
    require_admin(state.as_ref()).await?;
    let category = state.catalog.create_category(&req.name).await?;
    Ok((axum::http::StatusCode::CREATED, Json(category.into())))
}

/// DELETE /categories/:id — remove a category (admin).
#[tracing::instrument(skip(state))]
pub async fn delete<G: Gateway + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, ApiError> {
    require_admin(state.as_ref()).await?;
    let id = CategoryId::from_uuid(parse_uuid(&id)?);
    state.catalog.delete_category(id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
