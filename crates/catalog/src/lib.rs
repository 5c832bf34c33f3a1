//! Product and category management.
//!
//! Validation lives here; the gateway persists whatever it is given.
//! Stock is deliberately absent from the product patch surface: after
//! creation it only moves through the gateway's atomic conditional
//! stock operation, driven by the order lifecycle.

use std::sync::Arc;

use common::{CategoryId, ProductId};
use domain::{Category, NewProduct, Product, ProductPatch, ValidationError};
use gateway::{Gateway, GatewayError, StockOp};
use thiserror::Error;

/// Errors surfaced by catalog operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No product exists with the given id.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Catalog read and admin write operations.
pub struct CatalogService<G> {
    gateway: Arc<G>,
}

impl<G> Clone for CatalogService<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
        }
    }
}

impl<G: Gateway + 'static> CatalogService<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Lists products, optionally narrowed to one category, newest
    /// first.
    pub async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>, CatalogError> {
        Ok(self.gateway.list_products(category).await?)
    }

    /// Fetches one product by id.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.gateway
            .fetch_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))
    }

    /// Creates a product after validating its name and price.
    #[tracing::instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create_product(&self, new: NewProduct) -> Result<Product, CatalogError> {
        validate_name(&new.name)?;
        if !new.price.is_positive() {
            return Err(ValidationError::InvalidPrice.into());
        }
        let product = self.gateway.insert_product(new).await?;
        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// Applies a partial update; only the supplied fields are
    /// validated and written.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, CatalogError> {
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        if let Some(price) = patch.price
            && !price.is_positive()
        {
            return Err(ValidationError::InvalidPrice.into());
        }
        map_missing(self.gateway.update_product(id, patch).await, id)?;
        self.get_product(id).await
    }

    /// Deletes a product. Order item snapshots keep their copied name
    /// and price, so order history survives the deletion.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), CatalogError> {
        map_missing(self.gateway.delete_product(id).await, id)
    }

    /// Adds units to a product's stock through the atomic stock
    /// operation.
    #[tracing::instrument(skip(self))]
    pub async fn restock(&self, id: ProductId, quantity: u32) -> Result<(), CatalogError> {
        let applied = self
            .gateway
            .adjust_stock(StockOp::Increment, id, quantity)
            .await?;
        if !applied {
            return Err(CatalogError::ProductNotFound(id));
        }
        Ok(())
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        Ok(self.gateway.list_categories().await?)
    }

    /// Creates a category; the name is trimmed and must be non-empty
    /// and unique.
    pub async fn create_category(&self, name: &str) -> Result<Category, CatalogError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(self.gateway.insert_category(name.to_string()).await?)
    }

    pub async fn delete_category(&self, id: CategoryId) -> Result<(), CatalogError> {
        Ok(self.gateway.delete_category(id).await?)
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

fn map_missing(result: Result<(), GatewayError>, id: ProductId) -> Result<(), CatalogError> {
    match result {
        Err(GatewayError::NotFound(_)) => Err(CatalogError::ProductNotFound(id)),
        other => Ok(other?),
    }
}
