//! Catalog products and categories.

use chrono::{DateTime, Utc};
use common::{CategoryId, Money, ProductId};
use serde::{Deserialize, Serialize};

/// A product in the catalog.
///
/// `stock` is the only contended field in the system; it must only be
/// mutated through the gateway's atomic stock operation, never by a
/// direct field overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Unit price in INR.
    pub price: Money,
    /// Free-text category, drawn from the managed category list.
    pub category: String,
    /// Units on hand; never negative.
    pub stock: u32,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a product; the gateway assigns id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category: String,
    pub stock: u32,
    pub image_url: String,
}

/// Partial update for a product. `None` fields are left unchanged.
///
/// Stock is deliberately absent: stock only moves through the atomic
/// adjustment operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// A managed category entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}
