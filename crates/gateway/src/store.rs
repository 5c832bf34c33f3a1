//! The gateway trait: typed CRUD, paged queries, and the atomic stock
//! operation.

use async_trait::async_trait;
use common::{CategoryId, OrderId, ProductId, UserId};
use domain::{
    CartLine, Category, NewOrder, NewProduct, Order, OrderItem, OrderPatch, OrderQuery,
    OrderWithItems, Product, ProductPatch, Session, UserAccount,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Direction of an atomic stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockOp {
    /// Add units back (cancellation, rollback).
    Increment,
    /// Remove units (sale). Conditional: must not drive stock negative.
    Decrement,
}

/// The remote backend surface consumed by the storefront core.
///
/// Implementations are expected to enforce the stock invariant
/// server-side: [`Gateway::adjust_stock`] with [`StockOp::Decrement`]
/// must be a single atomic conditional update that returns `Ok(false)`
/// instead of letting stock go negative. Every other method is plain
/// request/response CRUD.
#[async_trait]
pub trait Gateway: Send + Sync {
    // Products

    /// Fetches one product, or `None` if it does not exist.
    async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Lists products, optionally restricted to one category, newest first.
    async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>>;

    /// Inserts a product and returns the stored record.
    async fn insert_product(&self, new: NewProduct) -> Result<Product>;

    /// Applies a partial update to a product.
    async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<()>;

    /// Deletes a product.
    async fn delete_product(&self, id: ProductId) -> Result<()>;

    /// Atomically adjusts a product's stock by `quantity`.
    ///
    /// Returns `Ok(false)` when a decrement would drive stock negative
    /// (or the product is missing); no change is applied in that case.
    async fn adjust_stock(&self, op: StockOp, id: ProductId, quantity: u32) -> Result<bool>;

    // Categories

    /// Lists all managed categories.
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Inserts a category and returns the stored record.
    async fn insert_category(&self, name: String) -> Result<Category>;

    /// Deletes a category.
    async fn delete_category(&self, id: CategoryId) -> Result<()>;

    // Orders

    /// Inserts an order and returns the stored record.
    async fn insert_order(&self, new: NewOrder) -> Result<Order>;

    /// Fetches one order, or `None` if it does not exist.
    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Deletes an order and its items (checkout compensation).
    async fn delete_order(&self, id: OrderId) -> Result<()>;

    /// Applies a status/cancellation patch to an order.
    async fn update_order(&self, id: OrderId, patch: OrderPatch) -> Result<()>;

    /// Fetches the items of one order.
    async fn fetch_order_items(&self, id: OrderId) -> Result<Vec<OrderItem>>;

    /// Inserts a batch of order items.
    async fn insert_order_items(&self, items: Vec<OrderItem>) -> Result<()>;

    /// Runs a paged order query, returning the page of orders with
    /// embedded items plus the total matching count.
    async fn fetch_orders_page(&self, query: &OrderQuery) -> Result<(Vec<OrderWithItems>, u64)>;

    // Cart rows

    /// Fetches a user's persisted cart lines, in insertion order.
    async fn fetch_cart_lines(&self, user_id: UserId) -> Result<Vec<CartLine>>;

    /// Upserts one cart row to the given quantity.
    async fn upsert_cart_line(&self, user_id: UserId, product_id: ProductId, quantity: u32)
    -> Result<()>;

    /// Deletes one cart row.
    async fn delete_cart_line(&self, user_id: UserId, product_id: ProductId) -> Result<()>;

    /// Deletes all cart rows for a user.
    async fn clear_cart(&self, user_id: UserId) -> Result<()>;

    // Sessions and users

    /// Returns the authenticated session, or `None` when anonymous.
    async fn current_user(&self) -> Result<Option<Session>>;

    /// Lists all registered users (admin directory).
    async fn list_users(&self) -> Result<Vec<UserAccount>>;

    /// Deletes a user account.
    async fn delete_user(&self, id: UserId) -> Result<()>;
}
