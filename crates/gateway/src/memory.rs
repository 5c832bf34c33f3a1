//! In-memory gateway used by tests and the demo binary.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CategoryId, OrderId, ProductId, UserId};
use domain::{
    CartLine, Category, NewOrder, NewProduct, Order, OrderItem, OrderPatch, OrderQuery, OrderScope,
    OrderSortField, OrderWithItems, Product, ProductPatch, Session, SortDirection, UserAccount,
};

use crate::error::{GatewayError, Result};
use crate::store::{Gateway, StockOp};

#[derive(Debug, Default)]
struct MemoryState {
    products: Vec<Product>,
    categories: Vec<Category>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
    cart_rows: HashMap<UserId, Vec<(ProductId, u32)>>,
    users: Vec<UserAccount>,
    session: Option<Session>,

    fail_insert_order: bool,
    fail_insert_order_items: bool,
    fail_update_order: bool,
    fail_cart_writes: bool,
    decrement_failures: HashSet<ProductId>,
    increment_failures: HashSet<ProductId>,
}

/// In-memory [`Gateway`] implementation.
///
/// Backs the test suites and the demo binary. Failure knobs let tests
/// force individual remote operations to fail, including per-product
/// stock-adjustment failures for partial fan-out scenarios.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryGateway {
    /// Creates an empty in-memory gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the authenticated session returned by `current_user`.
    pub fn set_session(&self, session: Option<Session>) {
        self.state.write().unwrap().session = session;
    }

    /// Registers a user account in the directory.
    pub fn add_user(&self, user: UserAccount) {
        self.state.write().unwrap().users.push(user);
    }

    /// Forces the next order inserts to fail.
    pub fn set_fail_insert_order(&self, fail: bool) {
        self.state.write().unwrap().fail_insert_order = fail;
    }

    /// Forces order-item inserts to fail.
    pub fn set_fail_insert_order_items(&self, fail: bool) {
        self.state.write().unwrap().fail_insert_order_items = fail;
    }

    /// Forces order patches to fail.
    pub fn set_fail_update_order(&self, fail: bool) {
        self.state.write().unwrap().fail_update_order = fail;
    }

    /// Forces cart-row writes to fail (mirror-failure tests).
    pub fn set_fail_cart_writes(&self, fail: bool) {
        self.state.write().unwrap().fail_cart_writes = fail;
    }

    /// Makes decrements of the given product report non-success.
    pub fn set_decrement_failure(&self, id: ProductId) {
        self.state.write().unwrap().decrement_failures.insert(id);
    }

    /// Makes increments of the given product report non-success.
    pub fn set_increment_failure(&self, id: ProductId) {
        self.state.write().unwrap().increment_failures.insert(id);
    }

    /// Clears all per-product stock failure knobs.
    pub fn clear_stock_failures(&self) {
        let mut state = self.state.write().unwrap();
        state.decrement_failures.clear();
        state.increment_failures.clear();
    }

    /// Pins an order's creation timestamp (date-filter tests).
    pub fn set_order_created_at(&self, id: OrderId, at: DateTime<Utc>) {
        let mut state = self.state.write().unwrap();
        if let Some(order) = state.orders.iter_mut().find(|o| o.id == id) {
            order.created_at = at;
        }
    }

    /// Current stock of a product, if it exists.
    pub fn product_stock(&self, id: ProductId) -> Option<u32> {
        self.state
            .read()
            .unwrap()
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.stock)
    }

    /// Number of persisted orders.
    pub fn order_count(&self) -> usize {
        self.state.read().unwrap().orders.len()
    }

    /// Returns true if an order row exists with the given id.
    pub fn has_order(&self, id: OrderId) -> bool {
        self.state.read().unwrap().orders.iter().any(|o| o.id == id)
    }

    /// Number of persisted cart rows for a user.
    pub fn cart_row_count(&self, user_id: UserId) -> usize {
        self.state
            .read()
            .unwrap()
            .cart_rows
            .get(&user_id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Persisted quantity of one cart row, if present.
    pub fn cart_row(&self, user_id: UserId, product_id: ProductId) -> Option<u32> {
        self.state
            .read()
            .unwrap()
            .cart_rows
            .get(&user_id)
            .and_then(|rows| rows.iter().find(|(p, _)| *p == product_id))
            .map(|(_, q)| *q)
    }
}

fn items_for(state: &MemoryState, order_id: OrderId) -> Vec<OrderItem> {
    state
        .order_items
        .iter()
        .filter(|i| i.order_id == order_id)
        .cloned()
        .collect()
}

fn matches_query(order: &Order, query: &OrderQuery) -> bool {
    if let OrderScope::Customer(user_id) = query.scope
        && order.user_id != user_id
    {
        return false;
    }
    if let Some(status) = query.status
        && order.status != status
    {
        return false;
    }
    if let Some(from) = query.from
        && order.created_at < from
    {
        return false;
    }
    if let Some(to) = query.to
        && order.created_at > to
    {
        return false;
    }
    true
}

fn sort_orders(orders: &mut [Order], query: &OrderQuery) {
    orders.sort_by(|a, b| {
        let ordering = match query.sort_field {
            OrderSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            OrderSortField::TotalAmount => a.total_amount.paise().cmp(&b.total_amount.paise()),
            OrderSortField::Status => a.status.sort_rank().cmp(&b.status.sort_rank()),
            OrderSortField::Id => a.id.as_uuid().cmp(&b.id.as_uuid()),
        };
        match query.sort_direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

#[async_trait]
impl Gateway for InMemoryGateway {
    async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>> {
        let state = self.state.read().unwrap();
        Ok(state.products.iter().find(|p| p.id == id).cloned())
    }

    async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>> {
        let state = self.state.read().unwrap();
        Ok(state
            .products
            .iter()
            .rev()
            .filter(|p| category.is_none_or(|c| p.category == c))
            .cloned()
            .collect())
    }

    async fn insert_product(&self, new: NewProduct) -> Result<Product> {
        let product = Product {
            id: ProductId::new(),
            name: new.name,
            description: new.description,
            price: new.price,
            category: new.category,
            stock: new.stock,
            image_url: new.image_url,
            created_at: Utc::now(),
        };
        self.state.write().unwrap().products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<()> {
        let mut state = self.state.write().unwrap();
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| GatewayError::NotFound(format!("product {id}")))?;
        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(description) = patch.description {
            product.description = description;
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(category) = patch.category {
            product.category = category;
        }
        if let Some(image_url) = patch.image_url {
            product.image_url = image_url;
        }
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        let mut state = self.state.write().unwrap();
        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        if state.products.len() == before {
            return Err(GatewayError::NotFound(format!("product {id}")));
        }
        Ok(())
    }

    async fn adjust_stock(&self, op: StockOp, id: ProductId, quantity: u32) -> Result<bool> {
        let mut state = self.state.write().unwrap();
        match op {
            StockOp::Decrement if state.decrement_failures.contains(&id) => return Ok(false),
            StockOp::Increment if state.increment_failures.contains(&id) => return Ok(false),
            _ => {}
        }
        let Some(product) = state.products.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        match op {
            StockOp::Increment => {
                product.stock += quantity;
                Ok(true)
            }
            StockOp::Decrement => {
                // Conditional update: refuse rather than go negative.
                if product.stock < quantity {
                    return Ok(false);
                }
                product.stock -= quantity;
                Ok(true)
            }
        }
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.state.read().unwrap().categories.clone())
    }

    async fn insert_category(&self, name: String) -> Result<Category> {
        let mut state = self.state.write().unwrap();
        if state.categories.iter().any(|c| c.name == name) {
            return Err(GatewayError::Conflict(format!(
                "category '{name}' already exists"
            )));
        }
        let category = Category {
            id: CategoryId::new(),
            name,
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn delete_category(&self, id: CategoryId) -> Result<()> {
        let mut state = self.state.write().unwrap();
        let before = state.categories.len();
        state.categories.retain(|c| c.id != id);
        if state.categories.len() == before {
            return Err(GatewayError::NotFound(format!("category {id}")));
        }
        Ok(())
    }

    async fn insert_order(&self, new: NewOrder) -> Result<Order> {
        let mut state = self.state.write().unwrap();
        if state.fail_insert_order {
            return Err(GatewayError::Unavailable("order insert failed".to_string()));
        }
        let order = Order {
            id: OrderId::new(),
            user_id: new.user_id,
            status: new.status,
            total_amount: new.total_amount,
            shipping: new.shipping,
            cancel_reason: None,
            cancelled_at: None,
            created_at: Utc::now(),
        };
        state.orders.push(order.clone());
        Ok(order)
    }

    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>> {
        let state = self.state.read().unwrap();
        Ok(state.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn delete_order(&self, id: OrderId) -> Result<()> {
        let mut state = self.state.write().unwrap();
        state.orders.retain(|o| o.id != id);
        state.order_items.retain(|i| i.order_id != id);
        Ok(())
    }

    async fn update_order(&self, id: OrderId, patch: OrderPatch) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail_update_order {
            return Err(GatewayError::Unavailable("order update failed".to_string()));
        }
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| GatewayError::NotFound(format!("order {id}")))?;
        order.status = patch.status;
        order.cancel_reason = patch.cancel_reason;
        order.cancelled_at = patch.cancelled_at;
        Ok(())
    }

    async fn fetch_order_items(&self, id: OrderId) -> Result<Vec<OrderItem>> {
        let state = self.state.read().unwrap();
        Ok(items_for(&state, id))
    }

    async fn insert_order_items(&self, items: Vec<OrderItem>) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail_insert_order_items {
            return Err(GatewayError::Unavailable(
                "order items insert failed".to_string(),
            ));
        }
        state.order_items.extend(items);
        Ok(())
    }

    async fn fetch_orders_page(&self, query: &OrderQuery) -> Result<(Vec<OrderWithItems>, u64)> {
        let state = self.state.read().unwrap();
        let mut matching: Vec<Order> = state
            .orders
            .iter()
            .filter(|o| matches_query(o, query))
            .cloned()
            .collect();
        let total = matching.len() as u64;

        sort_orders(&mut matching, query);

        let page: Vec<OrderWithItems> = matching
            .into_iter()
            .skip(query.offset())
            .take(query.page_size as usize)
            .map(|order| {
                let items = items_for(&state, order.id);
                OrderWithItems { order, items }
            })
            .collect();

        Ok((page, total))
    }

    async fn fetch_cart_lines(&self, user_id: UserId) -> Result<Vec<CartLine>> {
        let state = self.state.read().unwrap();
        let Some(rows) = state.cart_rows.get(&user_id) else {
            return Ok(Vec::new());
        };
        Ok(rows
            .iter()
            .filter_map(|(product_id, quantity)| {
                state
                    .products
                    .iter()
                    .find(|p| p.id == *product_id)
                    .map(|p| CartLine::new(p.clone(), *quantity))
            })
            .collect())
    }

    async fn upsert_cart_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail_cart_writes {
            return Err(GatewayError::Unavailable("cart write failed".to_string()));
        }
        let rows = state.cart_rows.entry(user_id).or_default();
        match rows.iter_mut().find(|(p, _)| *p == product_id) {
            Some((_, q)) => *q = quantity,
            None => rows.push((product_id, quantity)),
        }
        Ok(())
    }

    async fn delete_cart_line(&self, user_id: UserId, product_id: ProductId) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail_cart_writes {
            return Err(GatewayError::Unavailable("cart write failed".to_string()));
        }
        if let Some(rows) = state.cart_rows.get_mut(&user_id) {
            rows.retain(|(p, _)| *p != product_id);
        }
        Ok(())
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<()> {
        let mut state = self.state.write().unwrap();
        if state.fail_cart_writes {
            return Err(GatewayError::Unavailable("cart write failed".to_string()));
        }
        state.cart_rows.remove(&user_id);
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<Session>> {
        Ok(self.state.read().unwrap().session.clone())
    }

    async fn list_users(&self) -> Result<Vec<UserAccount>> {
        Ok(self.state.read().unwrap().users.clone())
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        let mut state = self.state.write().unwrap();
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        if state.users.len() == before {
            return Err(GatewayError::NotFound(format!("user {id}")));
        }
        Ok(())
    }
}
