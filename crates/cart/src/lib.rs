//! Cart aggregate.
//!
//! An ordered set of cart lines, unique by product, owned by the active
//! session. For authenticated sessions every mutation is mirrored to
//! the remote gateway as a fire-and-forget background task whose
//! failure is logged and never affects the local result. Login merges
//! the locally persisted anonymous cart into the server-side cart by
//! replaying each line as an add; logout stashes the merged cart
//! locally and resets the in-memory cart to empty.

use std::future::Future;
use std::sync::{Arc, Mutex, RwLock};

use common::{Money, ProductId, UserId};
use domain::{CartLine, Product};
use gateway::Gateway;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct CartState {
    /// Lines of the active session, insertion-ordered.
    lines: Vec<CartLine>,
    /// Locally persisted copy, kept in sync while anonymous and
    /// captured at logout; replayed into the server cart at login.
    stash: Vec<CartLine>,
    user: Option<UserId>,
}

impl CartState {
    // Anonymous carts persist locally; keep the stash mirroring the
    // live lines so a later login replays exactly what the shopper saw.
    fn sync_local(&mut self) {
        if self.user.is_none() {
            self.stash = self.lines.clone();
        }
    }
}

/// The per-session cart service.
pub struct CartService<G> {
    gateway: Arc<G>,
    state: Arc<RwLock<CartState>>,
    mirrors: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl<G> Clone for CartService<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            state: self.state.clone(),
            mirrors: self.mirrors.clone(),
        }
    }
}

impl<G: Gateway + 'static> CartService<G> {
    /// Creates an empty anonymous cart backed by the given gateway.
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            state: Arc::new(RwLock::new(CartState::default())),
            mirrors: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds `quantity` of a product, merging with an existing line.
    pub async fn add_line(&self, product: Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let (user, product_id, new_quantity) = {
            let mut state = self.state.write().unwrap();
            let product_id = product.id;
            let new_quantity = match state.lines.iter_mut().find(|l| l.product.id == product_id) {
                Some(line) => {
                    line.quantity += quantity;
                    line.quantity
                }
                None => {
                    state.lines.push(CartLine::new(product, quantity));
                    quantity
                }
            };
            state.sync_local();
            (state.user, product_id, new_quantity)
        };
        if let Some(user) = user {
            let gateway = self.gateway.clone();
            self.mirror("upsert", async move {
                gateway
                    .upsert_cart_line(user, product_id, new_quantity)
                    .await
            });
        }
    }

    /// Sets a line's quantity. No-op for quantities below 1 or for
    /// products not in the cart.
    pub async fn update_quantity(&self, product_id: ProductId, quantity: u32) {
        if quantity < 1 {
            return;
        }
        let user = {
            let mut state = self.state.write().unwrap();
            let Some(line) = state.lines.iter_mut().find(|l| l.product.id == product_id) else {
                return;
            };
            line.quantity = quantity;
            state.sync_local();
            state.user
        };
        if let Some(user) = user {
            let gateway = self.gateway.clone();
            self.mirror("upsert", async move {
                gateway.upsert_cart_line(user, product_id, quantity).await
            });
        }
    }

    /// Removes a product's line entirely.
    pub async fn remove_line(&self, product_id: ProductId) {
        let user = {
            let mut state = self.state.write().unwrap();
            state.lines.retain(|l| l.product.id != product_id);
            state.sync_local();
            state.user
        };
        if let Some(user) = user {
            let gateway = self.gateway.clone();
            self.mirror("delete", async move {
                gateway.delete_cart_line(user, product_id).await
            });
        }
    }

    /// Empties the cart; for authenticated sessions all remote cart
    /// rows are deleted as well.
    pub async fn clear(&self) {
        let user = {
            let mut state = self.state.write().unwrap();
            state.lines.clear();
            state.sync_local();
            state.user
        };
        if let Some(user) = user {
            let gateway = self.gateway.clone();
            self.mirror("clear", async move { gateway.clear_cart(user).await });
        }
    }

    /// Transitions the cart into an authenticated session.
    ///
    /// Loads the server-side cart, then replays the locally persisted
    /// anonymous lines one-by-one as adds (mirroring each), and
    /// discards the local copy.
    #[tracing::instrument(skip(self))]
    pub async fn login(&self, user_id: UserId) {
        // The stash is the locally persisted cart and already reflects
        // any live anonymous lines, so it alone is replayed.
        let replay = {
            let mut state = self.state.write().unwrap();
            state.user = Some(user_id);
            state.lines.clear();
            std::mem::take(&mut state.stash)
        };

        match self.gateway.fetch_cart_lines(user_id).await {
            Ok(remote) => {
                self.state.write().unwrap().lines = remote;
            }
            Err(error) => {
                // Initial load failures are non-fatal; start from empty.
                tracing::warn!(%error, %user_id, "failed to load remote cart");
            }
        }

        for line in replay {
            self.add_line(line.product, line.quantity).await;
        }
    }

    /// Transitions back to an anonymous session: the merged cart is
    /// stashed locally and the in-memory cart becomes empty.
    pub async fn logout(&self) {
        let mut state = self.state.write().unwrap();
        state.stash = std::mem::take(&mut state.lines);
        state.user = None;
    }

    /// Snapshot of the current lines.
    pub fn lines(&self) -> Vec<CartLine> {
        self.state.read().unwrap().lines.clone()
    }

    /// Sum over lines of unit price × quantity.
    pub fn total(&self) -> Money {
        self.state
            .read()
            .unwrap()
            .lines
            .iter()
            .map(CartLine::line_total)
            .sum()
    }

    /// Total number of units across all lines.
    pub fn count(&self) -> u32 {
        self.state
            .read()
            .unwrap()
            .lines
            .iter()
            .map(|l| l.quantity)
            .sum()
    }

    /// Returns the authenticated user, if any.
    pub fn user(&self) -> Option<UserId> {
        self.state.read().unwrap().user
    }

    /// Waits for all in-flight mirror writes to settle.
    ///
    /// Mirror failures stay logged-and-swallowed; this only provides a
    /// synchronization point for tests and shutdown.
    pub async fn flush(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut mirrors = self.mirrors.lock().unwrap();
            mirrors.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.await;
        }
    }

    fn mirror<F>(&self, op: &'static str, fut: F)
    where
        F: Future<Output = Result<(), gateway::GatewayError>> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            if let Err(error) = fut.await {
                tracing::warn!(%error, op, "cart mirror write failed");
            }
        });
        let mut mirrors = self.mirrors.lock().unwrap();
        // Settled mirrors are dropped here so the tracking vec stays
        // bounded by the number of writes actually in flight.
        mirrors.retain(|h| !h.is_finished());
        mirrors.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::NewProduct;
    use gateway::InMemoryGateway;

    async fn seeded(names_prices: &[(&str, i64)]) -> (Arc<InMemoryGateway>, Vec<Product>) {
        let gateway = Arc::new(InMemoryGateway::new());
        let mut products = Vec::new();
        for (name, price) in names_prices {
            let product = gateway
                .insert_product(NewProduct {
                    name: name.to_string(),
                    description: String::new(),
                    price: Money::from_rupees(*price),
                    category: "Whole Spices".to_string(),
                    stock: 50,
                    image_url: String::new(),
                })
                .await
                .unwrap();
            products.push(product);
        }
        (gateway, products)
    }

    #[tokio::test]
    async fn test_add_merges_existing_line() {
        let (gateway, products) = seeded(&[("Turmeric", 80)]).await;
        let cart = CartService::new(gateway);

        cart.add_line(products[0].clone(), 1).await;
        cart.add_line(products[0].clone(), 2).await;

        let lines = cart.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(cart.count(), 3);
    }

    #[tokio::test]
    async fn test_total_and_count() {
        let (gateway, products) = seeded(&[("Turmeric", 80), ("Saffron", 450)]).await;
        let cart = CartService::new(gateway);

        cart.add_line(products[0].clone(), 2).await;
        cart.add_line(products[1].clone(), 1).await;

        assert_eq!(cart.total(), Money::from_rupees(610));
        assert_eq!(cart.count(), 3);
    }

    #[tokio::test]
    async fn test_update_quantity_below_one_is_noop() {
        let (gateway, products) = seeded(&[("Turmeric", 80)]).await;
        let cart = CartService::new(gateway);

        cart.add_line(products[0].clone(), 2).await;
        cart.update_quantity(products[0].id, 0).await;
        assert_eq!(cart.lines()[0].quantity, 2);

        cart.update_quantity(products[0].id, 5).await;
        assert_eq!(cart.lines()[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let (gateway, products) = seeded(&[("Turmeric", 80), ("Saffron", 450)]).await;
        let cart = CartService::new(gateway);

        cart.add_line(products[0].clone(), 1).await;
        cart.add_line(products[1].clone(), 1).await;

        cart.remove_line(products[0].id).await;
        assert_eq!(cart.lines().len(), 1);

        cart.clear().await;
        assert!(cart.lines().is_empty());
        assert_eq!(cart.total(), Money::zero());
    }

    #[tokio::test]
    async fn test_anonymous_cart_does_not_mirror() {
        let (gateway, products) = seeded(&[("Turmeric", 80)]).await;
        let cart = CartService::new(gateway.clone());

        cart.add_line(products[0].clone(), 2).await;
        cart.flush().await;

        // No rows for any user.
        assert!(
            gateway
                .fetch_cart_lines(UserId::new())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_authenticated_mutations_mirror_remotely() {
        let (gateway, products) = seeded(&[("Turmeric", 80)]).await;
        let cart = CartService::new(gateway.clone());
        let user = UserId::new();

        cart.login(user).await;
        cart.add_line(products[0].clone(), 2).await;
        cart.flush().await;
        assert_eq!(gateway.cart_row(user, products[0].id), Some(2));

        cart.update_quantity(products[0].id, 4).await;
        cart.flush().await;
        assert_eq!(gateway.cart_row(user, products[0].id), Some(4));

        cart.remove_line(products[0].id).await;
        cart.flush().await;
        assert_eq!(gateway.cart_row(user, products[0].id), None);
    }

    #[tokio::test]
    async fn test_mirror_failure_never_affects_local_cart() {
        let (gateway, products) = seeded(&[("Turmeric", 80)]).await;
        let cart = CartService::new(gateway.clone());
        let user = UserId::new();

        cart.login(user).await;
        gateway.set_fail_cart_writes(true);

        cart.add_line(products[0].clone(), 2).await;
        cart.flush().await;

        // Local line stands; remote row was never written.
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(gateway.cart_row_count(user), 0);
    }

    #[tokio::test]
    async fn test_login_replays_anonymous_lines_into_server_cart() {
        let (gateway, products) = seeded(&[("Turmeric", 80), ("Saffron", 450)]).await;
        let user = UserId::new();
        // Server cart already holds one turmeric.
        gateway.upsert_cart_line(user, products[0].id, 1).await.unwrap();

        let cart = CartService::new(gateway.clone());
        cart.add_line(products[0].clone(), 2).await;
        cart.add_line(products[1].clone(), 1).await;

        cart.login(user).await;
        cart.flush().await;

        // Local turmeric merged on top of the server line.
        let lines = cart.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product.id, products[0].id);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(gateway.cart_row(user, products[0].id), Some(3));
        assert_eq!(gateway.cart_row(user, products[1].id), Some(1));
    }

    #[tokio::test]
    async fn test_settled_mirror_handles_are_dropped() {
        let (gateway, products) = seeded(&[("Turmeric", 80)]).await;
        let cart = CartService::new(gateway.clone());
        cart.login(UserId::new()).await;

        cart.add_line(products[0].clone(), 1).await;
        // Let the first mirror settle without draining the vec.
        loop {
            let all_finished = cart.mirrors.lock().unwrap().iter().all(|h| h.is_finished());
            if all_finished {
                break;
            }
            tokio::task::yield_now().await;
        }

        cart.update_quantity(products[0].id, 2).await;
        // Tracking the new mirror dropped the settled one.
        assert_eq!(cart.mirrors.lock().unwrap().len(), 1);
        cart.flush().await;
        assert!(cart.mirrors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_logout_stashes_and_resets_to_empty() {
        let (gateway, products) = seeded(&[("Turmeric", 80)]).await;
        let cart = CartService::new(gateway.clone());
        let user = UserId::new();

        cart.login(user).await;
        cart.add_line(products[0].clone(), 2).await;
        cart.flush().await;

        cart.logout().await;
        // Deliberate: post-logout the session cart is empty, not the
        // old merged cart.
        assert!(cart.lines().is_empty());
        assert!(cart.user().is_none());

        // A later login replays the stashed lines.
        cart.login(user).await;
        cart.flush().await;
        assert_eq!(cart.lines()[0].quantity, 4); // 2 remote + 2 stashed
    }
}
