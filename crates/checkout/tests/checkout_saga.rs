//! End-to-end order lifecycle tests against the in-memory gateway.

use std::sync::{Arc, OnceLock};

use cart::CartService;
use checkout::{CheckoutConfig, CheckoutError, CheckoutOrchestrator};
use common::{Money, OrderId, UserId};
use domain::{CancelActor, NewProduct, OrderStatus, Product, ShippingInfo};
use gateway::{Gateway, InMemoryGateway};
use metrics_exporter_prometheus::PrometheusHandle;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

/// Current value of a counter in the rendered Prometheus text, zero if
/// it has not been recorded yet.
fn counter_value(rendered: &str, name: &str) -> u64 {
    rendered
        .lines()
        .find_map(|line| line.strip_prefix(&format!("{name} ")))
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

fn shipping() -> ShippingInfo {
    ShippingInfo::new("12 Spice Lane", "Kochi", "682001", "9876543210")
}

async fn seed_product(gateway: &InMemoryGateway, name: &str, price: i64, stock: u32) -> Product {
    gateway
        .insert_product(NewProduct {
            name: name.to_string(),
            description: String::new(),
            price: Money::from_rupees(price),
            category: "Whole Spices".to_string(),
            stock,
            image_url: String::new(),
        })
        .await
        .unwrap()
}

struct Harness {
    gateway: Arc<InMemoryGateway>,
    cart: CartService<InMemoryGateway>,
    orchestrator: CheckoutOrchestrator<InMemoryGateway>,
    user: UserId,
}

impl Harness {
    async fn new() -> Self {
        Self::with_config(CheckoutConfig::default()).await
    }

    async fn with_config(config: CheckoutConfig) -> Self {
        let gateway = Arc::new(InMemoryGateway::new());
        let cart = CartService::new(gateway.clone());
        let orchestrator = CheckoutOrchestrator::with_config(gateway.clone(), config);
        Self {
            gateway,
            cart,
            orchestrator,
            user: UserId::new(),
        }
    }

    async fn place(&self) -> Result<domain::Order, CheckoutError> {
        self.orchestrator
            .place_order(&self.cart, self.user, &shipping())
            .await
    }
}

#[tokio::test]
async fn test_happy_path_checkout() {
    let h = Harness::new().await;
    let turmeric = seed_product(&h.gateway, "Turmeric", 100, 5).await;
    h.cart.add_line(turmeric.clone(), 2).await;

    let order = h.place().await.unwrap();

    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(order.total_amount, Money::from_rupees(200));
    assert_eq!(h.gateway.product_stock(turmeric.id), Some(3));
    assert!(h.cart.lines().is_empty());

    let items = h.gateway.fetch_order_items(order.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_name, "Turmeric");
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].unit_price, Money::from_rupees(100));
    // Item snapshot totals match the order total.
    let items_total: Money = items.iter().map(|i| i.line_total()).sum();
    assert_eq!(items_total, order.total_amount);
}

#[tokio::test]
async fn test_every_failed_attempt_increments_the_failure_counter() {
    let handle = metrics_handle();
    let before = counter_value(&handle.render(), "checkout_failed_total");

    // Three failures that never reach the decrement fan-out: empty
    // cart, invalid shipping, and a stock validation miss.
    let h = Harness::new().await;
    assert!(matches!(h.place().await, Err(CheckoutError::EmptyCart)));

    let turmeric = seed_product(&h.gateway, "Turmeric", 100, 5).await;
    h.cart.add_line(turmeric.clone(), 2).await;
    let bad = ShippingInfo::new("12 Spice Lane", "Kochi", "6820", "9876543210");
    assert!(h.orchestrator.place_order(&h.cart, h.user, &bad).await.is_err());

    h.cart.update_quantity(turmeric.id, 9).await;
    assert!(matches!(
        h.place().await,
        Err(CheckoutError::StockValidationFailed(_))
    ));

    let after = counter_value(&handle.render(), "checkout_failed_total");
    // Other tests may fail checkouts concurrently, so only a lower
    // bound is exact.
    assert!(after >= before + 3, "failed counter went {before} -> {after}");
}

#[tokio::test]
async fn test_empty_cart_is_rejected_before_any_remote_write() {
    let h = Harness::new().await;
    let err = h.place().await.unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));
    assert_eq!(h.gateway.order_count(), 0);
}

#[tokio::test]
async fn test_invalid_shipping_is_rejected_first() {
    let h = Harness::new().await;
    let turmeric = seed_product(&h.gateway, "Turmeric", 100, 5).await;
    h.cart.add_line(turmeric.clone(), 1).await;

    let bad = ShippingInfo::new("12 Spice Lane", "Kochi", "6820", "9876543210");
    let err = h
        .orchestrator
        .place_order(&h.cart, h.user, &bad)
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::Validation(_)));
    assert_eq!(h.gateway.order_count(), 0);
    assert_eq!(h.gateway.product_stock(turmeric.id), Some(5));
}

#[tokio::test]
async fn test_insufficient_stock_fails_validation_without_mutation() {
    let h = Harness::new().await;
    let saffron = seed_product(&h.gateway, "Saffron", 450, 1).await;
    h.cart.add_line(saffron.clone(), 2).await;

    let err = h.place().await.unwrap_err();
    let CheckoutError::StockValidationFailed(issues) = err else {
        panic!("expected stock validation failure");
    };
    assert!(issues.to_string().contains("Saffron"));
    assert!(issues.to_string().contains("only 1 available"));

    // Nothing was written.
    assert_eq!(h.gateway.order_count(), 0);
    assert_eq!(h.gateway.product_stock(saffron.id), Some(1));
    assert_eq!(h.cart.lines().len(), 1);
}

#[tokio::test]
async fn test_partial_decrement_failure_deletes_order_and_names_products() {
    let h = Harness::new().await;
    let turmeric = seed_product(&h.gateway, "Turmeric", 100, 5).await;
    let cloves = seed_product(&h.gateway, "Cloves", 200, 5).await;
    let saffron = seed_product(&h.gateway, "Saffron", 450, 5).await;
    h.cart.add_line(turmeric.clone(), 1).await;
    h.cart.add_line(cloves.clone(), 1).await;
    h.cart.add_line(saffron.clone(), 1).await;

    h.gateway.set_decrement_failure(cloves.id);
    h.gateway.set_decrement_failure(saffron.id);

    let err = h.place().await.unwrap_err();
    let CheckoutError::StockDecrementFailed { products } = err else {
        panic!("expected decrement failure");
    };
    // Every failed product is named, none of the succeeded ones.
    let message = products.to_string();
    assert!(message.contains("Cloves"));
    assert!(message.contains("Saffron"));
    assert!(!message.contains("Turmeric"));

    // No order row survives, and the rollback restored turmeric.
    assert_eq!(h.gateway.order_count(), 0);
    assert_eq!(h.gateway.product_stock(turmeric.id), Some(5));
    assert_eq!(h.gateway.product_stock(cloves.id), Some(5));
    // The cart is untouched on failure.
    assert_eq!(h.cart.lines().len(), 3);
}

#[tokio::test]
async fn test_rollback_disabled_leaves_partial_decrements_applied() {
    let h = Harness::with_config(CheckoutConfig {
        rollback_decrements_on_failure: false,
        ..CheckoutConfig::default()
    })
    .await;
    let turmeric = seed_product(&h.gateway, "Turmeric", 100, 5).await;
    let cloves = seed_product(&h.gateway, "Cloves", 200, 5).await;
    h.cart.add_line(turmeric.clone(), 2).await;
    h.cart.add_line(cloves.clone(), 1).await;

    h.gateway.set_decrement_failure(cloves.id);

    let err = h.place().await.unwrap_err();
    assert!(matches!(err, CheckoutError::StockDecrementFailed { .. }));

    // Order row gone, but the turmeric decrement stands.
    assert_eq!(h.gateway.order_count(), 0);
    assert_eq!(h.gateway.product_stock(turmeric.id), Some(3));
    assert_eq!(h.gateway.product_stock(cloves.id), Some(5));
}

#[tokio::test]
async fn test_items_insert_failure_keeps_order_and_decrements() {
    let h = Harness::new().await;
    let turmeric = seed_product(&h.gateway, "Turmeric", 100, 5).await;
    h.cart.add_line(turmeric.clone(), 2).await;

    h.gateway.set_fail_insert_order_items(true);

    let err = h.place().await.unwrap_err();
    let CheckoutError::OrderItemsFailed { order_id, .. } = err else {
        panic!("expected items failure");
    };

    // Deliberately uncompensated: the order row and decrements remain.
    assert!(h.gateway.has_order(order_id));
    assert_eq!(h.gateway.product_stock(turmeric.id), Some(3));
    // The cart was not cleared.
    assert_eq!(h.cart.lines().len(), 1);
}

#[tokio::test]
async fn test_cancel_restores_stock_and_records_metadata() {
    let h = Harness::new().await;
    let turmeric = seed_product(&h.gateway, "Turmeric", 100, 5).await;
    let cloves = seed_product(&h.gateway, "Cloves", 200, 5).await;
    h.cart.add_line(turmeric.clone(), 2).await;
    h.cart.add_line(cloves.clone(), 1).await;
    let order = h.place().await.unwrap();
    assert_eq!(h.gateway.product_stock(turmeric.id), Some(3));

    let cancelled = h
        .orchestrator
        .cancel_order(order.id, None, CancelActor::Customer)
        .await
        .unwrap();

    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.cancel_reason.as_deref(), Some("Cancelled by customer"));
    assert!(cancelled.cancelled_at.is_some());
    // Every item's quantity went back.
    assert_eq!(h.gateway.product_stock(turmeric.id), Some(5));
    assert_eq!(h.gateway.product_stock(cloves.id), Some(5));
}

#[tokio::test]
async fn test_cancel_with_explicit_reason() {
    let h = Harness::new().await;
    let turmeric = seed_product(&h.gateway, "Turmeric", 100, 5).await;
    h.cart.add_line(turmeric.clone(), 1).await;
    let order = h.place().await.unwrap();

    let cancelled = h
        .orchestrator
        .cancel_order(
            order.id,
            Some("ordered the wrong grade".to_string()),
            CancelActor::Customer,
        )
        .await
        .unwrap();
    assert_eq!(
        cancelled.cancel_reason.as_deref(),
        Some("ordered the wrong grade")
    );
}

#[tokio::test]
async fn test_blank_reason_falls_back_to_actor_default() {
    let h = Harness::new().await;
    let turmeric = seed_product(&h.gateway, "Turmeric", 100, 5).await;
    h.cart.add_line(turmeric.clone(), 1).await;
    let order = h.place().await.unwrap();

    let cancelled = h
        .orchestrator
        .cancel_order(order.id, Some("   ".to_string()), CancelActor::Admin)
        .await
        .unwrap();
    assert_eq!(cancelled.cancel_reason.as_deref(), Some("Cancelled by admin"));
}

#[tokio::test]
async fn test_cancel_rejects_non_cancellable_statuses() {
    let h = Harness::new().await;
    let turmeric = seed_product(&h.gateway, "Turmeric", 100, 5).await;
    h.cart.add_line(turmeric.clone(), 2).await;
    let order = h.place().await.unwrap();

    for status in [
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ] {
        h.gateway
            .update_order(order.id, domain::OrderPatch::status(status))
            .await
            .unwrap();

        let err = h
            .orchestrator
            .cancel_order(order.id, None, CancelActor::Customer)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::NotCancellable(s) if s == status));
        // No stock mutation on a refused cancel.
        assert_eq!(h.gateway.product_stock(turmeric.id), Some(3));
    }
}

#[tokio::test]
async fn test_double_cancel_never_double_increments() {
    let h = Harness::new().await;
    let turmeric = seed_product(&h.gateway, "Turmeric", 100, 5).await;
    h.cart.add_line(turmeric.clone(), 2).await;
    let order = h.place().await.unwrap();

    h.orchestrator
        .cancel_order(order.id, None, CancelActor::Customer)
        .await
        .unwrap();
    assert_eq!(h.gateway.product_stock(turmeric.id), Some(5));

    let err = h
        .orchestrator
        .cancel_order(order.id, None, CancelActor::Customer)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::NotCancellable(OrderStatus::Cancelled)
    ));
    assert_eq!(h.gateway.product_stock(turmeric.id), Some(5));
}

#[tokio::test]
async fn test_cancel_aborts_before_status_write_when_restore_fails() {
    let h = Harness::new().await;
    let turmeric = seed_product(&h.gateway, "Turmeric", 100, 5).await;
    let cloves = seed_product(&h.gateway, "Cloves", 200, 5).await;
    h.cart.add_line(turmeric.clone(), 1).await;
    h.cart.add_line(cloves.clone(), 1).await;
    let order = h.place().await.unwrap();

    h.gateway.set_increment_failure(cloves.id);

    let err = h
        .orchestrator
        .cancel_order(order.id, None, CancelActor::Customer)
        .await
        .unwrap_err();
    let CheckoutError::StockRestoreFailed { products } = err else {
        panic!("expected restore failure");
    };
    assert!(products.to_string().contains("Cloves"));

    // The status transition never happened.
    let current = h.gateway.fetch_order(order.id).await.unwrap().unwrap();
    assert_eq!(current.status, OrderStatus::Processing);
    assert!(current.cancelled_at.is_none());
}

#[tokio::test]
async fn test_cancel_missing_order() {
    let h = Harness::new().await;
    let err = h
        .orchestrator
        .cancel_order(OrderId::new(), None, CancelActor::Customer)
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::OrderNotFound(_)));
}

#[tokio::test]
async fn test_admin_cancel_restores_stock_with_admin_reason() {
    let h = Harness::new().await;
    let turmeric = seed_product(&h.gateway, "Turmeric", 100, 5).await;
    h.cart.add_line(turmeric.clone(), 2).await;
    let order = h.place().await.unwrap();

    let updated = h
        .orchestrator
        .update_order_status(order.id, OrderStatus::Cancelled)
        .await
        .unwrap();

    assert_eq!(updated.status, OrderStatus::Cancelled);
    assert_eq!(updated.cancel_reason.as_deref(), Some("Cancelled by admin"));
    assert!(updated.cancelled_at.is_some());
    assert_eq!(h.gateway.product_stock(turmeric.id), Some(5));
}

#[tokio::test]
async fn test_admin_cancel_of_shipped_order_skips_restoration() {
    let h = Harness::new().await;
    let turmeric = seed_product(&h.gateway, "Turmeric", 100, 5).await;
    h.cart.add_line(turmeric.clone(), 2).await;
    let order = h.place().await.unwrap();
    h.gateway
        .update_order(order.id, domain::OrderPatch::status(OrderStatus::Shipped))
        .await
        .unwrap();

    let updated = h
        .orchestrator
        .update_order_status(order.id, OrderStatus::Cancelled)
        .await
        .unwrap();

    // Shipped stock is already out the door; cancelling does not
    // restore it.
    assert_eq!(updated.status, OrderStatus::Cancelled);
    assert_eq!(h.gateway.product_stock(turmeric.id), Some(3));
}

#[tokio::test]
async fn test_non_cancel_transition_clears_cancellation_metadata() {
    let h = Harness::new().await;
    let turmeric = seed_product(&h.gateway, "Turmeric", 100, 5).await;
    h.cart.add_line(turmeric.clone(), 1).await;
    let order = h.place().await.unwrap();
    h.orchestrator
        .cancel_order(order.id, None, CancelActor::Customer)
        .await
        .unwrap();

    let updated = h
        .orchestrator
        .update_order_status(order.id, OrderStatus::Shipped)
        .await
        .unwrap();

    assert_eq!(updated.status, OrderStatus::Shipped);
    assert!(updated.cancel_reason.is_none());
    assert!(updated.cancelled_at.is_none());
}

#[tokio::test]
async fn test_reprocessing_a_cancelled_order_decrements_again() {
    let h = Harness::new().await;
    let turmeric = seed_product(&h.gateway, "Turmeric", 100, 5).await;
    h.cart.add_line(turmeric.clone(), 2).await;
    let order = h.place().await.unwrap();
    h.orchestrator
        .cancel_order(order.id, None, CancelActor::Customer)
        .await
        .unwrap();
    assert_eq!(h.gateway.product_stock(turmeric.id), Some(5));

    let updated = h
        .orchestrator
        .update_order_status(order.id, OrderStatus::Processing)
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Processing);
    assert_eq!(h.gateway.product_stock(turmeric.id), Some(3));
}

#[tokio::test]
async fn test_shipped_to_processing_redecrements_by_default() {
    let h = Harness::new().await;
    let turmeric = seed_product(&h.gateway, "Turmeric", 100, 5).await;
    h.cart.add_line(turmeric.clone(), 2).await;
    let order = h.place().await.unwrap();
    h.gateway
        .update_order(order.id, domain::OrderPatch::status(OrderStatus::Shipped))
        .await
        .unwrap();

    h.orchestrator
        .update_order_status(order.id, OrderStatus::Processing)
        .await
        .unwrap();
    // 5 − 2 at checkout − 2 again on reprocess.
    assert_eq!(h.gateway.product_stock(turmeric.id), Some(1));
}

#[tokio::test]
async fn test_redecrement_flag_off_restricts_decrement_to_pending() {
    let h = Harness::with_config(CheckoutConfig {
        redecrement_on_reprocess: false,
        ..CheckoutConfig::default()
    })
    .await;
    let turmeric = seed_product(&h.gateway, "Turmeric", 100, 5).await;
    h.cart.add_line(turmeric.clone(), 2).await;
    let order = h.place().await.unwrap();
    h.gateway
        .update_order(order.id, domain::OrderPatch::status(OrderStatus::Shipped))
        .await
        .unwrap();

    // Shipped → processing: no second decrement with the flag off.
    h.orchestrator
        .update_order_status(order.id, OrderStatus::Processing)
        .await
        .unwrap();
    assert_eq!(h.gateway.product_stock(turmeric.id), Some(3));

    // Pending → processing still decrements.
    h.gateway
        .update_order(order.id, domain::OrderPatch::status(OrderStatus::Pending))
        .await
        .unwrap();
    h.orchestrator
        .update_order_status(order.id, OrderStatus::Processing)
        .await
        .unwrap();
    assert_eq!(h.gateway.product_stock(turmeric.id), Some(1));
}

#[tokio::test]
async fn test_reprocess_aborts_on_decrement_failure() {
    let h = Harness::new().await;
    let turmeric = seed_product(&h.gateway, "Turmeric", 100, 2).await;
    h.cart.add_line(turmeric.clone(), 2).await;
    let order = h.place().await.unwrap();
    h.orchestrator
        .cancel_order(order.id, None, CancelActor::Customer)
        .await
        .unwrap();

    // Someone else bought the restored stock in the meantime.
    h.gateway
        .adjust_stock(gateway::StockOp::Decrement, turmeric.id, 1)
        .await
        .unwrap();

    let err = h
        .orchestrator
        .update_order_status(order.id, OrderStatus::Processing)
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::StockDecrementFailed { .. }));

    // Status stayed cancelled.
    let current = h.gateway.fetch_order(order.id).await.unwrap().unwrap();
    assert_eq!(current.status, OrderStatus::Cancelled);
}
