//! The saga orchestrator for order placement, cancellation, and admin
//! status transitions.

use std::sync::Arc;

use cart::CartService;
use chrono::Utc;
use common::{OrderId, ProductId, UserId};
use domain::{
    CancelActor, NewOrder, Order, OrderItem, OrderPatch, OrderStatus, ShippingInfo,
};
use futures_util::future::join_all;
use gateway::{Gateway, StockOp};

use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, ProductNames, StockIssue, StockIssues};

/// One product-level stock adjustment inside a fan-out.
#[derive(Debug, Clone)]
struct StockChange {
    product_id: ProductId,
    name: String,
    quantity: u32,
}

/// Outcome of a concurrent stock fan-out: indices of the changes that
/// landed, and the names of the products that did not.
struct FanOutOutcome {
    succeeded: Vec<usize>,
    failed: Vec<String>,
}

/// Drives the order lifecycle sagas against the remote gateway.
///
/// Each operation is a documented sequence of fallible remote calls.
/// The stock-adjustment fan-outs within a step run concurrently with
/// no ordering guarantee among them and no atomicity across them;
/// compensation rules handle the partial-failure cases.
pub struct CheckoutOrchestrator<G> {
    gateway: Arc<G>,
    config: CheckoutConfig,
}

impl<G> Clone for CheckoutOrchestrator<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            config: self.config,
        }
    }
}

impl<G: Gateway + 'static> CheckoutOrchestrator<G> {
    /// Creates an orchestrator with the default configuration.
    pub fn new(gateway: Arc<G>) -> Self {
        Self::with_config(gateway, CheckoutConfig::default())
    }

    /// Creates an orchestrator with an explicit configuration.
    pub fn with_config(gateway: Arc<G>, config: CheckoutConfig) -> Self {
        Self { gateway, config }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> CheckoutConfig {
        self.config
    }

    /// Places an order from the current cart.
    ///
    /// Steps: validate shipping → validate stock against fresh product
    /// records (no mutation on failure) → insert the order row in
    /// `processing` → decrement stock for every line concurrently →
    /// on any decrement failure, delete the order row (and, with
    /// `rollback_decrements_on_failure`, restore the decrements that
    /// landed) → insert the order items → clear the cart.
    ///
    /// On success the returned order is in `processing`, its total
    /// equals the cart total at the time of the call, and stock has
    /// been decremented by exactly the purchased quantities.
    #[tracing::instrument(skip(self, cart, shipping), fields(user_id = %user_id))]
    pub async fn place_order(
        &self,
        cart: &CartService<G>,
        user_id: UserId,
        shipping: &ShippingInfo,
    ) -> Result<Order, CheckoutError> {
        metrics::counter!("checkout_attempts_total").increment(1);
        let start = std::time::Instant::now();

        // Attempts split exactly into placed orders and failures,
        // whichever path the failure takes.
        let result = self.run_place_order(cart, user_id, shipping).await;
        match &result {
            Ok(order) => {
                metrics::counter!("checkout_orders_total").increment(1);
                metrics::histogram!("checkout_duration_seconds")
                    .record(start.elapsed().as_secs_f64());
                tracing::info!(order_id = %order.id, total = %order.total_amount, "order placed");
            }
            Err(error) => {
                metrics::counter!("checkout_failed_total").increment(1);
                tracing::warn!(%error, "checkout failed");
            }
        }
        result
    }

    async fn run_place_order(
        &self,
        cart: &CartService<G>,
        user_id: UserId,
        shipping: &ShippingInfo,
    ) -> Result<Order, CheckoutError> {
        shipping.validate()?;
        let lines = cart.lines();
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        // 1. Stock validation pass. A pre-check, not a lock: it narrows
        // the failure window but the conditional decrement below is
        // what actually prevents oversell.
        let fetches = join_all(
            lines
                .iter()
                .map(|line| self.gateway.fetch_product(line.product.id)),
        )
        .await;
        let mut issues = Vec::new();
        for (line, fetched) in lines.iter().zip(fetches) {
            match fetched? {
                None => issues.push(StockIssue::Missing {
                    name: line.product.name.clone(),
                }),
                Some(product) if product.stock < line.quantity => {
                    issues.push(StockIssue::Insufficient {
                        name: product.name,
                        available: product.stock,
                        requested: line.quantity,
                    })
                }
                Some(_) => {}
            }
        }
        if !issues.is_empty() {
            return Err(CheckoutError::StockValidationFailed(StockIssues(issues)));
        }

        // 2. Order creation. If this fails nothing has happened yet,
        // so there is nothing to compensate.
        let total = cart.total();
        let order = self
            .gateway
            .insert_order(NewOrder {
                user_id,
                status: OrderStatus::Processing,
                total_amount: total,
                shipping: shipping.clone(),
            })
            .await?;

        // 3. Concurrent decrement fan-out.
        let changes: Vec<StockChange> = lines
            .iter()
            .map(|line| StockChange {
                product_id: line.product.id,
                name: line.product.name.clone(),
                quantity: line.quantity,
            })
            .collect();
        let outcome = self.fan_out(StockOp::Decrement, &changes).await;

        // 4. Compensation: the order row always goes; the decrements
        // that landed are restored only when configured to.
        if !outcome.failed.is_empty() {
            if self.config.rollback_decrements_on_failure && !outcome.succeeded.is_empty() {
                let rollback: Vec<StockChange> = outcome
                    .succeeded
                    .iter()
                    .map(|&i| changes[i].clone())
                    .collect();
                let rolled = self.fan_out(StockOp::Increment, &rollback).await;
                for name in &rolled.failed {
                    tracing::error!(product = %name, "failed to roll back stock decrement");
                }
            }
            if let Err(error) = self.gateway.delete_order(order.id).await {
                tracing::error!(%error, order_id = %order.id, "failed to delete order during compensation");
            }
            return Err(CheckoutError::StockDecrementFailed {
                products: ProductNames(outcome.failed),
            });
        }

        // 5. Order items. Stock is already decremented and the order
        // row exists; a failure here is surfaced as a distinguished
        // condition and deliberately not compensated.
        let items: Vec<OrderItem> = lines
            .iter()
            .map(|line| OrderItem {
                order_id: order.id,
                product_id: line.product.id,
                product_name: line.product.name.clone(),
                quantity: line.quantity,
                unit_price: line.product.price,
            })
            .collect();
        if let Err(source) = self.gateway.insert_order_items(items).await {
            return Err(CheckoutError::OrderItemsFailed {
                order_id: order.id,
                source,
            });
        }

        // 6. Finalize.
        cart.clear().await;
        Ok(order)
    }

    /// Cancels an order in `pending` or `processing`.
    ///
    /// Always re-fetches the order and its items first; stock and
    /// status may have changed since the caller last saw them. Stock
    /// restoration must fully succeed before the status transition is
    /// committed; a second cancel of the same order is rejected by the
    /// status guard and never double-increments stock.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(
        &self,
        order_id: OrderId,
        reason: Option<String>,
        actor: CancelActor,
    ) -> Result<Order, CheckoutError> {
        let order = self
            .gateway
            .fetch_order(order_id)
            .await?
            .ok_or(CheckoutError::OrderNotFound(order_id))?;
        if !order.status.can_cancel() {
            return Err(CheckoutError::NotCancellable(order.status));
        }
        let items = self.gateway.fetch_order_items(order_id).await?;

        self.restore_stock(&items).await?;

        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| actor.default_reason().to_string());
        self.gateway
            .update_order(order_id, OrderPatch::cancelled(reason, Utc::now()))
            .await?;

        metrics::counter!("orders_cancelled_total").increment(1);
        tracing::info!(%order_id, ?actor, "order cancelled");

        self.gateway
            .fetch_order(order_id)
            .await?
            .ok_or(CheckoutError::OrderNotFound(order_id))
    }

    /// Admin status transition with its special-cased stock side
    /// effects.
    ///
    /// Into `cancelled` from a cancellable status: restore stock first,
    /// aborting on any failure. Into `processing` from any other
    /// status: decrement stock first (every time when
    /// `redecrement_on_reprocess` is on, otherwise only from
    /// `pending`), aborting on any failure. Every other transition is a
    /// pure status write. Non-cancel transitions clear the cancellation
    /// metadata.
    #[tracing::instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        new_status: OrderStatus,
    ) -> Result<Order, CheckoutError> {
        let order = self
            .gateway
            .fetch_order(order_id)
            .await?
            .ok_or(CheckoutError::OrderNotFound(order_id))?;
        let items = self.gateway.fetch_order_items(order_id).await?;

        if new_status == OrderStatus::Cancelled && order.status.can_cancel() {
            self.restore_stock(&items).await?;
        } else if new_status == OrderStatus::Processing && order.status != OrderStatus::Processing {
            let decrement =
                self.config.redecrement_on_reprocess || order.status == OrderStatus::Pending;
            if decrement {
                let changes: Vec<StockChange> = items
                    .iter()
                    .map(|item| StockChange {
                        product_id: item.product_id,
                        name: item.product_name.clone(),
                        quantity: item.quantity,
                    })
                    .collect();
                let outcome = self.fan_out(StockOp::Decrement, &changes).await;
                if !outcome.failed.is_empty() {
                    return Err(CheckoutError::StockDecrementFailed {
                        products: ProductNames(outcome.failed),
                    });
                }
            }
        }

        let patch = if new_status == OrderStatus::Cancelled {
            OrderPatch::cancelled(CancelActor::Admin.default_reason().to_string(), Utc::now())
        } else {
            OrderPatch::status(new_status)
        };
        self.gateway.update_order(order_id, patch).await?;

        tracing::info!(%order_id, %new_status, "order status updated");

        self.gateway
            .fetch_order(order_id)
            .await?
            .ok_or(CheckoutError::OrderNotFound(order_id))
    }

    /// Increments stock for every item concurrently; all increments
    /// must succeed.
    async fn restore_stock(&self, items: &[OrderItem]) -> Result<(), CheckoutError> {
        let changes: Vec<StockChange> = items
            .iter()
            .map(|item| StockChange {
                product_id: item.product_id,
                name: item.product_name.clone(),
                quantity: item.quantity,
            })
            .collect();
        let outcome = self.fan_out(StockOp::Increment, &changes).await;
        if outcome.failed.is_empty() {
            Ok(())
        } else {
            Err(CheckoutError::StockRestoreFailed {
                products: ProductNames(outcome.failed),
            })
        }
    }

    /// Issues one stock adjustment per change concurrently and awaits
    /// them all. A transport error and a non-success result are both
    /// failures; errors are additionally logged with their product.
    async fn fan_out(&self, op: StockOp, changes: &[StockChange]) -> FanOutOutcome {
        let results = join_all(
            changes
                .iter()
                .map(|c| self.gateway.adjust_stock(op, c.product_id, c.quantity)),
        )
        .await;

        let mut outcome = FanOutOutcome {
            succeeded: Vec::new(),
            failed: Vec::new(),
        };
        for (i, (change, result)) in changes.iter().zip(results).enumerate() {
            match result {
                Ok(true) => outcome.succeeded.push(i),
                Ok(false) => outcome.failed.push(change.name.clone()),
                Err(error) => {
                    tracing::error!(%error, product = %change.name, ?op, "stock adjustment errored");
                    outcome.failed.push(change.name.clone());
                }
            }
        }
        outcome
    }
}
