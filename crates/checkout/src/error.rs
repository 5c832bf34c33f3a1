//! Checkout error taxonomy.

use common::OrderId;
use domain::{OrderStatus, ValidationError};
use gateway::GatewayError;
use thiserror::Error;

/// One product that failed the pre-checkout stock validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockIssue {
    /// The product no longer exists in the catalog.
    Missing { name: String },
    /// Requested quantity exceeds the units on hand.
    Insufficient {
        name: String,
        available: u32,
        requested: u32,
    },
}

impl std::fmt::Display for StockIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockIssue::Missing { name } => write!(f, "product {name} not found"),
            StockIssue::Insufficient {
                name,
                available,
                requested,
            } => write!(
                f,
                "insufficient stock for {name}: only {available} available, {requested} requested"
            ),
        }
    }
}

/// All issues found by the validation pass, in cart-line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockIssues(pub Vec<StockIssue>);

impl std::fmt::Display for StockIssues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join("; "))
    }
}

/// Comma-separated product names, for fan-out failure messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductNames(pub Vec<String>);

impl std::fmt::Display for ProductNames {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

/// Everything that can go wrong while placing, cancelling, or
/// transitioning an order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// A shipping field failed validation; no remote call was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Checkout was attempted with no cart lines.
    #[error("your cart is empty")]
    EmptyCart,

    /// The pre-checkout validation pass found missing products or
    /// insufficient stock; nothing was mutated.
    #[error("stock validation failed: {0}")]
    StockValidationFailed(StockIssues),

    /// Some decrements in the checkout fan-out did not succeed. The
    /// order row has been deleted; names every product that failed.
    #[error("stock update failed for: {products}")]
    StockDecrementFailed { products: ProductNames },

    /// Some increments of a stock restoration did not succeed; the
    /// status transition was not committed.
    #[error("stock restore failed for: {products}")]
    StockRestoreFailed { products: ProductNames },

    /// The order row exists and stock is decremented, but the item
    /// rows could not be saved. Deliberately not compensated; the
    /// caller must re-fetch order and stock state before retrying.
    #[error("order {order_id} was created but its items could not be saved: {source}")]
    OrderItemsFailed {
        order_id: OrderId,
        source: GatewayError,
    },

    /// No order exists with the given id.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// The order is not in a cancellable status.
    #[error("an order in '{0}' status cannot be cancelled")]
    NotCancellable(OrderStatus),

    /// A remote call failed outside the compensated steps.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
