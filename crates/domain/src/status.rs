//! Order status state machine.

use serde::{Deserialize, Serialize};

/// The lifecycle status of an order.
///
/// Checkout creates orders directly in `Processing`; `Pending` is only
/// reachable through explicit admin reversion. Transitions:
/// ```text
/// (checkout) ──► Processing ──► Shipped ──► Delivered
///                    │
///  Pending ──────────┴──► Cancelled
/// ```
/// `Delivered` and `Cancelled` are terminal for customers; admins may
/// move an order between any two statuses, with stock side effects
/// applied by the checkout orchestrator on the transitions that need
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order recorded but not yet committed to fulfilment.
    Pending,

    /// Stock has been decremented, order is being fulfilled.
    Processing,

    /// Order handed to the courier.
    Shipped,

    /// Order received by the customer (terminal).
    Delivered,

    /// Order cancelled with stock restored (terminal).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if a customer may still cancel an order in this status.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }

    /// Returns true if no further customer-visible transitions remain.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns the status name in its wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// All statuses, in lifecycle order. Used for admin selection lists
    /// and stable sorting by status.
    pub fn all() -> [OrderStatus; 5] {
        [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ]
    }

    /// Position in the lifecycle ordering, for status sorts.
    pub fn sort_rank(&self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Processing => 1,
            OrderStatus::Shipped => 2,
            OrderStatus::Delivered => 3,
            OrderStatus::Cancelled => 4,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}
