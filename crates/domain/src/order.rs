//! Orders and their line items.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::shipping::ShippingInfo;
use crate::status::OrderStatus;

/// A persisted order.
///
/// `total_amount` is immutable after creation; only `status` and the
/// cancellation metadata change afterwards, and only through
/// [`OrderPatch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    /// Sum of line totals at creation time.
    pub total_amount: Money,
    pub shipping: ShippingInfo,
    /// Present only when status is `cancelled`.
    pub cancel_reason: Option<String>,
    /// Present only when status is `cancelled`.
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting an order; the gateway assigns id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub shipping: ShippingInfo,
}

/// The only mutation the gateway accepts on a persisted order:
/// a status change plus cancellation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPatch {
    pub status: OrderStatus,
    pub cancel_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl OrderPatch {
    /// A pure status change that clears any cancellation metadata.
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status,
            cancel_reason: None,
            cancelled_at: None,
        }
    }

    /// A transition into `cancelled` recording reason and time.
    pub fn cancelled(reason: String, at: DateTime<Utc>) -> Self {
        Self {
            status: OrderStatus::Cancelled,
            cancel_reason: Some(reason),
            cancelled_at: Some(at),
        }
    }
}

/// A line belonging to exactly one order.
///
/// Name and unit price are snapshots taken at purchase time and stay
/// fixed through later catalog edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderItem {
    /// Returns quantity × unit price.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// An order with its items embedded, as returned by the query layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl OrderWithItems {
    /// Sum of the item line totals.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

/// Who asked for a cancellation; selects the default recorded reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancelActor {
    Customer,
    Admin,
}

impl CancelActor {
    /// Reason recorded when the caller supplies none.
    pub fn default_reason(&self) -> &'static str {
        match self {
            CancelActor::Customer => "Cancelled by customer",
            CancelActor::Admin => "Cancelled by admin",
        }
    }
}
