//! Read contracts for the order query layer.

use chrono::{DateTime, Utc};
use common::UserId;
use serde::{Deserialize, Serialize};

use crate::order::OrderWithItems;
use crate::status::OrderStatus;

/// Whose orders a query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderScope {
    /// A single customer's own orders.
    Customer(UserId),
    /// Every order (admin back-office).
    All,
}

/// Field an order listing is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSortField {
    CreatedAt,
    TotalAmount,
    Status,
    Id,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Flips the direction; used by sortable column headers.
    pub fn toggled(&self) -> SortDirection {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// A paginated, filtered, sorted order listing request.
///
/// Pages are 1-based. Date bounds are inclusive on both ends and apply
/// to the order's creation timestamp. Status filtering is exact-match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQuery {
    pub scope: OrderScope,
    pub page: u32,
    pub page_size: u32,
    pub status: Option<OrderStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub sort_field: OrderSortField,
    pub sort_direction: SortDirection,
}

impl OrderQuery {
    /// Default listing for one customer: newest first, 10 per page.
    pub fn for_customer(user_id: UserId) -> Self {
        Self::with_scope(OrderScope::Customer(user_id))
    }

    /// Default admin listing over all orders.
    pub fn all_orders() -> Self {
        Self::with_scope(OrderScope::All)
    }

    fn with_scope(scope: OrderScope) -> Self {
        Self {
            scope,
            page: 1,
            page_size: 10,
            status: None,
            from: None,
            to: None,
            sort_field: OrderSortField::CreatedAt,
            sort_direction: SortDirection::Desc,
        }
    }

    /// Zero-based offset of the first row on the requested page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.page_size as usize
    }
}

/// One page of orders plus the total count for pagination math.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<OrderWithItems>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
}

impl OrderPage {
    /// Number of pages needed for `total_count` rows.
    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.page_size as u64) as u32
    }

    /// 1-based serial number of the first row on this page, for
    /// numbered listings.
    pub fn first_serial(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64 + 1
    }
}
