//! Sales aggregation over delivered orders.

use std::collections::HashMap;

use common::Money;
use domain::OrderWithItems;
use serde::{Deserialize, Serialize};

/// One product's aggregate in the best-seller ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestSeller {
    pub product_name: String,
    pub units_sold: u64,
    pub revenue: Money,
}

/// Sales figures computed from delivered orders only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReport {
    pub total_sales: Money,
    pub order_count: u64,
    pub average_order_value: Money,
    /// Top products by revenue, at most five, ties broken by name.
    pub best_sellers: Vec<BestSeller>,
}

impl SalesReport {
    const BEST_SELLER_LIMIT: usize = 5;

    /// Builds the report from a set of delivered orders.
    ///
    /// Revenue per product is summed from the item snapshots, so the
    /// figures stay correct even after a product is renamed, repriced,
    /// or deleted from the catalog.
    pub fn from_orders(orders: &[OrderWithItems]) -> Self {
        let total_sales: Money = orders.iter().map(|o| o.order.total_amount).sum();
        let order_count = orders.len() as u64;
        let average_order_value = if order_count == 0 {
            Money::zero()
        } else {
            Money::from_paise(total_sales.paise() / order_count as i64)
        };

        let mut by_product: HashMap<&str, (u64, Money)> = HashMap::new();
        for item in orders.iter().flat_map(|o| o.items.iter()) {
            let entry = by_product
                .entry(item.product_name.as_str())
                .or_insert((0, Money::zero()));
            entry.0 += u64::from(item.quantity);
            entry.1 += item.line_total();
        }

        let mut best_sellers: Vec<BestSeller> = by_product
            .into_iter()
            .map(|(name, (units_sold, revenue))| BestSeller {
                product_name: name.to_string(),
                units_sold,
                revenue,
            })
            .collect();
        best_sellers.sort_by(|a, b| {
            b.revenue
                .paise()
                .cmp(&a.revenue.paise())
                .then_with(|| a.product_name.cmp(&b.product_name))
        });
        best_sellers.truncate(Self::BEST_SELLER_LIMIT);

        Self {
            total_sales,
            order_count,
            average_order_value,
            best_sellers,
        }
    }
}
