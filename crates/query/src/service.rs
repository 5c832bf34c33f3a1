//! Order listing service.

use std::sync::Arc;

use common::OrderId;
use domain::{OrderPage, OrderQuery, OrderStatus, OrderWithItems};
use gateway::{Gateway, GatewayError};
use thiserror::Error;

use crate::report::SalesReport;

/// Errors surfaced by the read side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// No order exists with the given id.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Paginated order listings plus single-order lookup.
pub struct OrderQueryService<G> {
    gateway: Arc<G>,
}

impl<G> Clone for OrderQueryService<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
        }
    }
}

impl<G: Gateway + 'static> OrderQueryService<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Runs a listing query and wraps the result page with its
    /// pagination metadata.
    #[tracing::instrument(skip(self, query), fields(page = query.page))]
    pub async fn orders(&self, query: &OrderQuery) -> Result<OrderPage, QueryError> {
        let (orders, total_count) = self.gateway.fetch_orders_page(query).await?;
        Ok(OrderPage {
            orders,
            total_count,
            page: query.page,
            page_size: query.page_size,
        })
    }

    /// Fetches one order with its item snapshots.
    pub async fn order_details(&self, id: OrderId) -> Result<OrderWithItems, QueryError> {
        let order = self
            .gateway
            .fetch_order(id)
            .await?
            .ok_or(QueryError::OrderNotFound(id))?;
        let items = self.gateway.fetch_order_items(id).await?;
        Ok(OrderWithItems { order, items })
    }

    /// Aggregates a sales report over all delivered orders.
    ///
    /// Pages through the full delivered set; only delivered orders
    /// count as realized sales.
    #[tracing::instrument(skip(self))]
    pub async fn sales_report(&self) -> Result<SalesReport, QueryError> {
        let mut query = OrderQuery::all_orders();
        query.status = Some(OrderStatus::Delivered);
        query.page_size = 100;

        let mut delivered = Vec::new();
        loop {
            let (page, total) = self.gateway.fetch_orders_page(&query).await?;
            let done = page.is_empty() || delivered.len() as u64 + page.len() as u64 >= total;
            delivered.extend(page);
            if done {
                break;
            }
            query.page += 1;
        }

        Ok(SalesReport::from_orders(&delivered))
    }
}
