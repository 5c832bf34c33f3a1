//! Cart lines shared between the cart aggregate and the gateway.

use common::Money;
use serde::{Deserialize, Serialize};

use crate::product::Product;

/// One product in a cart with its quantity.
///
/// Carries the full product record so totals use the price the shopper
/// saw; the checkout saga re-validates stock against fresh records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// Creates a line for the given product and quantity.
    pub fn new(product: Product, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// Returns quantity × unit price.
    pub fn line_total(&self) -> Money {
        self.product.price.multiply(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::ProductId;

    fn product(price: Money) -> Product {
        Product {
            id: ProductId::new(),
            name: "Cardamom".to_string(),
            description: String::new(),
            price,
            category: "Whole Spices".to_string(),
            stock: 10,
            image_url: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_line_total() {
        let line = CartLine::new(product(Money::from_rupees(150)), 4);
        assert_eq!(line.line_total(), Money::from_rupees(600));
    }
}
