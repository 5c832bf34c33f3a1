//! Shared types used across the storefront crates.

mod ids;
mod money;

pub use ids::{CategoryId, OrderId, ProductId, UserId};
pub use money::Money;
