//! Data model for the Spice Heaven storefront.
//!
//! Pure types only: products and categories, the order state machine,
//! shipping validation, cart lines, users and sessions, and the
//! order-query contracts consumed by the read side. No remote calls
//! happen here; orchestration lives in the `checkout` and `cart` crates.

mod cart_line;
mod error;
mod order;
mod product;
mod query;
mod shipping;
mod status;
mod user;

pub use cart_line::CartLine;
pub use error::ValidationError;
pub use order::{CancelActor, NewOrder, Order, OrderItem, OrderPatch, OrderWithItems};
pub use product::{Category, NewProduct, Product, ProductPatch};
pub use query::{OrderPage, OrderQuery, OrderScope, OrderSortField, SortDirection};
pub use shipping::ShippingInfo;
pub use status::OrderStatus;
pub use user::{Role, Session, UserAccount};
