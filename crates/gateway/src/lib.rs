//! Remote data gateway surface consumed by the storefront core.
//!
//! The hosted backend (persistence, auth, stock procedures) is an
//! external collaborator; this crate defines the typed surface the rest
//! of the workspace talks to, plus an in-memory implementation used by
//! tests and the demo binary.

mod error;
mod memory;
mod store;

pub use error::GatewayError;
pub use memory::InMemoryGateway;
pub use store::{Gateway, StockOp};
