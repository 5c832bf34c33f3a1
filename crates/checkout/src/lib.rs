//! Order lifecycle saga.
//!
//! Drives order placement and cancellation as multi-step sequences of
//! remote calls against the data gateway, with explicit compensation on
//! partial failure. There is no ambient transaction: the stock
//! invariant is enforced by the gateway's atomic conditional stock
//! operation, and this crate's job is to sequence the calls, detect
//! non-success, and undo what can be undone.

mod config;
mod error;
mod orchestrator;

pub use config::CheckoutConfig;
pub use error::{CheckoutError, ProductNames, StockIssue, StockIssues};
pub use orchestrator::CheckoutOrchestrator;
