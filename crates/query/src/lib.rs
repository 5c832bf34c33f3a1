//! Read side: paginated order listings and sales reporting.

mod report;
mod service;

pub use report::{BestSeller, SalesReport};
pub use service::{OrderQueryService, QueryError};
