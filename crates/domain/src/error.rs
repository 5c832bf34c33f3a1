//! Field-level validation errors, surfaced before any remote call.

use thiserror::Error;

/// A shipping or catalog field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Shipping address is empty.
    #[error("please enter your shipping address")]
    EmptyAddress,

    /// City is empty.
    #[error("please enter your city")]
    EmptyCity,

    /// Pincode is not a 6-digit number.
    #[error("please enter a valid 6-digit pincode")]
    InvalidPincode,

    /// Mobile number is not a 10-digit number.
    #[error("please enter a valid 10-digit mobile number")]
    InvalidMobile,

    /// Product or category name is empty.
    #[error("name must not be empty")]
    EmptyName,

    /// Product price must be strictly positive.
    #[error("price must be greater than zero")]
    InvalidPrice,
}
