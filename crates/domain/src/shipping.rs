//! Shipping details captured at checkout.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Shipping fields required to place an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    /// Street address (free text, required).
    pub address: String,

    /// City (required).
    pub city: String,

    /// 6-digit postal pincode.
    pub pincode: String,

    /// 10-digit mobile number.
    pub mobile: String,
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

impl ShippingInfo {
    /// Creates shipping info from its fields.
    pub fn new(
        address: impl Into<String>,
        city: impl Into<String>,
        pincode: impl Into<String>,
        mobile: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            city: city.into(),
            pincode: pincode.into(),
            mobile: mobile.into(),
        }
    }

    /// Validates all fields, reporting the first failure.
    ///
    /// Address and city must be non-empty after trimming; the pincode
    /// must be exactly 6 digits and the mobile number exactly 10.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.address.trim().is_empty() {
            return Err(ValidationError::EmptyAddress);
        }
        if self.city.trim().is_empty() {
            return Err(ValidationError::EmptyCity);
        }
        if !is_digits(&self.pincode, 6) {
            return Err(ValidationError::InvalidPincode);
        }
        if !is_digits(&self.mobile, 10) {
            return Err(ValidationError::InvalidMobile);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ShippingInfo {
        ShippingInfo::new("12 Spice Lane", "Kochi", "682001", "9876543210")
    }

    #[test]
    fn test_valid_shipping_info() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_blank_address_rejected() {
        let mut info = valid();
        info.address = "   ".to_string();
        assert_eq!(info.validate(), Err(ValidationError::EmptyAddress));
    }

    #[test]
    fn test_blank_city_rejected() {
        let mut info = valid();
        info.city = String::new();
        assert_eq!(info.validate(), Err(ValidationError::EmptyCity));
    }

    #[test]
    fn test_pincode_must_be_six_digits() {
        for bad in ["68200", "6820011", "68200a", "68 001"] {
            let mut info = valid();
            info.pincode = bad.to_string();
            assert_eq!(info.validate(), Err(ValidationError::InvalidPincode));
        }
    }

    #[test]
    fn test_mobile_must_be_ten_digits() {
        for bad in ["987654321", "98765432101", "98765abc10"] {
            let mut info = valid();
            info.mobile = bad.to_string();
            assert_eq!(info.validate(), Err(ValidationError::InvalidMobile));
        }
    }
}
