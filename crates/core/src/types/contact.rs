//! Indian mobile numbers and postal codes.

use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("Mobile Number is required")]
    MobileRequired,
    #[error("Enter a valid 10-digit mobile number")]
    InvalidMobile,
    #[error("Pincode is required")]
    PincodeRequired,
    #[error("Enter a valid 6-digit pincode")]
    InvalidPincode,
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

/// A 10-digit mobile number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MobileNumber(String);

impl MobileNumber {
    /// # Errors
    ///
    /// Returns [`ContactError::MobileRequired`] for blank input and
    /// [`ContactError::InvalidMobile`] unless it is exactly 10 digits.
    pub fn parse(s: &str) -> Result<Self, ContactError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ContactError::MobileRequired);
        }
        if !is_digits(s, 10) {
            return Err(ContactError::InvalidMobile);
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 6-digit Indian postal code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pincode(String);

impl Pincode {
    /// # Errors
    ///
    /// Returns [`ContactError::PincodeRequired`] for blank input and
    /// [`ContactError::InvalidPincode`] unless it is exactly 6 digits.
    pub fn parse(s: &str) -> Result<Self, ContactError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ContactError::PincodeRequired);
        }
        if !is_digits(s, 6) {
            return Err(ContactError::InvalidPincode);
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mobile_number() {
        assert!(MobileNumber::parse("9876543210").is_ok());
        assert!(MobileNumber::parse(" 9876543210 ").is_ok());
        assert_eq!(MobileNumber::parse(""), Err(ContactError::MobileRequired));
        assert_eq!(
            MobileNumber::parse("98765"),
            Err(ContactError::InvalidMobile)
        );
        assert_eq!(
            MobileNumber::parse("98765432101"),
            Err(ContactError::InvalidMobile)
        );
        assert_eq!(
            MobileNumber::parse("98765x3210"),
            Err(ContactError::InvalidMobile)
        );
    }

    #[test]
    fn test_pincode() {
        assert!(Pincode::parse("560001").is_ok());
        assert_eq!(Pincode::parse("  "), Err(ContactError::PincodeRequired));
        assert_eq!(Pincode::parse("5600"), Err(ContactError::InvalidPincode));
        assert_eq!(Pincode::parse("56000a"), Err(ContactError::InvalidPincode));
        // Non-ASCII digits are rejected
        assert_eq!(Pincode::parse("५६०००१"), Err(ContactError::InvalidPincode));
    }
}
