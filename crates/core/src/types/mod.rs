//! Core types for MacStorm.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use contact::{ContactError, MobileNumber, Pincode};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use status::*;
