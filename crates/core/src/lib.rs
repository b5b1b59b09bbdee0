//! MacStorm Core - Shared domain types.
//!
//! The storefront talks to a remote commerce API that owns every entity.
//! This crate holds the small set of validated types the storefront needs
//! to build requests and render responses:
//!
//! - [`types::id`] - string identifiers assigned by the backend
//! - [`types::price`] - rupee amounts with Indian digit grouping
//! - [`types::email`], [`types::contact`] - form-level validation
//! - [`types::status`] - order item, cancellation and payment enums
//!
//! No I/O lives here. No HTTP clients, no sessions, no templates.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
