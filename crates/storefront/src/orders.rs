//! Order history helpers: cancellation requests and delivery estimates.

use chrono::{Days, NaiveDate};
use macstorm_core::ItemStatus;
use serde::Deserialize;
use thiserror::Error;

use crate::api::types::CancellationRequest;

/// Reasons offered in the cancellation dialog.
pub const CANCELLATION_REASONS: [&str; 6] = [
    "Changed my mind",
    "Found better price",
    "Shipping delay",
    "Wrong item/size",
    "Financial reasons",
    OTHER_REASON,
];

/// The reason that requires a free-text description.
pub const OTHER_REASON: &str = "Others";

pub const CANCELLATION_SUBMITTED: &str =
    "Cancellation request submitted. Waiting for admin approval.";
pub const CANCELLATION_FAILED: &str = "Failed to submit cancellation request";

/// Days added to today for the delivery estimate.
const DELIVERY_ESTIMATE_DAYS: u64 = 10;

/// Timeline steps on the order detail page.
pub const TIMELINE: [ItemStatus; 4] = [
    ItemStatus::Placed,
    ItemStatus::Processing,
    ItemStatus::Shipped,
    ItemStatus::Delivered,
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CancelError {
    #[error("Please provide a reason for cancellation")]
    MissingReason,
    #[error("Please provide description for \"Others\" reason")]
    MissingDescription,
}

/// The cancellation dialog as posted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelForm {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub description: String,
}

impl CancelForm {
    /// Validate into the request body. Only "Others" carries a description.
    ///
    /// # Errors
    ///
    /// Returns [`CancelError`] when the reason is missing or "Others" has
    /// no description.
    pub fn into_request(self) -> Result<CancellationRequest, CancelError> {
        let reason = self.reason.trim();
        if reason.is_empty() {
            return Err(CancelError::MissingReason);
        }
        let description = if reason == OTHER_REASON {
            let description = self.description.trim();
            if description.is_empty() {
                return Err(CancelError::MissingDescription);
            }
            Some(description.to_owned())
        } else {
            None
        };
        Ok(CancellationRequest {
            reason: reason.to_owned(),
            description,
        })
    }
}

/// Expected delivery date for an order placed on `placed_on`.
#[must_use]
pub fn estimated_delivery(placed_on: NaiveDate) -> NaiveDate {
    placed_on
        .checked_add_days(Days::new(DELIVERY_ESTIMATE_DAYS))
        .unwrap_or(placed_on)
}

/// Long date form, e.g. `Friday, 24 October 2025`.
#[must_use]
pub fn long_date(date: NaiveDate) -> String {
    date.format("%A, %-d %B %Y").to_string()
}

/// CSS modifier for a status badge.
#[must_use]
pub const fn status_tone(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::Placed => "info",
        ItemStatus::Processing => "warning",
        ItemStatus::Shipped => "accent",
        ItemStatus::Delivered => "success",
        ItemStatus::Cancelled => "danger",
        ItemStatus::Unknown => "muted",
    }
}
