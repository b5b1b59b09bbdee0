//! Status enums for orders, items and payments.
//!
//! Values are owned by the backend; these enums only interpret them for
//! display. Unknown strings deserialize to an `Unknown` variant instead of
//! failing the whole response.

use serde::{Deserialize, Serialize};

/// Fulfilment status of a single order item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Placed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl ItemStatus {
    /// Overall status of an order derived from its items.
    ///
    /// All delivered gives delivered, all cancelled gives cancelled.
    /// Otherwise any shipped item wins, then any processing item, then placed.
    #[must_use]
    pub fn aggregate(items: &[Self]) -> Self {
        if items.is_empty() {
            return Self::Placed;
        }
        if items.iter().all(|s| *s == Self::Delivered) {
            return Self::Delivered;
        }
        if items.iter().all(|s| *s == Self::Cancelled) {
            return Self::Cancelled;
        }
        if items.contains(&Self::Shipped) {
            return Self::Shipped;
        }
        if items.contains(&Self::Processing) {
            return Self::Processing;
        }
        Self::Placed
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Placed => "placed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }

    /// Customer-facing label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Placed => "Order Placed",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether a cancellation request may still be raised.
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        matches!(self, Self::Placed | Self::Processing)
    }

    /// Progress through the placed, processing, shipped, delivered timeline.
    #[must_use]
    pub const fn has_reached(&self, step: Self) -> bool {
        const fn rank(s: ItemStatus) -> u8 {
            match s {
                ItemStatus::Placed => 1,
                ItemStatus::Processing => 2,
                ItemStatus::Shipped => 3,
                ItemStatus::Delivered => 4,
                ItemStatus::Cancelled | ItemStatus::Unknown => 0,
            }
        }
        rank(*self) >= rank(step) && rank(step) > 0
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a cancellation request on an order item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationStatus {
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl CancellationStatus {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Cancellation Requested",
            Self::Approved => "Cancellation Approved",
            Self::Rejected => "Cancellation Rejected",
            Self::Unknown => "Cancellation Status Unknown",
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        }
    }
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Razorpay,
    Cod,
    #[serde(other)]
    Unknown,
}

impl PaymentMethod {
    /// Parse a form value. Anything unrecognised is treated as online payment.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "cod" => Self::Cod,
            _ => Self::Razorpay,
        }
    }

    /// The method name the deposit endpoint expects.
    #[must_use]
    pub const fn deposit_method(&self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Razorpay | Self::Unknown => "upi_app",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cod => "Cash on Delivery",
            Self::Razorpay => "Online Payment",
            Self::Unknown => "N/A",
        }
    }
}

/// Payment status reported on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Unknown => "Payment Status Unknown",
        }
    }
}

/// How a coupon's `discountValue` is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    #[default]
    Percentage,
    #[serde(other)]
    Fixed,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ItemStatus::{Cancelled, Delivered, Placed, Processing, Shipped};

    #[test]
    fn test_aggregate_empty_is_placed() {
        assert_eq!(ItemStatus::aggregate(&[]), Placed);
    }

    #[test]
    fn test_aggregate_all_same() {
        assert_eq!(ItemStatus::aggregate(&[Delivered, Delivered]), Delivered);
        assert_eq!(ItemStatus::aggregate(&[Cancelled, Cancelled]), Cancelled);
    }

    #[test]
    fn test_aggregate_mixed() {
        assert_eq!(ItemStatus::aggregate(&[Delivered, Shipped]), Shipped);
        assert_eq!(ItemStatus::aggregate(&[Placed, Processing]), Processing);
        assert_eq!(
            ItemStatus::aggregate(&[Processing, Shipped, Placed]),
            Shipped
        );
        assert_eq!(ItemStatus::aggregate(&[Delivered, Cancelled]), Placed);
        assert_eq!(ItemStatus::aggregate(&[Placed, Cancelled]), Placed);
    }

    #[test]
    fn test_unknown_status_deserializes() {
        let s: ItemStatus = serde_json::from_str("\"returned\"").unwrap();
        assert_eq!(s, ItemStatus::Unknown);
        let s: ItemStatus = serde_json::from_str("\"shipped\"").unwrap();
        assert_eq!(s, Shipped);
    }

    #[test]
    fn test_cancellable() {
        assert!(Placed.is_cancellable());
        assert!(Processing.is_cancellable());
        assert!(!Shipped.is_cancellable());
        assert!(!Delivered.is_cancellable());
    }

    #[test]
    fn test_timeline() {
        assert!(Shipped.has_reached(Processing));
        assert!(!Placed.has_reached(Shipped));
        assert!(!Cancelled.has_reached(Placed));
    }

    #[test]
    fn test_deposit_method_mapping() {
        assert_eq!(PaymentMethod::Cod.deposit_method(), "cod");
        assert_eq!(PaymentMethod::Razorpay.deposit_method(), "upi_app");
        assert_eq!(PaymentMethod::parse("wallet"), PaymentMethod::Razorpay);
        assert_eq!(PaymentMethod::parse("cod"), PaymentMethod::Cod);
    }
}
