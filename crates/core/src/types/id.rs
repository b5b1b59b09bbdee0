//! Newtype IDs for type-safe entity references.
//!
//! The backend assigns opaque string identifiers (`_id` in its JSON).
//! Use the `define_id!` macro to create wrappers that prevent accidentally
//! passing an order ID where a product ID is expected.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `Default`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `Display`, `AsRef<str>` and `From<String>`/`From<&str>`
///
/// # Example
///
/// ```rust
/// # use macstorm_core::define_id;
/// define_id!(ShipmentId);
/// define_id!(ParcelId);
///
/// let shipment = ShipmentId::new("6650f1c2");
/// assert_eq!(shipment.as_str(), "6650f1c2");
///
/// // These are different types, so this won't compile:
/// // let _: ParcelId = shipment;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            Default,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::convert::AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }
    };
}

define_id!(UserId);
define_id!(ProductId);
define_id!(CartItemId);
define_id!(OrderId);
define_id!(OrderItemId);
define_id!(AddressId);
define_id!(CouponId);
define_id!(ReviewId);
define_id!(DepositId);

impl OrderId {
    /// Short human-facing order code: the last 8 characters, upper-cased.
    ///
    /// ```rust
    /// # use macstorm_core::OrderId;
    /// let id = OrderId::new("665a0c9e41f2b3d4e5f6a7b8");
    /// assert_eq!(id.short_code(), "E5F6A7B8");
    /// ```
    #[must_use]
    pub fn short_code(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        let start = chars.len().saturating_sub(8);
        chars
            .get(start..)
            .unwrap_or_default()
            .iter()
            .collect::<String>()
            .to_uppercase()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_transparently() {
        let id = ProductId::new("abc123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc123\"");

        let parsed: ProductId = serde_json::from_str("\"abc123\"").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_short_code_takes_last_eight() {
        let id = OrderId::new("665a0c9e41f2b3d4e5f6a7b8");
        assert_eq!(id.short_code(), "E5F6A7B8");
    }

    #[test]
    fn test_short_code_on_short_ids() {
        assert_eq!(OrderId::new("ab12").short_code(), "AB12");
        assert_eq!(OrderId::new("").short_code(), "");
    }

    #[test]
    fn test_display_matches_inner() {
        let id = AddressId::from("addr-1");
        assert_eq!(id.to_string(), "addr-1");
        assert_eq!(id.as_ref(), "addr-1");
    }
}
