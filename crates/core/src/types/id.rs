//! Newtype IDs for type-safe entity references.
//!
//! Document keys in the hosted store are opaque strings, so every ID here
//! wraps a `String`. The `define_id!` macro keeps buyer, seller, and
//! product keys from being mixed up at compile time.

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe ID wrapper around an owned string key.
///
/// Creates a newtype with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `Display`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use sokoni_core::define_id;
/// define_id!(BuyerId);
/// define_id!(ProductId);
///
/// let buyer = BuyerId::new("buyer-1");
/// let product = ProductId::new("prod-1");
///
/// // These are different types, so this won't compile:
/// // let _: BuyerId = product;
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
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string key.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying key.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the underlying key.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
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

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(BuyerId);
define_id!(SellerId);
define_id!(ProductId);

impl ProductId {
    /// Generate a fresh random product ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// A shop's display name.
///
/// Cart items carry the shop name of the seller they came from; per-seller
/// order grouping partitions on this value. There is no enforced relation
/// to [`SellerId`](crate::SellerId) - resolution back to a seller profile
/// is by convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SellerName(String);

impl SellerName {
    /// Create a new shop name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the shop name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SellerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SellerName {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for SellerName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        let id = ProductId::new("prod-42");
        assert_eq!(id.as_str(), "prod-42");
        assert_eq!(format!("{id}"), "prod-42");
        assert_eq!(id.clone().into_inner(), "prod-42");
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = BuyerId::new("buyer-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"buyer-1\"");

        let parsed: BuyerId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_generated_product_ids_are_unique() {
        let a = ProductId::generate();
        let b = ProductId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_seller_name_display() {
        let name = SellerName::new("Kampala Crafts");
        assert_eq!(name.to_string(), "Kampala Crafts");
    }
}
