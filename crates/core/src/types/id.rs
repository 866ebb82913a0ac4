//! Newtype IDs for type-safe entity references.
//!
//! The backend hands out opaque string identifiers. Use the `define_id!` macro
//! to wrap them so a SKU id can never be passed where a product id is expected.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `AsRef<str>` implementations
///
/// The expanding crate must depend on `serde`.
///
/// # Example
///
/// ```rust
/// # use digi_core::define_id;
/// define_id!(CouponId);
/// define_id!(CampaignId);
///
/// let coupon = CouponId::new("c-1");
/// assert_eq!(coupon.as_str(), "c-1");
///
/// // These are different types, so this won't compile:
/// // let _: CampaignId = coupon;
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
            PartialOrd,
            Ord,
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

            /// Borrow the raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the raw identifier.
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

define_id!(UserId);
define_id!(ProductId);
define_id!(SkuId);
define_id!(LicenseId);
define_id!(ReviewId);
define_id!(OrderId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let sku = SkuId::new("sku-42");
        assert_eq!(serde_json::to_string(&sku).unwrap(), "\"sku-42\"");

        let parsed: SkuId = serde_json::from_str("\"sku-42\"").unwrap();
        assert_eq!(parsed, sku);
    }

    #[test]
    fn test_display_and_conversions() {
        let product = ProductId::from("6331b1f0");
        assert_eq!(product.to_string(), "6331b1f0");
        assert_eq!(product.as_ref(), "6331b1f0");
        assert_eq!(product.into_inner(), "6331b1f0".to_string());
    }
}
