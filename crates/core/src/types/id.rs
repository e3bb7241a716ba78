//! Newtype IDs for the platform's entities.
//!
//! The platform API hands out opaque string identifiers. Wrapping each kind
//! in its own type keeps a `ProductId` from ever standing in for an
//! `OrderId`, at no runtime cost.

/// Defines a string-backed ID newtype.
///
/// The generated type derives `Debug`, `Clone`, ordering, hashing, and
/// transparent serde, and offers `new()`, `as_str()`, and `into_inner()`
/// plus `From` conversions from both `String` and `&str`.
///
/// # Example
///
/// ```rust
/// # use vendora_core::define_id;
/// define_id!(CustomerId);
/// define_id!(OrderId);
///
/// let customer_id = CustomerId::new("cus_0193f2");
/// let order_id = OrderId::new("ord_0193f2");
///
/// // Mixing them up is a compile error:
/// // let _: CustomerId = order_id;
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
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
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
define_id!(StoreId);
define_id!(ProductId);
define_id!(CollectionId);
define_id!(CustomerId);
define_id!(CartLineId);
define_id!(AddressId);
define_id!(OrderId);
