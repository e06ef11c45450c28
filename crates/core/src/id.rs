//! Strongly-typed identifiers used across the domain.
//!
//! All identifiers are opaque, non-empty strings supplied by callers
//! (warehouse systems, order intake). Nothing here generates identifiers.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Stock-keeping unit: identifies a product type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

/// Identifier of a customer order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderId(String);

/// Reference of a stock batch (identity key of `Batch`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BatchRef(String);

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create an identifier, rejecting blank input.
            pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(DomainError::invalid_id(format!("{} cannot be empty", $name)));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $t {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $t {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $t {
            type Error = DomainError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

impl_string_newtype!(Sku, "Sku");
impl_string_newtype!(OrderId, "OrderId");
impl_string_newtype!(BatchRef, "BatchRef");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_identifiers_are_rejected() {
        assert!(matches!(Sku::new(""), Err(DomainError::InvalidId(_))));
        assert!(matches!(OrderId::new("   "), Err(DomainError::InvalidId(_))));
        assert!(BatchRef::from_str("\t").is_err());
    }

    #[test]
    fn identifiers_keep_their_text_verbatim() {
        let sku = Sku::new("RED-CHAIR").unwrap();
        assert_eq!(sku.as_str(), "RED-CHAIR");
        assert_eq!(sku.to_string(), "RED-CHAIR");
        assert_eq!(sku, "RED-CHAIR");
    }

    #[test]
    fn identifiers_serialize_transparently() {
        let batch_ref = BatchRef::new("batch-001").unwrap();
        let json = serde_json::to_string(&batch_ref).unwrap();
        assert_eq!(json, "\"batch-001\"");

        let back: BatchRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, batch_ref);
        assert!(serde_json::from_str::<BatchRef>("\"  \"").is_err());
    }
}
