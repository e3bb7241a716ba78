//! Lifecycle states the platform reports for products and orders.

use serde::{Deserialize, Serialize};

/// Product lifecycle status.
///
/// Maps to the platform's product status values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Active,
    #[default]
    Draft,
    Archived,
}

impl ProductStatus {
    /// Whether the product is visible to shoppers.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Draft => write!(f, "Draft"),
            Self::Archived => write!(f, "Archived"),
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" | "active" => Ok(Self::Active),
            "DRAFT" | "draft" => Ok(Self::Draft),
            "ARCHIVED" | "archived" => Ok(Self::Archived),
            _ => Err(format!("invalid product status: {s}")),
        }
    }
}

/// Order status as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Processing => write!(f, "Processing"),
            Self::Shipped => write!(f, "Shipped"),
            Self::Delivered => write!(f, "Delivered"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_status_wire_format() {
        let json = serde_json::to_string(&ProductStatus::Active).unwrap();
        assert_eq!(json, "\"ACTIVE\"");

        let parsed: ProductStatus = serde_json::from_str("\"ARCHIVED\"").unwrap();
        assert_eq!(parsed, ProductStatus::Archived);
    }

    #[test]
    fn test_product_status_from_str() {
        assert_eq!(
            "ACTIVE".parse::<ProductStatus>().unwrap(),
            ProductStatus::Active
        );
        assert_eq!(
            "draft".parse::<ProductStatus>().unwrap(),
            ProductStatus::Draft
        );
        assert!("bogus".parse::<ProductStatus>().is_err());
    }

    #[test]
    fn test_order_status_wire_format() {
        let json = serde_json::to_string(&OrderStatus::Shipped).unwrap();
        assert_eq!(json, "\"shipped\"");
    }
}
