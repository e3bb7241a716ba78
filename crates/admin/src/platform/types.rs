//! Wire types for the owner-side platform API.
//!
//! Field names follow the platform's camelCase JSON. Prices travel as
//! decimal strings (`"24.99"`) and deserialize into [`rust_decimal::Decimal`].
//! Unlike the public catalog, owner endpoints return products in every
//! lifecycle status and include merchandising fields (SKU, stock).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use vendora_core::{CollectionId, ProductId, ProductStatus, StoreId};

// ─────────────────────────────────────────────────────────────────────────────
// Store Types
// ─────────────────────────────────────────────────────────────────────────────

/// The store record returned by `GET /store/{id}`.
///
/// Fetching it with a candidate Bearer key doubles as key validation: the
/// platform only serves the record to a key scoped to this store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDetails {
    pub id: StoreId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub support_phone: Option<String>,
}

/// Request body for `PUT /settings`.
///
/// Mirrors the editable subset of [`StoreDetails`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_phone: Option<String>,
}

/// Dashboard counters returned by `GET /admin/overview`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreOverview {
    #[serde(default)]
    pub total_products: u64,
    #[serde(default)]
    pub active_products: u64,
    #[serde(default)]
    pub total_categories: u64,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub pending_orders: u64,
    #[serde(default)]
    pub total_customers: u64,
    /// Lifetime revenue, when the platform reports it.
    #[serde(default)]
    pub revenue: Option<Decimal>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Category Types
// ─────────────────────────────────────────────────────────────────────────────

/// A category as exposed by the owner endpoints.
///
/// Shoppers see these as "collections"; the owner API calls them categories.
/// Same entity, one id space.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CollectionId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub product_count: Option<u64>,
}

/// Request body for category create and update.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One page of categories plus pagination metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryPage {
    pub categories: Vec<Category>,
    pub pagination: Pagination,
}

// ─────────────────────────────────────────────────────────────────────────────
// Product Types
// ─────────────────────────────────────────────────────────────────────────────

/// A product as exposed by the owner endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProduct {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub category_id: Option<CollectionId>,
}

impl AdminProduct {
    /// URL of the first image, if the product has one.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(|image| image.url.as_str())
    }

    /// CSS badge class for the status column.
    #[must_use]
    pub const fn status_class(&self) -> &'static str {
        match self.status {
            ProductStatus::Active => "active",
            ProductStatus::Draft => "draft",
            ProductStatus::Archived => "archived",
        }
    }
}

/// A product image. Owners supply these by URL; the platform hosts binaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// Request body for product create and update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub status: ProductStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    pub images: Vec<ProductImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CollectionId>,
}

/// One page of products plus pagination metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminProductPage {
    pub products: Vec<AdminProduct>,
    pub pagination: Pagination,
}

// ─────────────────────────────────────────────────────────────────────────────
// Pagination
// ─────────────────────────────────────────────────────────────────────────────

/// Pagination metadata returned by list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Pagination {
    /// Whether a previous page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether a next page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_product_deserializes_owner_fields() {
        let json = r#"{
            "id": "p_1",
            "title": "Desk Lamp",
            "price": "24.99",
            "sku": "LAMP-001",
            "status": "DRAFT",
            "stock": 14,
            "images": [{"url": "https://cdn.test/lamp.jpg", "alt": "lamp"}],
            "categoryId": "cat_3"
        }"#;

        let product: AdminProduct = serde_json::from_str(json).unwrap();
        assert_eq!(product.title, "Desk Lamp");
        assert_eq!(product.price, Decimal::new(2499, 2));
        assert_eq!(product.sku.as_deref(), Some("LAMP-001"));
        assert_eq!(product.status, ProductStatus::Draft);
        assert_eq!(product.stock, Some(14));
        assert_eq!(product.primary_image(), Some("https://cdn.test/lamp.jpg"));
    }

    #[test]
    fn test_admin_product_defaults_sparse_records() {
        // Older products can miss merchandising fields entirely.
        let json = r#"{"id": "p_2", "title": "Mug", "price": "9.00"}"#;

        let product: AdminProduct = serde_json::from_str(json).unwrap();
        assert_eq!(product.status, ProductStatus::Draft);
        assert!(product.sku.is_none());
        assert!(product.stock.is_none());
        assert!(product.images.is_empty());
        assert!(product.primary_image().is_none());
    }

    #[test]
    fn test_product_input_serializes_camel_case_and_skips_absent() {
        let input = ProductInput {
            title: "Mug".to_string(),
            description: None,
            price: Decimal::new(900, 2),
            sku: None,
            status: ProductStatus::Active,
            stock: None,
            images: vec![],
            category_id: Some(CollectionId::new("cat_3")),
        };

        let json = serde_json::to_string(&input).unwrap();
        assert!(json.contains("\"status\":\"ACTIVE\""));
        assert!(json.contains("\"categoryId\":\"cat_3\""));
        assert!(!json.contains("sku"));
        assert!(!json.contains("description"));
    }

    #[test]
    fn test_category_page_deserializes() {
        let json = r#"{
            "categories": [
                {"id": "cat_1", "name": "Lighting", "productCount": 8},
                {"id": "cat_2", "name": "Kitchen"}
            ],
            "pagination": {"page": 1, "limit": 50, "total": 2, "totalPages": 1}
        }"#;

        let page: CategoryPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.categories.len(), 2);
        assert_eq!(page.categories.first().unwrap().product_count, Some(8));
        assert!(page.categories.last().unwrap().description.is_none());
        assert!(!page.pagination.has_next());
    }

    #[test]
    fn test_overview_tolerates_missing_counters() {
        let json = r#"{"totalProducts": 12, "totalOrders": 3, "revenue": "149.50"}"#;

        let overview: StoreOverview = serde_json::from_str(json).unwrap();
        assert_eq!(overview.total_products, 12);
        assert_eq!(overview.total_orders, 3);
        assert_eq!(overview.total_categories, 0);
        assert_eq!(overview.revenue, Some(Decimal::new(14950, 2)));
    }

    #[test]
    fn test_settings_input_skips_absent_fields() {
        let input = SettingsInput {
            name: "Vendora Outfitters".to_string(),
            description: None,
            contact_email: Some("owner@vendora.test".to_string()),
            support_phone: None,
        };

        let json = serde_json::to_string(&input).unwrap();
        assert!(json.contains("\"contactEmail\":\"owner@vendora.test\""));
        assert!(!json.contains("supportPhone"));
        assert!(!json.contains("description"));
    }
}
