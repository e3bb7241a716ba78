//! Wire types for the platform API.
//!
//! Field names follow the platform's camelCase JSON. Prices travel as
//! decimal strings (`"24.99"`) and deserialize into [`rust_decimal::Decimal`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use vendora_core::{
    AddressId, CartLineId, CollectionId, CustomerId, OrderId, OrderStatus, ProductId,
};

// ─────────────────────────────────────────────────────────────────────────────
// Catalog Types
// ─────────────────────────────────────────────────────────────────────────────

/// A product as exposed by the public catalog endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    /// Collection the product belongs to, if any.
    #[serde(default)]
    pub collection_id: Option<CollectionId>,
}

impl Product {
    /// URL of the first image, if the product has one.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(|image| image.url.as_str())
    }
}

/// A product image.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductImage {
    pub url: String,
    /// Alt text, when the store has set one.
    #[serde(default)]
    pub alt: Option<String>,
}

/// One page of products plus pagination metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

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

/// A collection (surfaced to shoppers as a product category).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Number of products in the collection, when the endpoint reports it.
    #[serde(default)]
    pub product_count: Option<u64>,
}

/// One page of collections plus pagination metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionPage {
    pub collections: Vec<Collection>,
    pub pagination: Pagination,
}

// ─────────────────────────────────────────────────────────────────────────────
// Cart Types
// ─────────────────────────────────────────────────────────────────────────────

/// One line of the server-side cart.
///
/// Lines are keyed by the server-assigned `id`; mutations must use that id,
/// never the product id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCartLine {
    pub id: CartLineId,
    pub product_id: ProductId,
    pub quantity: u32,
    /// Catalog snapshot embedded by the platform for display.
    #[serde(default)]
    pub product: Option<CartLineProduct>,
}

/// Catalog details the platform embeds in a cart line.
#[derive(Debug, Clone, Deserialize)]
pub struct CartLineProduct {
    pub title: String,
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

/// Wire shape of `GET /cart` data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPayload {
    pub cart_items: Vec<ServerCartLine>,
}

/// Input line for the cart add endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    pub product_id: ProductId,
    pub quantity: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth & Profile Types
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for `POST /auth/send-otp`.
///
/// Names are only present on the signup path; the platform creates the
/// account on first verification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Successful OTP verification: a session token plus the customer record.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub customer: Customer,
}

/// A customer account.
#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
}

impl Customer {
    /// Display name, falling back to the email's local part.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }
}

/// Wire shape of `GET /profile` data.
#[derive(Debug, Deserialize)]
pub struct ProfilePayload {
    pub user: Customer,
}

/// Request body for `PUT /profile`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateProfileRequest {
    pub name: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Billing Address Types
// ─────────────────────────────────────────────────────────────────────────────

/// Address fields as entered by the customer.
///
/// Doubles as the request body for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressFields {
    pub first_name: String,
    pub last_name: String,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A billing record as the platform stores it: address fields nested under
/// `address`, metadata alongside.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingRecord {
    pub id: AddressId,
    pub address: AddressFields,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A saved address, flattened for the rest of the app.
#[derive(Debug, Clone)]
pub struct Address {
    pub id: AddressId,
    pub first_name: String,
    pub last_name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
    pub is_default: bool,
}

impl Address {
    /// Recipient name for display.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Single-line summary: street, city, postal code.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.address_line1, self.city, self.state, self.postal_code
        )
    }
}

impl From<BillingRecord> for Address {
    fn from(record: BillingRecord) -> Self {
        let AddressFields {
            first_name,
            last_name,
            address_line1,
            address_line2,
            city,
            state,
            postal_code,
            country,
            phone,
        } = record.address;

        Self {
            id: record.id,
            first_name,
            last_name,
            address_line1,
            address_line2,
            city,
            state,
            postal_code,
            country,
            phone,
            is_default: record.is_default,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Order Types
// ─────────────────────────────────────────────────────────────────────────────

/// An order as returned by the order endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub total: Decimal,
    #[serde(default)]
    pub item_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body for `POST /orders`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub address_id: AddressId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Content & Contact Types
// ─────────────────────────────────────────────────────────────────────────────

/// A content page (policies, about page) keyed by slug.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub file_key: String,
    pub file_data: ContentData,
}

/// The editable body of a content page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentData {
    pub title: String,
    /// Pre-rendered HTML maintained by the store owner.
    pub content: String,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Request body for `POST /contact`.
#[derive(Debug, Clone, Serialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_page_deserializes_camel_case() {
        let json = r#"{
            "products": [
                {
                    "id": "p_1",
                    "title": "Desk Lamp",
                    "price": "24.99",
                    "images": [{"url": "https://cdn.test/lamp.jpg"}],
                    "collectionId": "col_9"
                }
            ],
            "pagination": {"page": 1, "limit": 12, "total": 1, "totalPages": 1}
        }"#;

        let page: ProductPage = serde_json::from_str(json).unwrap();
        let product = page.products.first().unwrap();
        assert_eq!(product.title, "Desk Lamp");
        assert_eq!(product.price, Decimal::new(2499, 2));
        assert_eq!(product.primary_image(), Some("https://cdn.test/lamp.jpg"));
        assert!(!page.pagination.has_next());
        assert!(!page.pagination.has_prev());
    }

    #[test]
    fn test_cart_payload_deserializes_embedded_product() {
        let json = r#"{
            "cartItems": [
                {
                    "id": "line_1",
                    "productId": "p_1",
                    "quantity": 2,
                    "product": {"title": "Desk Lamp", "price": "24.99", "images": []}
                }
            ]
        }"#;

        let payload: CartPayload = serde_json::from_str(json).unwrap();
        let line = payload.cart_items.first().unwrap();
        assert_eq!(line.id.as_str(), "line_1");
        assert_eq!(line.quantity, 2);
        assert_eq!(line.product.as_ref().unwrap().title, "Desk Lamp");
    }

    #[test]
    fn test_billing_record_flattens_to_address() {
        let json = r#"{
            "id": "addr_1",
            "address": {
                "firstName": "Ada",
                "lastName": "Lovelace",
                "addressLine1": "12 Analytical Way",
                "city": "London",
                "state": "LDN",
                "postalCode": "EC1",
                "country": "GB"
            },
            "isDefault": true,
            "createdAt": "2026-01-05T12:00:00Z"
        }"#;

        let record: BillingRecord = serde_json::from_str(json).unwrap();
        let address = Address::from(record);
        assert_eq!(address.id.as_str(), "addr_1");
        assert_eq!(address.first_name, "Ada");
        assert_eq!(address.city, "London");
        assert!(address.is_default);
        assert_eq!(address.summary(), "12 Analytical Way, London, LDN EC1");
    }

    #[test]
    fn test_send_otp_request_omits_absent_names() {
        let login = SendOtpRequest {
            email: "a@b.test".to_string(),
            first_name: None,
            last_name: None,
        };
        let json = serde_json::to_string(&login).unwrap();
        assert_eq!(json, r#"{"email":"a@b.test"}"#);

        let signup = SendOtpRequest {
            email: "a@b.test".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
        };
        let json = serde_json::to_string(&signup).unwrap();
        assert!(json.contains("\"firstName\":\"Ada\""));
    }

    #[test]
    fn test_customer_display_name_falls_back_to_email() {
        let named: Customer =
            serde_json::from_str(r#"{"id":"c_1","name":"Ada","email":"ada@b.test"}"#).unwrap();
        assert_eq!(named.display_name(), "Ada");

        let anonymous: Customer =
            serde_json::from_str(r#"{"id":"c_2","email":"grace@b.test"}"#).unwrap();
        assert_eq!(anonymous.display_name(), "grace");
    }
}
