//! Customer API client.
//!
//! Account endpoints scoped by store ID and authorized per request with the
//! customer's session token in the `X-Auth-Token` header. The token lives
//! in the server-side session, never in a client-visible cookie of its own.
//!
//! The cart methods implement [`CartApi`], which is how the cart façade
//! reaches the server cart.

use std::sync::Arc;

use tracing::instrument;

use vendora_core::{AddressId, CartLineId, ProductId, StoreId};

use super::types::{
    Address, AddressFields, AuthSession, BillingRecord, CartItemInput, CartPayload, Customer,
    Order, PlaceOrderRequest, ProfilePayload, SendOtpRequest, ServerCartLine,
    UpdateProfileRequest,
};
use super::{PlatformError, decode_envelope};
use crate::cart::CartApi;
use crate::config::PlatformConfig;

/// Header carrying the customer session token.
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Client for customer-scoped platform endpoints.
#[derive(Clone)]
pub struct CustomerClient {
    inner: Arc<CustomerClientInner>,
}

struct CustomerClientInner {
    http: reqwest::Client,
    base_url: String,
    store_id: StoreId,
}

impl CustomerClient {
    /// Create a new customer API client.
    #[must_use]
    pub fn new(config: &PlatformConfig) -> Self {
        Self {
            inner: Arc::new(CustomerClientInner {
                http: reqwest::Client::new(),
                base_url: config.api_base_url.trim_end_matches('/').to_string(),
                store_id: config.store_id.clone(),
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/store/{}/{}",
            self.inner.base_url, self.inner.store_id, path
        )
    }

    // ─────────────────────────────────────────────────────────────────────
    // Authentication
    // ─────────────────────────────────────────────────────────────────────

    /// Request a one-time passcode for an email address.
    ///
    /// On the signup path the request carries the customer's name and the
    /// platform creates the account at first verification.
    #[instrument(skip(self, request))]
    pub async fn send_otp(&self, request: &SendOtpRequest) -> Result<(), PlatformError> {
        let response = self
            .inner
            .http
            .post(self.url("auth/send-otp"))
            .json(request)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<serde_json::Value>(response).await?;
        envelope.into_unit(status)
    }

    /// Exchange a passcode for a session token and customer record.
    #[instrument(skip(self, email, otp))]
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<AuthSession, PlatformError> {
        let body = serde_json::json!({ "email": email, "otp": otp });

        let response = self
            .inner
            .http
            .post(self.url("auth/verify-otp"))
            .json(&body)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<AuthSession>(response).await?;
        envelope.into_data(status)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Profile
    // ─────────────────────────────────────────────────────────────────────

    /// Fetch the customer's profile.
    #[instrument(skip(self, token))]
    pub async fn get_profile(&self, token: &str) -> Result<Customer, PlatformError> {
        let response = self
            .inner
            .http
            .get(self.url("profile"))
            .header(AUTH_TOKEN_HEADER, token)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<ProfilePayload>(response).await?;
        Ok(envelope.into_data(status)?.user)
    }

    /// Update the customer's display name.
    #[instrument(skip(self, token, request))]
    pub async fn update_profile(
        &self,
        token: &str,
        request: &UpdateProfileRequest,
    ) -> Result<Customer, PlatformError> {
        let response = self
            .inner
            .http
            .put(self.url("profile"))
            .header(AUTH_TOKEN_HEADER, token)
            .json(request)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<ProfilePayload>(response).await?;
        Ok(envelope.into_data(status)?.user)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Billing Addresses
    // ─────────────────────────────────────────────────────────────────────

    /// List saved addresses, default address first.
    ///
    /// Flattens the platform's nested `{ id, address, createdAt }` records
    /// into flat [`Address`] values.
    #[instrument(skip(self, token))]
    pub async fn list_addresses(&self, token: &str) -> Result<Vec<Address>, PlatformError> {
        let response = self
            .inner
            .http
            .get(self.url("billing"))
            .header(AUTH_TOKEN_HEADER, token)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<Vec<BillingRecord>>(response).await?;
        let mut addresses: Vec<Address> = envelope
            .into_data(status)?
            .into_iter()
            .map(Address::from)
            .collect();
        addresses.sort_by_key(|address| !address.is_default);
        Ok(addresses)
    }

    /// Save a new address.
    #[instrument(skip(self, token, fields))]
    pub async fn create_address(
        &self,
        token: &str,
        fields: &AddressFields,
    ) -> Result<Address, PlatformError> {
        let response = self
            .inner
            .http
            .post(self.url("billing"))
            .header(AUTH_TOKEN_HEADER, token)
            .json(fields)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<BillingRecord>(response).await?;
        Ok(envelope.into_data(status)?.into())
    }

    /// Update an existing address.
    #[instrument(skip(self, token, fields))]
    pub async fn update_address(
        &self,
        token: &str,
        address_id: &AddressId,
        fields: &AddressFields,
    ) -> Result<Address, PlatformError> {
        let response = self
            .inner
            .http
            .put(self.url(&format!("billing/{address_id}")))
            .header(AUTH_TOKEN_HEADER, token)
            .json(fields)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<BillingRecord>(response).await?;
        Ok(envelope.into_data(status)?.into())
    }

    /// Delete a saved address.
    #[instrument(skip(self, token))]
    pub async fn delete_address(
        &self,
        token: &str,
        address_id: &AddressId,
    ) -> Result<(), PlatformError> {
        let response = self
            .inner
            .http
            .delete(self.url(&format!("billing/{address_id}")))
            .header(AUTH_TOKEN_HEADER, token)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<serde_json::Value>(response).await?;
        envelope.into_unit(status)
    }

    /// Mark an address as the default.
    #[instrument(skip(self, token))]
    pub async fn set_default_address(
        &self,
        token: &str,
        address_id: &AddressId,
    ) -> Result<(), PlatformError> {
        let response = self
            .inner
            .http
            .patch(self.url(&format!("billing/{address_id}/default")))
            .header(AUTH_TOKEN_HEADER, token)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<serde_json::Value>(response).await?;
        envelope.into_unit(status)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Orders
    // ─────────────────────────────────────────────────────────────────────

    /// Place an order from the server cart against a saved address.
    #[instrument(skip(self, token))]
    pub async fn place_order(
        &self,
        token: &str,
        address_id: &AddressId,
    ) -> Result<Order, PlatformError> {
        let request = PlaceOrderRequest {
            address_id: address_id.clone(),
        };

        let response = self
            .inner
            .http
            .post(self.url("orders"))
            .header(AUTH_TOKEN_HEADER, token)
            .json(&request)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<Order>(response).await?;
        envelope.into_data(status)
    }

    /// List the customer's past orders, newest first.
    #[instrument(skip(self, token))]
    pub async fn list_orders(&self, token: &str) -> Result<Vec<Order>, PlatformError> {
        let response = self
            .inner
            .http
            .get(self.url("orders"))
            .header(AUTH_TOKEN_HEADER, token)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<Vec<Order>>(response).await?;
        envelope.into_data(status)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CartApi implementation
// ─────────────────────────────────────────────────────────────────────────────

impl CartApi for CustomerClient {
    #[instrument(skip(self, token))]
    async fn get_cart(&self, token: &str) -> Result<Vec<ServerCartLine>, PlatformError> {
        let response = self
            .inner
            .http
            .get(self.url("cart"))
            .header(AUTH_TOKEN_HEADER, token)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<CartPayload>(response).await?;
        Ok(envelope.into_data(status)?.cart_items)
    }

    #[instrument(skip(self, token))]
    async fn add_to_cart(
        &self,
        token: &str,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), PlatformError> {
        let item = CartItemInput {
            product_id: product_id.clone(),
            quantity,
        };

        let response = self
            .inner
            .http
            .post(self.url("cart/add"))
            .header(AUTH_TOKEN_HEADER, token)
            .json(&item)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<serde_json::Value>(response).await?;
        envelope.into_unit(status)
    }

    #[instrument(skip(self, token, items))]
    async fn add_multiple_to_cart(
        &self,
        token: &str,
        items: &[CartItemInput],
    ) -> Result<(), PlatformError> {
        let body = serde_json::json!({ "items": items });

        let response = self
            .inner
            .http
            .post(self.url("cart/add-multiple"))
            .header(AUTH_TOKEN_HEADER, token)
            .json(&body)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<serde_json::Value>(response).await?;
        envelope.into_unit(status)
    }

    #[instrument(skip(self, token))]
    async fn update_item_quantity(
        &self,
        token: &str,
        item_id: &CartLineId,
        quantity: u32,
    ) -> Result<(), PlatformError> {
        let body = serde_json::json!({ "quantity": quantity });

        let response = self
            .inner
            .http
            .put(self.url(&format!("cart/item/{item_id}")))
            .header(AUTH_TOKEN_HEADER, token)
            .json(&body)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<serde_json::Value>(response).await?;
        envelope.into_unit(status)
    }

    #[instrument(skip(self, token))]
    async fn remove_item(&self, token: &str, item_id: &CartLineId) -> Result<(), PlatformError> {
        let response = self
            .inner
            .http
            .delete(self.url(&format!("cart/item/{item_id}")))
            .header(AUTH_TOKEN_HEADER, token)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<serde_json::Value>(response).await?;
        envelope.into_unit(status)
    }

    #[instrument(skip(self, token))]
    async fn clear_cart(&self, token: &str) -> Result<(), PlatformError> {
        let response = self
            .inner
            .http
            .delete(self.url("cart/clear"))
            .header(AUTH_TOKEN_HEADER, token)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<serde_json::Value>(response).await?;
        envelope.into_unit(status)
    }
}
