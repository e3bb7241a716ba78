//! Owner API client.
//!
//! Store management endpoints authorized with the store's API key. The key
//! never appears in logs or spans: methods taking key material skip it in
//! `#[instrument]` and the config redacts it from `Debug`.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use vendora_core::{CollectionId, ProductId, ProductStatus, StoreId};

use super::types::{
    AdminProduct, AdminProductPage, Category, CategoryInput, CategoryPage, ProductInput,
    SettingsInput, StoreDetails, StoreOverview,
};
use super::{PlatformError, decode_envelope};
use crate::config::PlatformConfig;

/// Products shown per dashboard page.
pub const PRODUCTS_PER_PAGE: u32 = 20;

/// Categories fetched per page. High enough that the table sees all of them
/// for any realistic store.
const CATEGORIES_PER_PAGE: u32 = 50;

/// Client for the owner-side platform API.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    http: reqwest::Client,
    base_url: String,
    store_id: StoreId,
    api_key: SecretString,
}

impl AdminClient {
    /// Create a new owner API client.
    #[must_use]
    pub fn new(config: &PlatformConfig) -> Self {
        Self {
            inner: Arc::new(AdminClientInner {
                http: reqwest::Client::new(),
                base_url: config.api_base_url.trim_end_matches('/').to_string(),
                store_id: config.store_id.clone(),
                api_key: config.api_key.clone(),
            }),
        }
    }

    fn store_url(&self) -> String {
        format!("{}/store/{}", self.inner.base_url, self.inner.store_id)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.store_url(), path)
    }

    fn key(&self) -> &str {
        self.inner.api_key.expose_secret()
    }

    // ─── Store ───────────────────────────────────────────────────────────────

    /// Validate a candidate API key by fetching the store record with it.
    ///
    /// The platform only serves `GET /store/{id}` to a key scoped to this
    /// store, so a success here authenticates the owner. The candidate is
    /// never logged.
    #[instrument(skip(self, candidate))]
    pub async fn validate_key(&self, candidate: &str) -> Result<StoreDetails, PlatformError> {
        let response = self
            .inner
            .http
            .get(self.store_url())
            .bearer_auth(candidate)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<StoreDetails>(response).await?;
        envelope.into_data(status)
    }

    /// Fetch the store record with the configured key.
    #[instrument(skip(self))]
    pub async fn store_details(&self) -> Result<StoreDetails, PlatformError> {
        let response = self
            .inner
            .http
            .get(self.store_url())
            .bearer_auth(self.key())
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<StoreDetails>(response).await?;
        envelope.into_data(status)
    }

    /// Update the store settings.
    #[instrument(skip(self, input))]
    pub async fn update_settings(&self, input: &SettingsInput) -> Result<(), PlatformError> {
        let response = self
            .inner
            .http
            .put(self.url("settings"))
            .bearer_auth(self.key())
            .json(input)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<serde_json::Value>(response).await?;
        envelope.into_unit(status)
    }

    /// Fetch the dashboard counters.
    #[instrument(skip(self))]
    pub async fn overview(&self) -> Result<StoreOverview, PlatformError> {
        let response = self
            .inner
            .http
            .get(self.url("admin/overview"))
            .bearer_auth(self.key())
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<StoreOverview>(response).await?;
        envelope.into_data(status)
    }

    // ─── Categories ──────────────────────────────────────────────────────────

    /// Fetch one page of categories.
    #[instrument(skip(self))]
    pub async fn list_categories(&self, page: u32) -> Result<CategoryPage, PlatformError> {
        let params = [
            ("page", page.max(1).to_string()),
            ("limit", CATEGORIES_PER_PAGE.to_string()),
        ];

        let response = self
            .inner
            .http
            .get(self.url("categories"))
            .bearer_auth(self.key())
            .query(&params)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<CategoryPage>(response).await?;
        envelope.into_data(status)
    }

    /// Fetch a single category by ID.
    #[instrument(skip(self))]
    pub async fn get_category(
        &self,
        category_id: &CollectionId,
    ) -> Result<Category, PlatformError> {
        let response = self
            .inner
            .http
            .get(self.url(&format!("categories/{category_id}")))
            .bearer_auth(self.key())
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<Category>(response).await?;
        envelope.into_data(status)
    }

    /// Create a category.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, PlatformError> {
        let response = self
            .inner
            .http
            .post(self.url("categories"))
            .bearer_auth(self.key())
            .json(input)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<Category>(response).await?;
        envelope.into_data(status)
    }

    /// Update a category.
    #[instrument(skip(self, input))]
    pub async fn update_category(
        &self,
        category_id: &CollectionId,
        input: &CategoryInput,
    ) -> Result<(), PlatformError> {
        let response = self
            .inner
            .http
            .put(self.url(&format!("categories/{category_id}")))
            .bearer_auth(self.key())
            .json(input)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<serde_json::Value>(response).await?;
        envelope.into_unit(status)
    }

    /// Delete a category.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, category_id: &CollectionId) -> Result<(), PlatformError> {
        let response = self
            .inner
            .http
            .delete(self.url(&format!("categories/{category_id}")))
            .bearer_auth(self.key())
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<serde_json::Value>(response).await?;
        envelope.into_unit(status)
    }

    // ─── Products ────────────────────────────────────────────────────────────

    /// Fetch one page of products, optionally filtered by status.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        page: u32,
        status: Option<ProductStatus>,
    ) -> Result<AdminProductPage, PlatformError> {
        let mut params: Vec<(&str, String)> = vec![
            ("page", page.max(1).to_string()),
            ("limit", PRODUCTS_PER_PAGE.to_string()),
        ];
        if let Some(status) = status {
            params.push(("status", status.to_string().to_uppercase()));
        }

        let response = self
            .inner
            .http
            .get(self.url("admin/products"))
            .bearer_auth(self.key())
            .query(&params)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<AdminProductPage>(response).await?;
        envelope.into_data(status)
    }

    /// Fetch a single product by ID.
    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<AdminProduct, PlatformError> {
        let response = self
            .inner
            .http
            .get(self.url(&format!("admin/products/{product_id}")))
            .bearer_auth(self.key())
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<AdminProduct>(response).await?;
        envelope.into_data(status)
    }

    /// Create a product.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<AdminProduct, PlatformError> {
        let response = self
            .inner
            .http
            .post(self.url("admin/products"))
            .bearer_auth(self.key())
            .json(input)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<AdminProduct>(response).await?;
        envelope.into_data(status)
    }

    /// Update a product.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        product_id: &ProductId,
        input: &ProductInput,
    ) -> Result<(), PlatformError> {
        let response = self
            .inner
            .http
            .put(self.url(&format!("admin/products/{product_id}")))
            .bearer_auth(self.key())
            .json(input)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<serde_json::Value>(response).await?;
        envelope.into_unit(status)
    }

    /// Delete a product.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: &ProductId) -> Result<(), PlatformError> {
        let response = self
            .inner
            .http
            .delete(self.url(&format!("admin/products/{product_id}")))
            .bearer_auth(self.key())
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<serde_json::Value>(response).await?;
        envelope.into_unit(status)
    }
}
