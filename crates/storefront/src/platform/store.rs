//! Public store API client.
//!
//! Catalog, content, and contact endpoints scoped by store ID. These are
//! unauthenticated: the store ID is the only addressing the platform needs.

use std::sync::Arc;

use tracing::instrument;

use vendora_core::{CollectionId, ProductId, StoreId};

use super::types::{
    Collection, CollectionPage, ContactRequest, ContentItem, Product, ProductPage,
};
use super::{PlatformError, decode_envelope};
use crate::config::PlatformConfig;

/// Products shown per catalog page.
pub const PRODUCTS_PER_PAGE: u32 = 12;

/// Collections fetched per page. High enough that the sidebar sees all of
/// them for any realistic store.
const COLLECTIONS_PER_PAGE: u32 = 50;

/// Query for the product list endpoint.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub page: u32,
    pub search: Option<String>,
    pub collection: Option<CollectionId>,
    /// Page size override; defaults to [`PRODUCTS_PER_PAGE`].
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Query for a bare catalog page.
    #[must_use]
    pub const fn page(page: u32) -> Self {
        Self {
            page,
            search: None,
            collection: None,
            limit: None,
        }
    }

    /// Override the default page size.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Client for the public store API.
#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<StoreClientInner>,
}

struct StoreClientInner {
    http: reqwest::Client,
    base_url: String,
    store_id: StoreId,
}

impl StoreClient {
    /// Create a new store API client.
    #[must_use]
    pub fn new(config: &PlatformConfig) -> Self {
        Self {
            inner: Arc::new(StoreClientInner {
                http: reqwest::Client::new(),
                base_url: config.api_base_url.trim_end_matches('/').to_string(),
                store_id: config.store_id.clone(),
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/store/{}/public/{}",
            self.inner.base_url, self.inner.store_id, path
        )
    }

    /// Fetch one page of products, optionally filtered.
    #[instrument(skip(self))]
    pub async fn get_products(&self, query: &ProductQuery) -> Result<ProductPage, PlatformError> {
        let mut params: Vec<(&str, String)> = vec![
            ("page", query.page.max(1).to_string()),
            ("limit", query.limit.unwrap_or(PRODUCTS_PER_PAGE).to_string()),
        ];
        if let Some(search) = query.search.as_deref() {
            params.push(("search", search.to_string()));
        }
        if let Some(collection) = &query.collection {
            params.push(("collection", collection.to_string()));
        }

        let response = self
            .inner
            .http
            .get(self.url("products"))
            .query(&params)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<ProductPage>(response).await?;
        envelope.into_data(status)
    }

    /// Fetch a single product by ID.
    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<Product, PlatformError> {
        let response = self
            .inner
            .http
            .get(self.url(&format!("products/{product_id}")))
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<Product>(response).await?;
        envelope.into_data(status)
    }

    /// Fetch the store's collections.
    #[instrument(skip(self))]
    pub async fn get_collections(&self, page: u32) -> Result<CollectionPage, PlatformError> {
        let params = [
            ("page", page.max(1).to_string()),
            ("limit", COLLECTIONS_PER_PAGE.to_string()),
        ];

        let response = self
            .inner
            .http
            .get(self.url("collections"))
            .query(&params)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<CollectionPage>(response).await?;
        envelope.into_data(status)
    }

    /// Fetch a single collection by ID.
    #[instrument(skip(self))]
    pub async fn get_collection(
        &self,
        collection_id: &CollectionId,
    ) -> Result<Collection, PlatformError> {
        let response = self
            .inner
            .http
            .get(self.url(&format!("collections/{collection_id}")))
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<Collection>(response).await?;
        envelope.into_data(status)
    }

    /// Fetch a content page (policy, about page) by slug.
    #[instrument(skip(self))]
    pub async fn get_content(&self, slug: &str) -> Result<ContentItem, PlatformError> {
        let response = self
            .inner
            .http
            .get(self.url(&format!("content/{slug}")))
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<ContentItem>(response).await?;
        envelope.into_data(status)
    }

    /// Submit a contact form message.
    #[instrument(skip(self, request))]
    pub async fn submit_contact(&self, request: &ContactRequest) -> Result<(), PlatformError> {
        let response = self
            .inner
            .http
            .post(self.url("contact"))
            .json(request)
            .send()
            .await?;

        let (status, envelope) = decode_envelope::<serde_json::Value>(response).await?;
        envelope.into_unit(status)
    }
}
