//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use vendora_core::{CollectionId, CurrencyCode, Price, ProductId};

use crate::error::Result;
use crate::filters;
use crate::platform::store::ProductQuery;
use crate::platform::types::{Collection, Pagination, Product};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Product card display data for grids.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub title: String,
    pub price: String,
    pub image: Option<ImageView>,
}

/// Product detail display data.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: String,
    pub images: Vec<ImageView>,
}

/// A product image ready for the template.
#[derive(Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

/// Collection link for the catalog sidebar.
#[derive(Clone)]
pub struct CollectionLinkView {
    pub id: String,
    pub name: String,
    pub active: bool,
}

/// Pagination display data.
#[derive(Clone)]
pub struct PaginationView {
    pub page: u32,
    pub total_pages: u32,
    pub has_prev: bool,
    pub has_next: bool,
    pub prev_page: u32,
    pub next_page: u32,
}

impl From<&Pagination> for PaginationView {
    fn from(pagination: &Pagination) -> Self {
        Self {
            page: pagination.page,
            total_pages: pagination.total_pages,
            has_prev: pagination.has_prev(),
            has_next: pagination.has_next(),
            prev_page: pagination.page.saturating_sub(1).max(1),
            next_page: pagination.page.saturating_add(1),
        }
    }
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            price: Price::new(product.price, CurrencyCode::USD).to_string(),
            image: product.images.first().map(|image| ImageView {
                url: image.url.clone(),
                alt: image.alt.clone().unwrap_or_else(|| product.title.clone()),
            }),
        }
    }
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            description: product.description.clone(),
            price: Price::new(product.price, CurrencyCode::USD).to_string(),
            images: product
                .images
                .iter()
                .map(|image| ImageView {
                    url: image.url.clone(),
                    alt: image.alt.clone().unwrap_or_else(|| product.title.clone()),
                })
                .collect(),
        }
    }
}

// =============================================================================
// Query Types
// =============================================================================

/// Catalog listing query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub collection: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductCardView>,
    pub collections: Vec<CollectionLinkView>,
    pub pagination: PaginationView,
    /// Echo of the search box contents.
    pub search: String,
    /// Currently selected collection filter, if any.
    pub collection: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductDetailView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the product listing page with search and collection filters.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse> {
    let search = query.search.as_deref().unwrap_or("").trim().to_string();
    let collection_filter = query
        .collection
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(CollectionId::new);

    let mut product_query = ProductQuery::page(query.page.unwrap_or(1));
    if !search.is_empty() {
        product_query.search = Some(search.clone());
    }
    product_query.collection = collection_filter.clone();

    let page = state.store().get_products(&product_query).await?;

    // Collection sidebar is decoration; an error leaves it empty.
    let collections = state.store().get_collections(1).await.map_or_else(
        |error| {
            tracing::warn!(%error, "failed to fetch collections for sidebar");
            Vec::new()
        },
        |collections| {
            collections
                .collections
                .iter()
                .map(|collection| collection_link(collection, collection_filter.as_ref()))
                .collect()
        },
    );

    Ok(ProductsIndexTemplate {
        products: page.products.iter().map(ProductCardView::from).collect(),
        collections,
        pagination: PaginationView::from(&page.pagination),
        search,
        collection: collection_filter.map(|id| id.to_string()),
    })
}

fn collection_link(collection: &Collection, selected: Option<&CollectionId>) -> CollectionLinkView {
    CollectionLinkView {
        id: collection.id.to_string(),
        name: collection.name.clone(),
        active: selected == Some(&collection.id),
    }
}

/// Display the product detail page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse> {
    let product = state
        .store()
        .get_product(&ProductId::new(product_id))
        .await?;

    Ok(ProductShowTemplate {
        product: ProductDetailView::from(&product),
    })
}
