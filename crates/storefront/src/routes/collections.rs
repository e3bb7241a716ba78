//! Collection route handlers.
//!
//! Collections are the platform's product grouping; shoppers browse them as
//! categories.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use vendora_core::CollectionId;

use crate::error::Result;
use crate::filters;
use crate::platform::store::ProductQuery;
use crate::platform::types::Collection;
use crate::routes::products::{PaginationView, ProductCardView};
use crate::state::AppState;

/// Collection card display data.
#[derive(Clone)]
pub struct CollectionCardView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub product_count: Option<u64>,
}

impl From<&Collection> for CollectionCardView {
    fn from(collection: &Collection) -> Self {
        Self {
            id: collection.id.to_string(),
            name: collection.name.clone(),
            description: collection.description.clone(),
            product_count: collection.product_count,
        }
    }
}

/// Page query for collection product listings.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

/// Collection listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "collections/index.html")]
pub struct CollectionsIndexTemplate {
    pub collections: Vec<CollectionCardView>,
}

/// Collection detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "collections/show.html")]
pub struct CollectionShowTemplate {
    pub collection: CollectionCardView,
    pub products: Vec<ProductCardView>,
    pub pagination: PaginationView,
}

/// Display all collections.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let page = state.store().get_collections(1).await?;

    Ok(CollectionsIndexTemplate {
        collections: page.collections.iter().map(CollectionCardView::from).collect(),
    })
}

/// Display one collection and its products.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(collection_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let collection_id = CollectionId::new(collection_id);
    let collection = state.store().get_collection(&collection_id).await?;

    let mut product_query = ProductQuery::page(query.page.unwrap_or(1));
    product_query.collection = Some(collection_id);
    let products = state.store().get_products(&product_query).await?;

    Ok(CollectionShowTemplate {
        collection: CollectionCardView::from(&collection),
        products: products.products.iter().map(ProductCardView::from).collect(),
        pagination: PaginationView::from(&products.pagination),
    })
}
