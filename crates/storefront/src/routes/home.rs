//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;
use crate::platform::store::ProductQuery;
use crate::routes::products::ProductCardView;
use crate::state::AppState;

/// Number of products featured on the home page.
const FEATURED_PRODUCTS: u32 = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// First page of the catalog, shown as the featured grid.
    pub featured_products: Vec<ProductCardView>,
}

/// Display the home page.
///
/// A failed catalog fetch renders an empty grid; the page itself never 500s
/// over a storefront feature strip.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let query = ProductQuery::page(1).with_limit(FEATURED_PRODUCTS);

    let featured_products = state.store().get_products(&query).await.map_or_else(
        |error| {
            tracing::error!(%error, "failed to fetch featured products");
            Vec::new()
        },
        |page| page.products.iter().map(ProductCardView::from).collect(),
    );

    HomeTemplate { featured_products }
}
