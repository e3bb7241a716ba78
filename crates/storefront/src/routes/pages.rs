//! Content page route handlers.
//!
//! Policies and the about page are store-owner content fetched from the
//! platform by slug. Only a fixed set of slugs is routable; anything else is
//! a 404 without a platform round-trip.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Slugs this storefront exposes under `/pages/{slug}`.
const KNOWN_SLUGS: &[&str] = &[
    "privacy-policy",
    "terms-of-service",
    "shipping-policy",
    "refund-policy",
    "about-us",
];

/// Content page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/content.html")]
pub struct ContentPageTemplate {
    pub title: String,
    pub body: String,
    pub updated_at: Option<String>,
}

/// Display a content page by slug.
///
/// # Errors
///
/// Returns 404 for unknown slugs and for slugs the store never published.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    if !KNOWN_SLUGS.contains(&slug.as_str()) {
        return Err(AppError::NotFound(format!("no such page: {slug}")));
    }

    let page = state.store().get_content(&slug).await?;

    Ok(ContentPageTemplate {
        title: page.file_data.title,
        body: page.file_data.content,
        updated_at: page
            .file_data
            .last_updated
            .map(|updated| updated.format("%b %d, %Y").to_string()),
    })
}
