//! Product management route handlers.
//!
//! The table lists every lifecycle status, unlike the storefront catalog.
//! Create and edit share one form template and both need the category list
//! for the assignment select, so mutations refetch it before rendering.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use url::Url;

use vendora_core::{CollectionId, ProductId, ProductStatus};

use crate::error::Result;
use crate::middleware::RequireOwner;
use crate::models::{Flash, FlashLevel, set_flash, take_flash};
use crate::platform::types::{
    AdminProduct, Category, Pagination, ProductImage, ProductInput,
};
use crate::state::AppState;

// =============================================================================
// Form and Query Types
// =============================================================================

/// Product table query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub page: Option<u32>,
    pub status: Option<String>,
}

/// Product create/update form data. Everything arrives as text; [`parse`]
/// turns it into a typed request body or a message for the owner.
///
/// [`parse`]: ProductForm::parse
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub title: String,
    pub description: String,
    pub price: String,
    pub sku: String,
    pub status: String,
    pub stock: String,
    pub image_url: String,
    pub category_id: String,
}

impl ProductForm {
    /// Validate and convert into a platform request body.
    fn parse(&self) -> std::result::Result<ProductInput, String> {
        let optional = |value: &str| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        let title = self.title.trim();
        if title.is_empty() {
            return Err("Give the product a title.".to_string());
        }

        let price: Decimal = self
            .price
            .trim()
            .parse()
            .map_err(|_| "Enter a valid price like 24.99.".to_string())?;
        if price.is_sign_negative() {
            return Err("Price can't be negative.".to_string());
        }

        let status: ProductStatus = self
            .status
            .trim()
            .parse()
            .map_err(|_| "Pick a valid status.".to_string())?;

        let stock = match optional(&self.stock) {
            None => None,
            Some(raw) => Some(
                raw.parse::<u32>()
                    .map_err(|_| "Stock must be a whole number.".to_string())?,
            ),
        };

        let images = match optional(&self.image_url) {
            None => vec![],
            Some(raw) => {
                let parsed =
                    Url::parse(&raw).map_err(|_| "Image URL isn't a valid URL.".to_string())?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err("Image URL must start with http:// or https://.".to_string());
                }
                vec![ProductImage {
                    url: raw,
                    alt: Some(title.to_string()),
                }]
            }
        };

        Ok(ProductInput {
            title: title.to_string(),
            description: optional(&self.description),
            price,
            sku: optional(&self.sku),
            status,
            stock,
            images,
            category_id: optional(&self.category_id).map(CollectionId::new),
        })
    }

    /// Echo the submitted values back into the form.
    fn view(&self) -> ProductFormView {
        ProductFormView {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price.trim().to_string(),
            sku: self.sku.trim().to_string(),
            status: self.status.trim().to_lowercase(),
            stock: self.stock.trim().to_string(),
            image_url: self.image_url.trim().to_string(),
            category_id: self.category_id.trim().to_string(),
        }
    }
}

/// Form values as strings, for prefills and rerenders.
#[derive(Debug, Clone)]
pub struct ProductFormView {
    pub title: String,
    pub description: String,
    pub price: String,
    pub sku: String,
    /// Lowercase status name; the select compares against it.
    pub status: String,
    pub stock: String,
    pub image_url: String,
    pub category_id: String,
}

impl Default for ProductFormView {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            price: String::new(),
            sku: String::new(),
            status: "draft".to_string(),
            stock: String::new(),
            image_url: String::new(),
            category_id: String::new(),
        }
    }
}

impl From<&AdminProduct> for ProductFormView {
    fn from(product: &AdminProduct) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price.to_string(),
            sku: product.sku.clone().unwrap_or_default(),
            status: product.status.to_string().to_lowercase(),
            stock: product.stock.map(|s| s.to_string()).unwrap_or_default(),
            image_url: product.primary_image().unwrap_or_default().to_string(),
            category_id: product
                .category_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Product table template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub store_name: String,
    pub current_path: &'static str,
    pub flash: Option<Flash>,
    pub products: Vec<AdminProduct>,
    pub pagination: Pagination,
    /// Lowercase status name the table is filtered to; empty shows all.
    pub status_filter: String,
}

/// Product create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub store_name: String,
    pub current_path: &'static str,
    pub heading: String,
    pub action: String,
    pub form: ProductFormView,
    /// Categories for the assignment select.
    pub categories: Vec<Category>,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the product table, optionally filtered by status.
#[instrument(skip(owner, state, session))]
pub async fn index(
    RequireOwner(owner): RequireOwner,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ProductListQuery>,
) -> Result<impl IntoResponse> {
    let flash = take_flash(&session).await?;

    // Unknown filter values fall back to the unfiltered table.
    let status = query
        .status
        .as_deref()
        .and_then(|raw| raw.parse::<ProductStatus>().ok());

    let page = state
        .platform()
        .list_products(query.page.unwrap_or(1), status)
        .await?;

    Ok(ProductsTemplate {
        store_name: owner.store_name,
        current_path: "/products",
        flash,
        products: page.products,
        pagination: page.pagination,
        status_filter: status.map(|s| s.to_string().to_lowercase()).unwrap_or_default(),
    })
}

/// Display the create form.
#[instrument(skip(owner, state))]
pub async fn new_product(
    RequireOwner(owner): RequireOwner,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let categories = state.platform().list_categories(1).await?.categories;

    Ok(ProductFormTemplate {
        store_name: owner.store_name,
        current_path: "/products",
        heading: "New product".to_string(),
        action: "/products".to_string(),
        form: ProductFormView::default(),
        categories,
        error: None,
    })
}

/// Handle create form submission.
#[instrument(skip(owner, state, session, form))]
pub async fn create(
    RequireOwner(owner): RequireOwner,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let categories = state.platform().list_categories(1).await?.categories;
    let view = form.view();
    let rerender = move |error: String| ProductFormTemplate {
        store_name: owner.store_name,
        current_path: "/products",
        heading: "New product".to_string(),
        action: "/products".to_string(),
        form: view,
        categories,
        error: Some(error),
    };

    let input = match form.parse() {
        Ok(input) => input,
        Err(message) => return Ok(rerender(message).into_response()),
    };

    match state.platform().create_product(&input).await {
        Ok(product) => {
            tracing::info!(product_id = %product.id, title = %product.title, "product created");
            set_flash(&session, FlashLevel::Success, "Product created.").await?;
            Ok(Redirect::to("/products").into_response())
        }
        Err(error) => {
            tracing::error!(%error, title = %input.title, "failed to create product");
            Ok(rerender("The platform rejected the product. Try again.".to_string())
                .into_response())
        }
    }
}

/// Display the edit form, prefilled from the platform record.
#[instrument(skip(owner, state))]
pub async fn edit(
    RequireOwner(owner): RequireOwner,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = state.platform().get_product(&id).await?;
    let categories = state.platform().list_categories(1).await?.categories;

    Ok(ProductFormTemplate {
        store_name: owner.store_name,
        current_path: "/products",
        heading: format!("Edit {}", product.title),
        action: format!("/products/{id}"),
        form: ProductFormView::from(&product),
        categories,
        error: None,
    })
}

/// Handle edit form submission.
#[instrument(skip(owner, state, session, form))]
pub async fn update(
    RequireOwner(owner): RequireOwner,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let categories = state.platform().list_categories(1).await?.categories;
    let view = form.view();
    let action = format!("/products/{id}");
    let rerender = move |error: String| ProductFormTemplate {
        store_name: owner.store_name,
        current_path: "/products",
        heading: "Edit product".to_string(),
        action,
        form: view,
        categories,
        error: Some(error),
    };

    let input = match form.parse() {
        Ok(input) => input,
        Err(message) => return Ok(rerender(message).into_response()),
    };

    match state.platform().update_product(&id, &input).await {
        Ok(()) => {
            set_flash(&session, FlashLevel::Success, "Product updated.").await?;
            Ok(Redirect::to("/products").into_response())
        }
        Err(error) => {
            tracing::error!(%error, product_id = %id, "failed to update product");
            Ok(rerender("The platform rejected the change. Try again.".to_string())
                .into_response())
        }
    }
}

/// Handle deletion; failures surface as a flash on the table.
#[instrument(skip(state, session))]
pub async fn delete(
    RequireOwner(_owner): RequireOwner,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    match state.platform().delete_product(&id).await {
        Ok(()) => {
            tracing::info!(product_id = %id, "product deleted");
            set_flash(&session, FlashLevel::Success, "Product deleted.").await?;
        }
        Err(error) => {
            tracing::error!(%error, product_id = %id, "failed to delete product");
            set_flash(&session, FlashLevel::Error, "Couldn't delete the product. Try again.")
                .await?;
        }
    }

    Ok(Redirect::to("/products").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn blank_form() -> ProductForm {
        ProductForm {
            title: String::new(),
            description: String::new(),
            price: String::new(),
            sku: String::new(),
            status: "draft".to_string(),
            stock: String::new(),
            image_url: String::new(),
            category_id: String::new(),
        }
    }

    #[test]
    fn test_parse_requires_title_and_price() {
        let form = blank_form();
        assert_eq!(form.parse().unwrap_err(), "Give the product a title.");

        let form = ProductForm {
            title: "Mug".to_string(),
            price: "cheap".to_string(),
            ..blank_form()
        };
        assert_eq!(form.parse().unwrap_err(), "Enter a valid price like 24.99.");

        let form = ProductForm {
            title: "Mug".to_string(),
            price: "-1.00".to_string(),
            ..blank_form()
        };
        assert_eq!(form.parse().unwrap_err(), "Price can't be negative.");
    }

    #[test]
    fn test_parse_builds_full_input() {
        let form = ProductForm {
            title: "  Desk Lamp  ".to_string(),
            description: "Warm light.".to_string(),
            price: "24.99".to_string(),
            sku: "LAMP-001".to_string(),
            status: "active".to_string(),
            stock: "14".to_string(),
            image_url: "https://cdn.test/lamp.jpg".to_string(),
            category_id: "cat_3".to_string(),
        };

        let input = form.parse().unwrap();
        assert_eq!(input.title, "Desk Lamp");
        assert_eq!(input.price, Decimal::new(2499, 2));
        assert_eq!(input.status, ProductStatus::Active);
        assert_eq!(input.stock, Some(14));
        assert_eq!(input.images.len(), 1);
        assert_eq!(input.images.first().unwrap().alt.as_deref(), Some("Desk Lamp"));
        assert_eq!(
            input.category_id.as_ref().map(ToString::to_string),
            Some("cat_3".to_string())
        );
    }

    #[test]
    fn test_parse_drops_blank_optionals() {
        let form = ProductForm {
            title: "Mug".to_string(),
            price: "9.00".to_string(),
            stock: "  ".to_string(),
            ..blank_form()
        };

        let input = form.parse().unwrap();
        assert!(input.description.is_none());
        assert!(input.sku.is_none());
        assert!(input.stock.is_none());
        assert!(input.images.is_empty());
        assert!(input.category_id.is_none());
    }

    #[test]
    fn test_parse_rejects_bad_image_schemes() {
        let form = ProductForm {
            title: "Mug".to_string(),
            price: "9.00".to_string(),
            image_url: "ftp://cdn.test/mug.jpg".to_string(),
            ..blank_form()
        };

        assert_eq!(
            form.parse().unwrap_err(),
            "Image URL must start with http:// or https://."
        );
    }

    #[test]
    fn test_parse_rejects_fractional_stock() {
        let form = ProductForm {
            title: "Mug".to_string(),
            price: "9.00".to_string(),
            stock: "3.5".to_string(),
            ..blank_form()
        };

        assert_eq!(form.parse().unwrap_err(), "Stock must be a whole number.");
    }
}
