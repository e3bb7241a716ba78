//! Category management route handlers.
//!
//! Categories group products for shoppers (the storefront shows them as
//! collections). Create and edit share one form template; mutations redirect
//! back to the table with a flash message.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use vendora_core::CollectionId;

use crate::error::Result;
use crate::middleware::RequireOwner;
use crate::models::{Flash, FlashLevel, set_flash, take_flash};
use crate::platform::types::{Category, CategoryInput, Pagination};
use crate::state::AppState;

// =============================================================================
// Form and Query Types
// =============================================================================

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

/// Category create/update form data.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    pub description: String,
}

impl CategoryForm {
    /// Trim everything and drop the description when blank.
    fn into_input(self) -> CategoryInput {
        let description = {
            let trimmed = self.description.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        CategoryInput {
            name: self.name.trim().to_string(),
            description,
        }
    }
}

/// Echoed form values for rerenders.
#[derive(Debug, Clone, Default)]
pub struct CategoryFormView {
    pub name: String,
    pub description: String,
}

impl From<&Category> for CategoryFormView {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
        }
    }
}

impl From<&CategoryInput> for CategoryFormView {
    fn from(input: &CategoryInput) -> Self {
        Self {
            name: input.name.clone(),
            description: input.description.clone().unwrap_or_default(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Category table template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesTemplate {
    pub store_name: String,
    pub current_path: &'static str,
    pub flash: Option<Flash>,
    pub categories: Vec<Category>,
    pub pagination: Pagination,
}

/// Category create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/form.html")]
pub struct CategoryFormTemplate {
    pub store_name: String,
    pub current_path: &'static str,
    pub heading: String,
    /// Form posts here; create and edit share the template.
    pub action: String,
    pub form: CategoryFormView,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the category table.
#[instrument(skip(owner, state, session))]
pub async fn index(
    RequireOwner(owner): RequireOwner,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let flash = take_flash(&session).await?;
    let page = state
        .platform()
        .list_categories(query.page.unwrap_or(1))
        .await?;

    Ok(CategoriesTemplate {
        store_name: owner.store_name,
        current_path: "/categories",
        flash,
        categories: page.categories,
        pagination: page.pagination,
    })
}

/// Display the create form.
pub async fn new_category(RequireOwner(owner): RequireOwner) -> impl IntoResponse {
    CategoryFormTemplate {
        store_name: owner.store_name,
        current_path: "/categories",
        heading: "New category".to_string(),
        action: "/categories".to_string(),
        form: CategoryFormView::default(),
        error: None,
    }
}

/// Handle create form submission.
#[instrument(skip(owner, state, session, form))]
pub async fn create(
    RequireOwner(owner): RequireOwner,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let input = form.into_input();
    let view = CategoryFormView::from(&input);
    let rerender = move |error: String| CategoryFormTemplate {
        store_name: owner.store_name,
        current_path: "/categories",
        heading: "New category".to_string(),
        action: "/categories".to_string(),
        form: view,
        error: Some(error),
    };

    if input.name.is_empty() {
        return Ok(rerender("Give the category a name.".to_string()).into_response());
    }

    match state.platform().create_category(&input).await {
        Ok(category) => {
            tracing::info!(category_id = %category.id, name = %category.name, "category created");
            set_flash(&session, FlashLevel::Success, "Category created.").await?;
            Ok(Redirect::to("/categories").into_response())
        }
        Err(error) => {
            tracing::error!(%error, name = %input.name, "failed to create category");
            Ok(rerender("The platform rejected the category. Try again.".to_string())
                .into_response())
        }
    }
}

/// Display the edit form.
#[instrument(skip(owner, state))]
pub async fn edit(
    RequireOwner(owner): RequireOwner,
    State(state): State<AppState>,
    Path(id): Path<CollectionId>,
) -> Result<impl IntoResponse> {
    let category = state.platform().get_category(&id).await?;

    Ok(CategoryFormTemplate {
        store_name: owner.store_name,
        current_path: "/categories",
        heading: format!("Edit {}", category.name),
        action: format!("/categories/{id}"),
        form: CategoryFormView::from(&category),
        error: None,
    })
}

/// Handle edit form submission.
#[instrument(skip(owner, state, session, form))]
pub async fn update(
    RequireOwner(owner): RequireOwner,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CollectionId>,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let input = form.into_input();
    let view = CategoryFormView::from(&input);
    let action = format!("/categories/{id}");
    let rerender = move |error: String| CategoryFormTemplate {
        store_name: owner.store_name,
        current_path: "/categories",
        heading: "Edit category".to_string(),
        action,
        form: view,
        error: Some(error),
    };

    if input.name.is_empty() {
        return Ok(rerender("Give the category a name.".to_string()).into_response());
    }

    match state.platform().update_category(&id, &input).await {
        Ok(()) => {
            set_flash(&session, FlashLevel::Success, "Category updated.").await?;
            Ok(Redirect::to("/categories").into_response())
        }
        Err(error) => {
            tracing::error!(%error, category_id = %id, "failed to update category");
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
    Path(id): Path<CollectionId>,
) -> Result<Response> {
    match state.platform().delete_category(&id).await {
        Ok(()) => {
            tracing::info!(category_id = %id, "category deleted");
            set_flash(&session, FlashLevel::Success, "Category deleted.").await?;
        }
        Err(error) => {
            tracing::error!(%error, category_id = %id, "failed to delete category");
            set_flash(
                &session,
                FlashLevel::Error,
                "Couldn't delete the category. It may still have products.",
            )
            .await?;
        }
    }

    Ok(Redirect::to("/categories").into_response())
}
