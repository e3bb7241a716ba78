//! HTTP route handlers for the dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (platform reachability)
//!
//! # Auth (store API key)
//! GET  /login                   - Key entry form
//! POST /login                   - Validate key against the platform
//! POST /logout                  - Logout
//!
//! # Dashboard
//! GET  /                        - Overview counters
//!
//! # Categories
//! GET  /categories              - Category table
//! GET  /categories/new          - Create form
//! POST /categories              - Create
//! GET  /categories/{id}/edit    - Edit form
//! POST /categories/{id}         - Update
//! POST /categories/{id}/delete  - Delete
//!
//! # Products
//! GET  /products                - Product table (status filter)
//! GET  /products/new            - Create form
//! POST /products                - Create
//! GET  /products/{id}/edit      - Edit form
//! POST /products/{id}           - Update
//! POST /products/{id}/delete    - Delete
//!
//! # Settings
//! GET  /settings                - Store settings form
//! POST /settings                - Update settings
//! ```
//!
//! Mutations are plain form posts followed by a redirect with a flash
//! message; there is no JSON API surface.

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod products;
pub mod settings;

/// Build the full application router (without the health endpoints).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/login", get(auth::show_login).post(auth::login))
        .route("/logout", post(auth::logout))
        .merge(category_routes())
        .merge(product_routes())
        .route("/settings", get(settings::show).post(settings::update))
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(categories::index).post(categories::create),
        )
        .route("/categories/new", get(categories::new_category))
        .route("/categories/{id}", post(categories::update))
        .route("/categories/{id}/edit", get(categories::edit))
        .route("/categories/{id}/delete", post(categories::delete))
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index).post(products::create))
        .route("/products/new", get(products::new_product))
        .route("/products/{id}", post(products::update))
        .route("/products/{id}/edit", get(products::edit))
        .route("/products/{id}/delete", post(products::delete))
}
