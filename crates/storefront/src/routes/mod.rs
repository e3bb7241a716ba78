//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (platform reachability)
//!
//! # Catalog
//! GET  /products               - Product listing (search + collection filter)
//! GET  /products/{id}          - Product detail
//! GET  /collections            - All collections
//! GET  /collections/{id}       - Collection detail
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Current cart
//! POST /cart/add               - Add item (fragment, fires cart-updated)
//! POST /cart/update            - Set line quantity (fragment, fires cart-updated)
//! POST /cart/remove            - Remove line (fragment, fires cart-updated)
//! POST /cart/clear             - Empty the cart (fragment, fires cart-updated)
//! GET  /cart/count             - Badge count (fragment)
//!
//! # Checkout (requires auth)
//! GET  /checkout               - Address selection + order summary
//! POST /checkout               - Place the order
//!
//! # Auth (email one-time codes)
//! GET  /login                  - Login form
//! POST /login                  - Request a login code
//! GET  /login/verify           - Code entry page
//! POST /login/verify           - Verify code, migrate guest cart
//! GET  /signup                 - Signup form
//! POST /signup                 - Request a signup code
//! POST /logout                 - Logout action
//!
//! # Account (requires auth)
//! GET  /account                - Profile
//! POST /account/profile        - Update profile
//! GET  /account/orders         - Past orders
//! GET  /account/addresses      - Saved addresses
//! POST /account/addresses      - Create address
//! GET  /account/addresses/new  - New address form
//! GET  /account/addresses/{id}/edit    - Edit address form
//! POST /account/addresses/{id}         - Update address
//! DELETE /account/addresses/{id}       - Delete address (HTMX)
//! POST /account/addresses/{id}/default - Set default address
//!
//! # Content
//! GET  /pages/{slug}           - Store content page (policies, about)
//! GET  /contact                - Contact form
//! POST /contact                - Submit contact form
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod collections;
pub mod contact;
pub mod home;
pub mod pages;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Login, signup, verification, and logout.
///
/// Carries the strict rate limiter: every endpoint here either sends a
/// one-time code or accepts a guess at one.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/login/verify", get(auth::verify_page).post(auth::verify))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Catalog listing and detail pages.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Collection listing and detail pages.
pub fn collection_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(collections::index))
        .route("/{id}", get(collections::show))
}

/// The cart page and its HTMX fragment endpoints.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
        .layer(api_rate_limiter())
}

/// Profile, orders, and the address book.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::profile))
        .route("/profile", post(account::update_profile))
        .route("/orders", get(account::orders))
        .route(
            "/addresses",
            get(account::addresses).post(account::create_address),
        )
        .route("/addresses/new", get(account::new_address))
        .route(
            "/addresses/{id}",
            post(account::update_address).delete(account::delete_address),
        )
        .route("/addresses/{id}/edit", get(account::edit_address))
        .route("/addresses/{id}/default", post(account::set_default_address))
}

/// Store content pages and the contact form.
pub fn content_routes() -> Router<AppState> {
    let contact = Router::new()
        .route("/contact", get(contact::show).post(contact::submit))
        .layer(api_rate_limiter());

    Router::new()
        .route("/pages/{slug}", get(pages::show))
        .merge(contact)
}

/// The full storefront router, before middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .nest("/products", product_routes())
        .nest("/collections", collection_routes())
        // Cart
        .nest("/cart", cart_routes())
        // Checkout
        .route("/checkout", get(checkout::show).post(checkout::place_order))
        // Account
        .nest("/account", account_routes())
        // Auth (top-level paths, no /auth prefix)
        .merge(auth_routes())
        // Content pages + contact
        .merge(content_routes())
}
