//! Cart route handlers.
//!
//! Mutations arrive over HTMX and answer with fragments, so the page never
//! fully reloads. Every handler builds a [`CartSession`] for the request,
//! which routes to session storage for guests and the platform cart for
//! signed-in customers. Successful mutations answer with an
//! `HX-Trigger: cart-updated` header so the count badge (and anything else
//! listening) re-fetches; failed ones re-render the previous state with an
//! inline message, never a 500.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use vendora_core::{CurrencyCode, Price, ProductId};

use crate::cart::{AddToCart, CartAuth, CartSession, CartSnapshot, SessionCartStorage};
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentCustomer;
use crate::models::session::event_channel_key;
use crate::platform::customer::CustomerClient;
use crate::state::AppState;

/// Flat shipping charged whenever the subtotal is positive.
pub const FLAT_SHIPPING: Decimal = Decimal::from_parts(1000, 0, 0, false, 2);

/// The cart type every storefront request works with.
pub type RequestCart = CartSession<SessionCartStorage, CustomerClient>;

/// Build the cart session for this request from its auth state.
pub async fn cart_for_request(
    state: &AppState,
    session: &Session,
    customer: Option<&CurrentCustomer>,
) -> Result<RequestCart> {
    let channel = event_channel_key(session).await?;
    let bus = state.events().bus(&channel);
    let auth = customer.map_or(CartAuth::Guest, |customer| {
        CartAuth::Customer(customer.token.clone())
    });

    Ok(CartSession::new(
        auth,
        SessionCartStorage::new(session.clone()),
        state.customer().clone(),
        bus,
    ))
}

// =============================================================================
// View Types
// =============================================================================

/// One rendered cart line.
#[derive(Clone)]
pub struct CartItemView {
    /// Form value for mutations: product id (guest) or line id (customer).
    pub key: String,
    pub title: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
    pub image: Option<String>,
}

/// The rendered cart with its totals.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u32,
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
    /// Inline message shown when a mutation failed.
    pub error: Option<String>,
}

/// Format an amount for display. The platform prices everything in USD.
fn usd(amount: Decimal) -> String {
    Price::new(amount, CurrencyCode::USD).to_string()
}

impl CartView {
    /// Render a snapshot, computing the order summary.
    #[must_use]
    pub fn from_snapshot(snapshot: &CartSnapshot) -> Self {
        let subtotal = snapshot.subtotal();
        let shipping = if subtotal > Decimal::ZERO {
            FLAT_SHIPPING
        } else {
            Decimal::ZERO
        };

        Self {
            items: snapshot
                .lines
                .iter()
                .map(|line| CartItemView {
                    key: line.key.as_str().to_string(),
                    title: line.title.clone(),
                    quantity: line.quantity,
                    price: usd(line.price),
                    line_total: usd(line.line_total()),
                    image: line.image.clone(),
                })
                .collect(),
            item_count: snapshot.item_count(),
            subtotal: usd(subtotal),
            shipping: usd(shipping),
            total: usd(subtotal + shipping),
            error: None,
        }
    }

    /// Render a snapshot with an inline error message.
    #[must_use]
    pub fn with_error(snapshot: &CartSnapshot, message: impl Into<String>) -> Self {
        let mut view = Self::from_snapshot(snapshot);
        view.error = Some(message.into());
        view
    }

    /// An empty cart carrying only an error message.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::with_error(&CartSnapshot::default(), message)
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
}

/// Update quantity form data. `key` is whatever the rendered line carried.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub key: String,
    pub quantity: i64,
}

/// Remove line form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub key: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Line-items fragment swapped in by HTMX after a mutation.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Badge fragment fetched on every cart-updated event.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Add-to-cart form fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/add_to_cart.html")]
pub struct AddToCartTemplate {
    pub product_id: String,
    pub quantity: u32,
    pub message: Option<String>,
    pub failed: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip(state, session, customer))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Result<impl IntoResponse> {
    let mut cart = cart_for_request(&state, &session, customer.as_ref()).await?;
    let snapshot = cart.load().await;

    Ok(CartShowTemplate {
        cart: CartView::from_snapshot(&snapshot),
    })
}

/// Add a product to the cart (HTMX).
///
/// The form only carries the product id; title, price, and image come from
/// the catalog so a tampered form can't set its own price.
#[instrument(skip(state, session, customer))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let quantity = form.quantity.unwrap_or(1).max(1);

    let product_id = ProductId::new(&form.product_id);
    let product = match state.store().get_product(&product_id).await {
        Ok(product) => product,
        Err(error) => {
            tracing::warn!(%error, product_id = %product_id, "add to cart: product lookup failed");
            return AddToCartTemplate {
                product_id: form.product_id,
                quantity,
                message: Some("This product is unavailable right now.".to_string()),
                failed: true,
            }
            .into_response();
        }
    };

    let mut cart = match cart_for_request(&state, &session, customer.as_ref()).await {
        Ok(cart) => cart,
        Err(error) => {
            tracing::error!(%error, "add to cart: failed to build cart session");
            return AddToCartTemplate {
                product_id: form.product_id,
                quantity,
                message: Some("Could not update your cart. Please try again.".to_string()),
                failed: true,
            }
            .into_response();
        }
    };

    let item = AddToCart {
        product_id: product.id.clone(),
        title: product.title.clone(),
        price: product.price,
        image: product.primary_image().map(String::from),
        quantity,
    };

    match cart.add(item).await {
        Ok(()) => (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            AddToCartTemplate {
                product_id: form.product_id,
                quantity: 1,
                message: Some("Added to cart".to_string()),
                failed: false,
            },
        )
            .into_response(),
        Err(error) => {
            tracing::error!(%error, product_id = %product_id, "add to cart failed");
            AddToCartTemplate {
                product_id: form.product_id,
                quantity,
                message: Some("Could not add to cart. Please try again.".to_string()),
                failed: true,
            }
            .into_response()
        }
    }
}

/// Update a line's quantity (HTMX). Zero or less removes the line.
#[instrument(skip(state, session, customer))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let mut cart = match cart_for_request(&state, &session, customer.as_ref()).await {
        Ok(cart) => cart,
        Err(error) => {
            tracing::error!(%error, "update cart: failed to build cart session");
            return CartItemsTemplate {
                cart: CartView::unavailable("Your cart is unavailable right now."),
            }
            .into_response();
        }
    };

    cart.load().await;
    let key = cart.line_key(&form.key);

    match cart.update_quantity(&key, form.quantity).await {
        Ok(()) => (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate {
                cart: CartView::from_snapshot(&cart.snapshot()),
            },
        )
            .into_response(),
        Err(error) => {
            tracing::error!(%error, key = %form.key, "cart quantity update failed");
            CartItemsTemplate {
                cart: CartView::with_error(
                    &cart.snapshot(),
                    "Could not update the quantity. Please try again.",
                ),
            }
            .into_response()
        }
    }
}

/// Remove a line from the cart (HTMX).
#[instrument(skip(state, session, customer))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let mut cart = match cart_for_request(&state, &session, customer.as_ref()).await {
        Ok(cart) => cart,
        Err(error) => {
            tracing::error!(%error, "remove from cart: failed to build cart session");
            return CartItemsTemplate {
                cart: CartView::unavailable("Your cart is unavailable right now."),
            }
            .into_response();
        }
    };

    cart.load().await;
    let key = cart.line_key(&form.key);

    match cart.remove_item(&key).await {
        Ok(()) => (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate {
                cart: CartView::from_snapshot(&cart.snapshot()),
            },
        )
            .into_response(),
        Err(error) => {
            tracing::error!(%error, key = %form.key, "cart line removal failed");
            CartItemsTemplate {
                cart: CartView::with_error(
                    &cart.snapshot(),
                    "Could not remove the item. Please try again.",
                ),
            }
            .into_response()
        }
    }
}

/// Empty the cart (HTMX).
#[instrument(skip(state, session, customer))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Response {
    let mut cart = match cart_for_request(&state, &session, customer.as_ref()).await {
        Ok(cart) => cart,
        Err(error) => {
            tracing::error!(%error, "clear cart: failed to build cart session");
            return CartItemsTemplate {
                cart: CartView::unavailable("Your cart is unavailable right now."),
            }
            .into_response();
        }
    };

    cart.load().await;

    match cart.clear().await {
        Ok(()) => (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate {
                cart: CartView::from_snapshot(&cart.snapshot()),
            },
        )
            .into_response(),
        Err(error) => {
            tracing::error!(%error, "cart clear failed");
            CartItemsTemplate {
                cart: CartView::with_error(
                    &cart.snapshot(),
                    "Could not empty the cart. Please try again.",
                ),
            }
            .into_response()
        }
    }
}

/// Cart count badge (HTMX).
///
/// Loaded on page load and whenever a `cart-updated` event fires.
#[instrument(skip(state, session, customer))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Result<impl IntoResponse> {
    let mut cart = cart_for_request(&state, &session, customer.as_ref()).await?;
    let snapshot = cart.load().await;

    Ok(CartCountTemplate {
        count: snapshot.item_count(),
    })
}
