//! Checkout route handlers.
//!
//! Checkout is the handoff point: pick a saved address and hand the server
//! cart to the platform, which owns payment and fulfillment. Guests are sent
//! through login first (which migrates their cart), so by the time anyone
//! sees this page their cart lives on the server.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use vendora_core::AddressId;

use crate::cart::SessionEvent;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::session::event_channel_key;
use crate::routes::account::{AddressView, OrderView};
use crate::routes::cart::{CartView, cart_for_request};
use crate::state::AppState;

/// Place order form data.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderForm {
    pub address_id: String,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub cart: CartView,
    pub addresses: Vec<AddressView>,
    pub error: Option<String>,
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub order: OrderView,
}

/// Display the checkout page: order summary plus address choice.
#[instrument(skip(state, session, auth))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    auth: RequireAuth,
) -> Result<Response> {
    let RequireAuth(customer) = auth;

    let mut cart = cart_for_request(&state, &session, Some(&customer)).await?;
    let snapshot = cart.load().await;
    if snapshot.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let addresses = state.customer().list_addresses(&customer.token).await?;

    Ok(CheckoutTemplate {
        cart: CartView::from_snapshot(&snapshot),
        addresses: addresses.iter().map(AddressView::from).collect(),
        error: None,
    }
    .into_response())
}

/// Handle order placement.
///
/// The platform consumes the server cart; on success the session's bus gets
/// a cart-changed event so the badge empties on the confirmation page.
#[instrument(skip(state, session, auth, form))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    auth: RequireAuth,
    Form(form): Form<PlaceOrderForm>,
) -> Result<Response> {
    let RequireAuth(customer) = auth;
    let address_id = AddressId::new(form.address_id.trim());

    match state
        .customer()
        .place_order(&customer.token, &address_id)
        .await
    {
        Ok(order) => {
            if let Ok(channel) = event_channel_key(&session).await {
                state.events().bus(&channel).publish(SessionEvent::CartChanged);
            }

            Ok(ConfirmationTemplate {
                order: OrderView::from(&order),
            }
            .into_response())
        }
        Err(error) => {
            tracing::error!(%error, address_id = %address_id, "order placement failed");

            let mut cart = cart_for_request(&state, &session, Some(&customer)).await?;
            let snapshot = cart.load().await;
            if snapshot.is_empty() {
                // The order may have gone through after all; don't invite a
                // double submit against an empty cart.
                return Ok(Redirect::to("/account/orders").into_response());
            }

            let addresses = state.customer().list_addresses(&customer.token).await?;

            Ok(CheckoutTemplate {
                cart: CartView::from_snapshot(&snapshot),
                addresses: addresses.iter().map(AddressView::from).collect(),
                error: Some("Could not place the order. Please try again.".to_string()),
            }
            .into_response())
        }
    }
}
