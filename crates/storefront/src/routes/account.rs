//! Account route handlers.
//!
//! Profile, address book, and order history. Every handler runs behind
//! [`RequireAuth`]; the platform is the source of truth and the session only
//! caches the identity used to talk to it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use vendora_core::{AddressId, CurrencyCode, Price};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CspNonce, RequireAuth, set_current_customer};
use crate::models::CurrentCustomer;
use crate::models::session::{Flash, FlashLevel, set_flash, take_flash};
use crate::platform::types::{Address, AddressFields, Order, UpdateProfileRequest};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// A saved address as the templates show it.
#[derive(Clone)]
pub struct AddressView {
    pub id: String,
    pub full_name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city_line: String,
    pub country: String,
    pub phone: Option<String>,
    pub is_default: bool,
}

impl From<&Address> for AddressView {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id.to_string(),
            full_name: address.full_name(),
            line1: address.address_line1.clone(),
            line2: address.address_line2.clone(),
            city_line: format!(
                "{}, {} {}",
                address.city, address.state, address.postal_code
            ),
            country: address.country.clone(),
            phone: address.phone.clone(),
            is_default: address.is_default,
        }
    }
}

/// One row of the order history table.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub status: String,
    pub status_class: String,
    pub total: String,
    pub item_count: Option<u32>,
    pub placed_at: Option<String>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let status = order.status.to_string();
        Self {
            id: order.id.to_string(),
            status_class: status.to_lowercase(),
            status,
            total: Price::new(order.total, CurrencyCode::USD).to_string(),
            item_count: order.item_count,
            placed_at: order
                .created_at
                .map(|created| created.format("%b %d, %Y").to_string()),
        }
    }
}

/// Address form values, echoed back on validation failure.
#[derive(Clone, Default)]
pub struct AddressFormView {
    pub first_name: String,
    pub last_name: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

impl From<&AddressFields> for AddressFormView {
    fn from(fields: &AddressFields) -> Self {
        Self {
            first_name: fields.first_name.clone(),
            last_name: fields.last_name.clone(),
            address_line1: fields.address_line1.clone(),
            address_line2: fields.address_line2.clone().unwrap_or_default(),
            city: fields.city.clone(),
            state: fields.state.clone(),
            postal_code: fields.postal_code.clone(),
            country: fields.country.clone(),
            phone: fields.phone.clone().unwrap_or_default(),
        }
    }
}

impl From<&Address> for AddressFormView {
    fn from(address: &Address) -> Self {
        Self {
            first_name: address.first_name.clone(),
            last_name: address.last_name.clone(),
            address_line1: address.address_line1.clone(),
            address_line2: address.address_line2.clone().unwrap_or_default(),
            city: address.city.clone(),
            state: address.state.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
            phone: address.phone.clone().unwrap_or_default(),
        }
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Profile update form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
}

/// Address create/update form data.
#[derive(Debug, Deserialize)]
pub struct AddressForm {
    pub first_name: String,
    pub last_name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
}

impl AddressForm {
    /// Trim everything and drop empty optionals.
    fn into_fields(self) -> AddressFields {
        let optional = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        AddressFields {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            address_line1: self.address_line1.trim().to_string(),
            address_line2: optional(self.address_line2),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
            country: self.country.trim().to_string(),
            phone: optional(self.phone),
        }
    }
}

/// First missing required field, if any.
fn missing_field(fields: &AddressFields) -> Option<&'static str> {
    [
        (fields.first_name.is_empty(), "first name"),
        (fields.last_name.is_empty(), "last name"),
        (fields.address_line1.is_empty(), "street address"),
        (fields.city.is_empty(), "city"),
        (fields.state.is_empty(), "state"),
        (fields.postal_code.is_empty(), "postal code"),
        (fields.country.is_empty(), "country"),
    ]
    .into_iter()
    .find_map(|(missing, label)| missing.then_some(label))
}

// =============================================================================
// Templates
// =============================================================================

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub name: String,
    pub email: String,
    pub flash: Option<Flash>,
    pub nonce: String,
}

/// Address list page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/addresses.html")]
pub struct AddressesTemplate {
    pub addresses: Vec<AddressView>,
    pub flash: Option<Flash>,
    pub nonce: String,
}

/// Address create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "account/address_form.html")]
pub struct AddressFormTemplate {
    pub heading: String,
    /// Form posts here; create and edit share the template.
    pub action: String,
    pub form: AddressFormView,
    pub error: Option<String>,
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub orders: Vec<OrderView>,
}

// =============================================================================
// Profile
// =============================================================================

/// Display the profile page.
#[instrument(skip(state, session, auth))]
pub async fn profile(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    auth: RequireAuth,
) -> Result<impl IntoResponse> {
    let RequireAuth(customer) = auth;

    // Prefer the platform's copy; the session one can lag behind an update.
    let (name, email) = match state.customer().get_profile(&customer.token).await {
        Ok(profile) => (profile.display_name().to_string(), profile.email),
        Err(error) => {
            tracing::warn!(%error, "profile fetch failed, using session copy");
            (customer.display_name().to_string(), customer.email)
        }
    };

    let flash = take_flash(&session).await?;

    Ok(ProfileTemplate {
        name,
        email,
        flash,
        nonce,
    })
}

/// Handle profile update form submission.
#[instrument(skip(state, session, auth, form))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    auth: RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    let RequireAuth(customer) = auth;

    let name = form.name.trim().to_string();
    if name.is_empty() {
        set_flash(&session, FlashLevel::Error, "Name cannot be empty.").await?;
        return Ok(Redirect::to("/account").into_response());
    }

    match state
        .customer()
        .update_profile(&customer.token, &UpdateProfileRequest { name })
        .await
    {
        Ok(updated) => {
            // Keep the session copy in sync for the header and greetings.
            let refreshed = CurrentCustomer {
                id: updated.id.clone(),
                email: updated.email.clone(),
                name: updated.name.clone(),
                token: customer.token,
            };
            set_current_customer(&session, &refreshed).await?;
            set_flash(&session, FlashLevel::Success, "Profile updated.").await?;
        }
        Err(error) => {
            tracing::error!(%error, "profile update failed");
            set_flash(
                &session,
                FlashLevel::Error,
                "Could not update your profile. Please try again.",
            )
            .await?;
        }
    }

    Ok(Redirect::to("/account").into_response())
}

// =============================================================================
// Addresses
// =============================================================================

/// Display the address book.
#[instrument(skip(state, session, auth))]
pub async fn addresses(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    auth: RequireAuth,
) -> Result<impl IntoResponse> {
    let RequireAuth(customer) = auth;
    let addresses = state.customer().list_addresses(&customer.token).await?;
    let flash = take_flash(&session).await?;

    Ok(AddressesTemplate {
        addresses: addresses.iter().map(AddressView::from).collect(),
        flash,
        nonce,
    })
}

/// Display the new-address form.
pub async fn new_address(_auth: RequireAuth) -> impl IntoResponse {
    AddressFormTemplate {
        heading: "Add address".to_string(),
        action: "/account/addresses".to_string(),
        form: AddressFormView::default(),
        error: None,
    }
}

/// Handle new-address form submission.
#[instrument(skip(state, session, auth, form))]
pub async fn create_address(
    State(state): State<AppState>,
    session: Session,
    auth: RequireAuth,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    let RequireAuth(customer) = auth;
    let fields = form.into_fields();

    if let Some(field) = missing_field(&fields) {
        return Ok(AddressFormTemplate {
            heading: "Add address".to_string(),
            action: "/account/addresses".to_string(),
            form: AddressFormView::from(&fields),
            error: Some(format!("Please fill in the {field}.")),
        }
        .into_response());
    }

    match state.customer().create_address(&customer.token, &fields).await {
        Ok(_) => {
            set_flash(&session, FlashLevel::Success, "Address saved.").await?;
            Ok(Redirect::to("/account/addresses").into_response())
        }
        Err(error) => {
            tracing::error!(%error, "address create failed");
            Ok(AddressFormTemplate {
                heading: "Add address".to_string(),
                action: "/account/addresses".to_string(),
                form: AddressFormView::from(&fields),
                error: Some("Could not save the address. Please try again.".to_string()),
            }
            .into_response())
        }
    }
}

/// Display the edit form for one address.
///
/// The platform has no single-address endpoint, so this filters the list.
#[instrument(skip(state, auth))]
pub async fn edit_address(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(address_id): Path<String>,
) -> Result<impl IntoResponse> {
    let RequireAuth(customer) = auth;
    let address_id = AddressId::new(address_id);

    let addresses = state.customer().list_addresses(&customer.token).await?;
    let address = addresses
        .iter()
        .find(|address| address.id == address_id)
        .ok_or_else(|| AppError::NotFound("address not found".to_string()))?;

    Ok(AddressFormTemplate {
        heading: "Edit address".to_string(),
        action: format!("/account/addresses/{address_id}"),
        form: AddressFormView::from(address),
        error: None,
    })
}

/// Handle edit-address form submission.
#[instrument(skip(state, session, auth, form))]
pub async fn update_address(
    State(state): State<AppState>,
    session: Session,
    auth: RequireAuth,
    Path(address_id): Path<String>,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    let RequireAuth(customer) = auth;
    let address_id = AddressId::new(address_id);
    let fields = form.into_fields();
    let action = format!("/account/addresses/{address_id}");

    if let Some(field) = missing_field(&fields) {
        return Ok(AddressFormTemplate {
            heading: "Edit address".to_string(),
            action,
            form: AddressFormView::from(&fields),
            error: Some(format!("Please fill in the {field}.")),
        }
        .into_response());
    }

    match state
        .customer()
        .update_address(&customer.token, &address_id, &fields)
        .await
    {
        Ok(_) => {
            set_flash(&session, FlashLevel::Success, "Address updated.").await?;
            Ok(Redirect::to("/account/addresses").into_response())
        }
        Err(error) => {
            tracing::error!(%error, address_id = %address_id, "address update failed");
            Ok(AddressFormTemplate {
                heading: "Edit address".to_string(),
                action,
                form: AddressFormView::from(&fields),
                error: Some("Could not update the address. Please try again.".to_string()),
            }
            .into_response())
        }
    }
}

/// Delete an address (HTMX).
///
/// Responds with `HX-Redirect` so the whole page re-renders with the flash.
#[instrument(skip(state, session, auth))]
pub async fn delete_address(
    State(state): State<AppState>,
    session: Session,
    auth: RequireAuth,
    Path(address_id): Path<String>,
) -> Result<Response> {
    let RequireAuth(customer) = auth;
    let address_id = AddressId::new(address_id);

    match state
        .customer()
        .delete_address(&customer.token, &address_id)
        .await
    {
        Ok(()) => {
            set_flash(&session, FlashLevel::Success, "Address deleted.").await?;
        }
        Err(error) => {
            tracing::error!(%error, address_id = %address_id, "address delete failed");
            set_flash(
                &session,
                FlashLevel::Error,
                "Could not delete the address. Please try again.",
            )
            .await?;
        }
    }

    Ok([("hx-redirect", "/account/addresses")].into_response())
}

/// Mark an address as the default.
#[instrument(skip(state, session, auth))]
pub async fn set_default_address(
    State(state): State<AppState>,
    session: Session,
    auth: RequireAuth,
    Path(address_id): Path<String>,
) -> Result<Response> {
    let RequireAuth(customer) = auth;
    let address_id = AddressId::new(address_id);

    match state
        .customer()
        .set_default_address(&customer.token, &address_id)
        .await
    {
        Ok(()) => {
            set_flash(&session, FlashLevel::Success, "Default address updated.").await?;
        }
        Err(error) => {
            tracing::error!(%error, address_id = %address_id, "set default address failed");
            set_flash(
                &session,
                FlashLevel::Error,
                "Could not change the default address. Please try again.",
            )
            .await?;
        }
    }

    Ok(Redirect::to("/account/addresses").into_response())
}

// =============================================================================
// Orders
// =============================================================================

/// Display the order history.
#[instrument(skip(state, auth))]
pub async fn orders(State(state): State<AppState>, auth: RequireAuth) -> Result<impl IntoResponse> {
    let RequireAuth(customer) = auth;
    let orders = state.customer().list_orders(&customer.token).await?;

    Ok(OrdersTemplate {
        orders: orders.iter().map(OrderView::from).collect(),
    })
}
