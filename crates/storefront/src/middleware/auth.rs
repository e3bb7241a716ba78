//! Who is signed in, as extractors.
//!
//! The customer identity (including the platform auth token) lives in the
//! session; [`RequireAuth`] and [`OptionalAuth`] only read it, they never
//! call the platform.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::CurrentCustomer;
use crate::models::session::keys;

/// Extractor that requires a signed-in customer.
///
/// Browser navigations are redirected to the login page with the attempted
/// path carried in `?next=`; HTMX fragment requests get a 401 with an
/// `HX-Redirect` header so the whole page navigates instead of the fragment.
///
/// # Example
///
/// ```rust,ignore
/// async fn orders(RequireAuth(customer): RequireAuth) -> impl IntoResponse {
///     format!("orders for {}", customer.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentCustomer);

/// Error returned when authentication is required but nobody is signed in.
pub enum AuthRejection {
    /// Full-page redirect to the login form.
    RedirectToLogin(String),
    /// 401 with an `HX-Redirect` header (HTMX fragment requests).
    HxRedirectToLogin(String),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(login_url) => Redirect::to(&login_url).into_response(),
            Self::HxRedirectToLogin(login_url) => {
                (StatusCode::UNAUTHORIZED, [("hx-redirect", login_url)]).into_response()
            }
        }
    }
}

/// Builds the login URL carrying the attempted path for post-login redirect.
fn login_url_for(parts: &Parts) -> String {
    let next = parts
        .uri
        .path_and_query()
        .map_or("/", |pq| pq.as_str());
    format!("/login?next={}", urlencoding::encode(next))
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let reject = |parts: &Parts| {
            let login_url = login_url_for(parts);
            if parts.headers.contains_key("hx-request") {
                AuthRejection::HxRedirectToLogin(login_url)
            } else {
                AuthRejection::RedirectToLogin(login_url)
            }
        };

        // Session is placed in extensions by SessionManagerLayer.
        let Some(session) = parts.extensions.get::<Session>() else {
            return Err(reject(parts));
        };

        let customer: Option<CurrentCustomer> = session
            .get(keys::CURRENT_CUSTOMER)
            .await
            .ok()
            .flatten();

        match customer {
            Some(customer) => Ok(Self(customer)),
            None => Err(reject(parts)),
        }
    }
}

/// The current customer if anyone is signed in; never rejects.
///
/// Pages that render for guests too (home, catalog, cart) use this to pick
/// the right header and cart mode.
pub struct OptionalAuth(pub Option<CurrentCustomer>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentCustomer>(keys::CURRENT_CUSTOMER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(customer))
    }
}

/// Helper to store the signed-in customer in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CURRENT_CUSTOMER, customer).await
}

/// Helper to clear the signed-in customer from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_customer(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentCustomer>(keys::CURRENT_CUSTOMER)
        .await?;
    Ok(())
}
