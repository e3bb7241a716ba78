//! Authentication route handlers.
//!
//! Login and signup both run the platform's email OTP flow: submit an email,
//! receive a one-time code, verify it here for a session token. Verification
//! also migrates whatever the guest cart holds onto the server cart, exactly
//! once, before the session becomes a customer session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use vendora_core::Email;

use crate::filters;
use crate::middleware::{clear_current_customer, set_current_customer};
use crate::models::CurrentCustomer;
use crate::models::session::{PendingLogin, event_channel_key, keys};
use crate::platform::PlatformError;
use crate::platform::types::SendOtpRequest;
use crate::routes::cart::cart_for_request;
use crate::state::AppState;

// =============================================================================
// Form and Query Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub next: Option<String>,
}

/// Signup form data. The platform creates the account at first verification,
/// so signup is login plus profile hints.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub next: Option<String>,
}

/// OTP verification form data.
#[derive(Debug, Deserialize)]
pub struct VerifyForm {
    pub otp: String,
}

/// Post-login redirect target carried through the flow.
#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Only allow same-site relative paths as post-login targets.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub next: Option<String>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub error: Option<String>,
    pub next: Option<String>,
}

/// OTP verification page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/verify.html")]
pub struct VerifyTemplate {
    pub email: String,
    pub error: Option<String>,
}

// =============================================================================
// Login and Signup
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<NextQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: None,
        next: query.next,
    }
}

/// Handle login form submission: send a one-time code.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let Ok(email) = Email::parse(&form.email) else {
        return LoginTemplate {
            error: Some("Please enter a valid email address.".to_string()),
            next: form.next,
        }
        .into_response();
    };

    let request = SendOtpRequest {
        email: email.into_inner(),
        first_name: None,
        last_name: None,
    };

    send_code_and_continue(&state, &session, request, form.next, |error, next| {
        LoginTemplate { error, next }.into_response()
    })
    .await
}

/// Display the signup page.
pub async fn signup_page(Query(query): Query<NextQuery>) -> impl IntoResponse {
    SignupTemplate {
        error: None,
        next: query.next,
    }
}

/// Handle signup form submission: send a one-time code with profile hints.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    let Ok(email) = Email::parse(&form.email) else {
        return SignupTemplate {
            error: Some("Please enter a valid email address.".to_string()),
            next: form.next,
        }
        .into_response();
    };

    let clean = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let request = SendOtpRequest {
        email: email.into_inner(),
        first_name: clean(form.first_name),
        last_name: clean(form.last_name),
    };

    send_code_and_continue(&state, &session, request, form.next, |error, next| {
        SignupTemplate { error, next }.into_response()
    })
    .await
}

/// Ask the platform for a code, stash the challenge, move to the verify step.
async fn send_code_and_continue(
    state: &AppState,
    session: &Session,
    request: SendOtpRequest,
    next: Option<String>,
    render_error: impl FnOnce(Option<String>, Option<String>) -> Response,
) -> Response {
    if let Err(error) = state.customer().send_otp(&request).await {
        tracing::warn!(%error, "failed to send one-time code");
        let message = match error {
            PlatformError::RateLimited(_) => {
                "Too many attempts. Wait a minute and try again.".to_string()
            }
            _ => "Could not send a code. Check the address and try again.".to_string(),
        };
        return render_error(Some(message), next);
    }

    let pending = PendingLogin {
        email: request.email,
        next,
    };
    if let Err(error) = session.insert(keys::PENDING_LOGIN, pending).await {
        tracing::error!(%error, "failed to store login challenge");
        return render_error(
            Some("Something went wrong. Please try again.".to_string()),
            None,
        );
    }

    Redirect::to("/login/verify").into_response()
}

// =============================================================================
// Verification
// =============================================================================

/// Display the code entry page.
///
/// With no pending challenge (expired session, direct navigation) the flow
/// restarts at the login form.
pub async fn verify_page(session: Session) -> Response {
    match session.get::<PendingLogin>(keys::PENDING_LOGIN).await {
        Ok(Some(pending)) => VerifyTemplate {
            email: pending.email,
            error: None,
        }
        .into_response(),
        Ok(None) => Redirect::to("/login").into_response(),
        Err(error) => {
            tracing::error!(%error, "failed to read login challenge");
            Redirect::to("/login").into_response()
        }
    }
}

/// Handle code submission: verify, sign in, and migrate the guest cart.
#[instrument(skip(state, session, form))]
pub async fn verify(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<VerifyForm>,
) -> Response {
    let pending = match session.get::<PendingLogin>(keys::PENDING_LOGIN).await {
        Ok(Some(pending)) => pending,
        Ok(None) => return Redirect::to("/login").into_response(),
        Err(error) => {
            tracing::error!(%error, "failed to read login challenge");
            return Redirect::to("/login").into_response();
        }
    };

    let otp = form.otp.trim();
    if otp.is_empty() {
        return VerifyTemplate {
            email: pending.email,
            error: Some("Enter the code from your email.".to_string()),
        }
        .into_response();
    }

    let auth = match state.customer().verify_otp(&pending.email, otp).await {
        Ok(auth) => auth,
        Err(error) => {
            tracing::warn!(%error, "code verification failed");
            let message = match error {
                PlatformError::RateLimited(_) => {
                    "Too many attempts. Wait a minute and try again.".to_string()
                }
                _ => "That code is invalid or expired. Try again.".to_string(),
            };
            return VerifyTemplate {
                email: pending.email,
                error: Some(message),
            }
            .into_response();
        }
    };

    let current = CurrentCustomer {
        id: auth.customer.id.clone(),
        email: auth.customer.email.clone(),
        name: auth.customer.name.clone(),
        token: auth.token.clone(),
    };

    if let Err(error) = set_current_customer(&session, &current).await {
        tracing::error!(%error, "failed to store customer in session");
        return VerifyTemplate {
            email: pending.email,
            error: Some("Something went wrong. Please try again.".to_string()),
        }
        .into_response();
    }

    if let Err(error) = session.remove::<PendingLogin>(keys::PENDING_LOGIN).await {
        tracing::warn!(%error, "failed to clear login challenge");
    }

    crate::error::set_sentry_user(&current.id, Some(&current.email));

    // Promote the guest cart. The façade starts as a guest on purpose:
    // sign_in batches the local lines to the server, clears local storage,
    // and publishes the cart-changed and auth-changed events.
    match cart_for_request(&state, &session, None).await {
        Ok(mut cart) => cart.sign_in(auth.token).await,
        Err(error) => {
            tracing::error!(%error, "cart migration skipped, could not build cart session");
        }
    }

    Redirect::to(safe_next(pending.next.as_deref())).into_response()
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout: tear down the session and its event channel.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    // Grab the channel key before the session is gone, then tell any
    // subscriber the auth state changed and drop the bus.
    if let Ok(channel) = event_channel_key(&session).await {
        state
            .events()
            .bus(&channel)
            .publish(crate::cart::SessionEvent::AuthChanged);
        state.events().remove(&channel);
    }

    if let Err(error) = clear_current_customer(&session).await {
        tracing::error!(%error, "failed to clear customer from session");
    }

    if let Err(error) = session.flush().await {
        tracing::error!(%error, "failed to flush session");
    }

    crate::error::clear_sentry_user();

    Redirect::to("/").into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::safe_next;

    #[test]
    fn test_safe_next_accepts_relative_paths() {
        assert_eq!(safe_next(Some("/checkout")), "/checkout");
        assert_eq!(safe_next(Some("/account/orders")), "/account/orders");
    }

    #[test]
    fn test_safe_next_rejects_external_targets() {
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
