//! Owner sign-in and sign-out.
//!
//! Login takes the store's API key and validates it against the platform by
//! fetching the store record with it: the platform only serves the record to
//! a key scoped to this store, so a success authenticates the owner. The
//! session stores the proof (and the store name), never the key itself.

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

use crate::middleware::{clear_current_owner, set_current_owner};
use crate::models::{CurrentOwner, keys};
use crate::platform::PlatformError;
use crate::state::AppState;

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub api_key: String,
}

// Manual Debug so a pasted key can never reach logs through the form.
impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// Display the key entry form, or skip it for a signed-in owner.
pub async fn show_login(session: Session) -> Response {
    let signed_in = session
        .get::<CurrentOwner>(keys::CURRENT_OWNER)
        .await
        .ok()
        .flatten()
        .is_some();

    if signed_in {
        return Redirect::to("/").into_response();
    }

    LoginTemplate { error: None }.into_response()
}

/// Handle key submission: validate against the platform and open a session.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let candidate = form.api_key.trim();
    if candidate.is_empty() {
        return LoginTemplate {
            error: Some("Enter the store API key.".to_string()),
        }
        .into_response();
    }

    let store = match state.platform().validate_key(candidate).await {
        Ok(store) => store,
        Err(error) => {
            tracing::warn!(%error, "API key validation failed");
            let message = if error.is_auth_rejection() {
                "That key doesn't open this store.".to_string()
            } else if let PlatformError::RateLimited(_) = error {
                "Too many attempts. Wait a minute and try again.".to_string()
            } else {
                "Couldn't reach the platform. Try again shortly.".to_string()
            };
            return LoginTemplate {
                error: Some(message),
            }
            .into_response();
        }
    };

    let owner = CurrentOwner {
        store_name: store.name,
    };
    if let Err(error) = set_current_owner(&session, &owner).await {
        tracing::error!(%error, "failed to store owner in session");
        return LoginTemplate {
            error: Some("Something went wrong. Please try again.".to_string()),
        }
        .into_response();
    }

    tracing::info!(store = %owner.store_name, "owner signed in");
    Redirect::to("/").into_response()
}

/// Handle logout: tear down the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(error) = clear_current_owner(&session).await {
        tracing::error!(%error, "failed to clear owner from session");
    }

    if let Err(error) = session.flush().await {
        tracing::error!(%error, "failed to flush session");
    }

    Redirect::to("/login").into_response()
}
