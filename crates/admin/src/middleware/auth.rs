//! The login wall, as an extractor.
//!
//! The owner identity lives in the session; [`RequireOwner`] only reads it,
//! it never calls the platform.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentOwner, keys};

/// Extractor that requires a signed-in owner.
///
/// Every page behind the login wall takes this; an unauthenticated request
/// is redirected to the login form.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireOwner(owner): RequireOwner) -> impl IntoResponse {
///     format!("managing {}", owner.store_name)
/// }
/// ```
pub struct RequireOwner(pub CurrentOwner);

/// Rejection that redirects to the login form.
pub struct OwnerAuthRejection;

impl IntoResponse for OwnerAuthRejection {
    fn into_response(self) -> Response {
        Redirect::to("/login").into_response()
    }
}

impl<S> FromRequestParts<S> for RequireOwner
where
    S: Send + Sync,
{
    type Rejection = OwnerAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Session is placed in extensions by SessionManagerLayer.
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(OwnerAuthRejection)?;

        let owner: CurrentOwner = session
            .get(keys::CURRENT_OWNER)
            .await
            .ok()
            .flatten()
            .ok_or(OwnerAuthRejection)?;

        Ok(Self(owner))
    }
}

/// Helper to store the signed-in owner in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_owner(
    session: &Session,
    owner: &CurrentOwner,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CURRENT_OWNER, owner).await
}

/// Helper to clear the signed-in owner from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_owner(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentOwner>(keys::CURRENT_OWNER).await?;
    Ok(())
}
