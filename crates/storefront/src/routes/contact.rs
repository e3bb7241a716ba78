//! Contact form route handlers.
//!
//! Renders the contact page and forwards submissions to the platform, which
//! relays them to the store owner. Validation failures re-render the form
//! with the visitor's input preserved.

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
use vendora_core::Email;

use crate::error::Result;
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::session::{Flash, FlashLevel, set_flash, take_flash};
use crate::platform::types::ContactRequest;
use crate::state::AppState;

/// Contact form submission.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Field values echoed back into the form on a failed submission.
#[derive(Debug, Default)]
pub struct ContactFormView {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl From<&ContactForm> for ContactFormView {
    fn from(form: &ContactForm) -> Self {
        Self {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_lowercase(),
            subject: form.subject.trim().to_string(),
            message: form.message.trim().to_string(),
        }
    }
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub form: ContactFormView,
    pub error: Option<String>,
    pub flash: Option<Flash>,
    pub nonce: String,
}

/// Display the contact form.
#[instrument(skip(session))]
pub async fn show(session: Session, CspNonce(nonce): CspNonce) -> Result<impl IntoResponse> {
    let flash = take_flash(&session).await?;

    Ok(ContactTemplate {
        form: ContactFormView::default(),
        error: None,
        flash,
        nonce,
    })
}

/// Submit the contact form.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Form(form): Form<ContactForm>,
) -> Result<Response> {
    let view = ContactFormView::from(&form);

    let rerender = |view: ContactFormView, error: &str| ContactTemplate {
        form: view,
        error: Some(error.to_string()),
        flash: None,
        nonce,
    };

    let Ok(email) = Email::parse(&form.email) else {
        return Ok(rerender(view, "Please enter a valid email address.").into_response());
    };

    if view.name.is_empty() || view.subject.is_empty() || view.message.is_empty() {
        return Ok(rerender(view, "All fields are required.").into_response());
    }

    let request = ContactRequest {
        name: view.name.clone(),
        email: email.into_inner(),
        subject: view.subject.clone(),
        message: view.message.clone(),
    };

    match state.store().submit_contact(&request).await {
        Ok(()) => {
            tracing::info!(email = %view.email, "Contact message sent");
            set_flash(
                &session,
                FlashLevel::Success,
                "Thanks for reaching out. We'll get back to you soon.",
            )
            .await?;
            Ok(Redirect::to("/contact").into_response())
        }
        Err(error) => {
            tracing::error!(error = %error, "Failed to submit contact message");
            Ok(rerender(view, "Something went wrong. Please try again.").into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_trims_and_folds_input() {
        let view = ContactFormView::from(&ContactForm {
            name: "  Ada  ".to_string(),
            email: " Ada@Example.COM ".to_string(),
            subject: "Order question".to_string(),
            message: " Where is it? ".to_string(),
        });

        assert_eq!(view.name, "Ada");
        assert_eq!(view.email, "ada@example.com");
        assert_eq!(view.message, "Where is it?");
    }
}
