//! Store settings route handlers.
//!
//! One page, one form. A successful save refreshes the signed-in owner's
//! cached store name so the sidebar picks up renames immediately.

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
use crate::middleware::{RequireOwner, set_current_owner};
use crate::models::{CurrentOwner, Flash, FlashLevel, set_flash, take_flash};
use crate::platform::types::{SettingsInput, StoreDetails};
use crate::state::AppState;

/// Settings form data.
#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    pub name: String,
    pub description: String,
    pub contact_email: String,
    pub support_phone: String,
}

impl SettingsForm {
    /// Trim everything and drop blank optionals.
    fn into_input(self) -> SettingsInput {
        let optional = |value: String| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        SettingsInput {
            name: self.name.trim().to_string(),
            description: optional(self.description),
            contact_email: optional(self.contact_email),
            support_phone: optional(self.support_phone),
        }
    }
}

/// Form values as strings, for prefills and rerenders.
#[derive(Debug, Clone)]
pub struct SettingsFormView {
    pub name: String,
    pub description: String,
    pub contact_email: String,
    pub support_phone: String,
}

impl From<&StoreDetails> for SettingsFormView {
    fn from(store: &StoreDetails) -> Self {
        Self {
            name: store.name.clone(),
            description: store.description.clone().unwrap_or_default(),
            contact_email: store.contact_email.clone().unwrap_or_default(),
            support_phone: store.support_phone.clone().unwrap_or_default(),
        }
    }
}

impl From<&SettingsInput> for SettingsFormView {
    fn from(input: &SettingsInput) -> Self {
        Self {
            name: input.name.clone(),
            description: input.description.clone().unwrap_or_default(),
            contact_email: input.contact_email.clone().unwrap_or_default(),
            support_phone: input.support_phone.clone().unwrap_or_default(),
        }
    }
}

/// Settings page template.
#[derive(Template, WebTemplate)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub store_name: String,
    pub current_path: &'static str,
    pub flash: Option<Flash>,
    pub form: SettingsFormView,
    pub error: Option<String>,
}

/// Display the settings form, prefilled from the platform record.
#[instrument(skip(owner, state, session))]
pub async fn show(
    RequireOwner(owner): RequireOwner,
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse> {
    let flash = take_flash(&session).await?;
    let store = state.platform().store_details().await?;

    Ok(SettingsTemplate {
        store_name: owner.store_name,
        current_path: "/settings",
        flash,
        form: SettingsFormView::from(&store),
        error: None,
    })
}

/// Handle settings form submission.
#[instrument(skip(owner, state, session, form))]
pub async fn update(
    RequireOwner(owner): RequireOwner,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SettingsForm>,
) -> Result<Response> {
    let mut input = form.into_input();
    let view = SettingsFormView::from(&input);
    let rerender = move |error: String| SettingsTemplate {
        store_name: owner.store_name,
        current_path: "/settings",
        flash: None,
        form: view,
        error: Some(error),
    };

    if input.name.is_empty() {
        return Ok(rerender("The store needs a name.".to_string()).into_response());
    }

    if let Some(raw) = input.contact_email.take() {
        let Ok(email) = Email::parse(&raw) else {
            return Ok(rerender("Enter a valid contact email address.".to_string()).into_response());
        };
        input.contact_email = Some(email.into_inner());
    }

    match state.platform().update_settings(&input).await {
        Ok(()) => {
            let refreshed = CurrentOwner {
                store_name: input.name.clone(),
            };
            if let Err(error) = set_current_owner(&session, &refreshed).await {
                tracing::warn!(%error, "failed to refresh cached store name");
            }
            tracing::info!(store = %input.name, "settings saved");
            set_flash(&session, FlashLevel::Success, "Settings saved.").await?;
            Ok(Redirect::to("/settings").into_response())
        }
        Err(error) => {
            tracing::error!(%error, "failed to save settings");
            Ok(rerender("The platform rejected the change. Try again.".to_string())
                .into_response())
        }
    }
}
