//! Dashboard overview route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireOwner;
use crate::models::{Flash, take_flash};
use crate::platform::types::StoreOverview;
use crate::state::AppState;

/// Dashboard overview template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub store_name: String,
    pub current_path: &'static str,
    pub flash: Option<Flash>,
    pub overview: StoreOverview,
}

/// Display the overview counters.
#[instrument(skip(owner, state, session))]
pub async fn index(
    RequireOwner(owner): RequireOwner,
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse> {
    let flash = take_flash(&session).await?;
    let overview = state.platform().overview().await?;

    Ok(DashboardTemplate {
        store_name: owner.store_name,
        current_path: "/",
        flash,
        overview,
    })
}
