//! Platform landing page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;

use super::PageContext;

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub signup_url: String,
    pub login_url: String,
}

/// GET /
#[instrument(skip_all)]
pub async fn landing(State(state): State<AppState>, nonce: CspNonce) -> impl IntoResponse {
    let dashboard_url = &state.config().dashboard_url;
    HomeTemplate {
        signup_url: format!("{dashboard_url}/auth/signup"),
        login_url: format!("{dashboard_url}/auth/login"),
        page: PageContext::platform(&state, &nonce, "Converty - launch your online store"),
    }
}
