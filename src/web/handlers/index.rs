//! Index page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use axum::response::IntoResponse;

use crate::state::AppState;

/// Template for the index page.
///
/// Renders `templates/index.html`: a form that posts to `POST /api/links`
/// and shows the resulting short URL.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    /// Prefix shown in front of the custom code field.
    pub short_url_prefix: String,
}

/// Renders the index page.
///
/// # Endpoint
///
/// `GET /`
pub async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    IndexTemplate {
        short_url_prefix: state.shortener.short_url(""),
    }
}
