//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL and counts the click.
///
/// # Endpoint
///
/// `GET /r/{code}`
///
/// # Response Codes
///
/// - **302 Found** (or **301 Moved Permanently** when configured) with
///   `Location` set to the stored URL
/// - **404 Not Found**: unknown code
/// - **410 Gone**: the link has expired; no click is recorded
/// - **500 Internal Server Error**: the stored URL is not a valid header value
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let link = state.shortener.resolve_for_redirect(&code).await?;

    let status = if state.permanent_redirects {
        StatusCode::MOVED_PERMANENTLY
    } else {
        StatusCode::FOUND
    };

    let location = HeaderValue::try_from(link.original_url).map_err(|e| {
        AppError::internal(
            "Stored URL cannot be used as a redirect target",
            json!({ "short_code": code, "reason": e.to_string() }),
        )
    })?;

    debug!(short_code = %code, status = status.as_u16(), "Redirecting");

    Ok((status, [(header::LOCATION, location)]).into_response())
}
