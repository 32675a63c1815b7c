//! Handlers for link management endpoints (create, delete).

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use serde_json::json;
use validator::Validate;

use crate::api::dto::link::{CreateLinkRequest, LinkResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::url_validator::validate_target_url;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/page",
///   "custom_code": "abc123",              // optional
///   "expires_at": "2030-01-01T00:00:00Z"  // optional
/// }
/// ```
///
/// # Response Codes
///
/// - **201 Created**: link stored, body is the link with its `short_url`
/// - **400 Bad Request**: malformed JSON, bad URL, bad code or past expiry
/// - **409 Conflict**: custom code taken or no free code found
/// - **500 Internal Server Error**: storage failure
pub async fn create_link_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let Some(url) = payload.url else {
        return Err(AppError::bad_request(
            "URL is required",
            json!({ "field": "url" }),
        ));
    };

    validate_target_url(&url)
        .map_err(|e| AppError::bad_request(e.to_string(), json!({ "url": url })))?;

    if let Some(expires_at) = payload.expires_at
        && expires_at <= Utc::now()
    {
        return Err(AppError::bad_request(
            "Expiry must be in the future",
            json!({ "expires_at": expires_at }),
        ));
    }

    let link = state
        .shortener
        .create_link(url, payload.custom_code, payload.expires_at)
        .await?;

    let short_url = state.shortener.short_url(&link.short_code);

    Ok((StatusCode::CREATED, Json(LinkResponse::new(link, short_url))))
}

/// Deletes a link so its code no longer resolves and may be reused.
///
/// # Endpoint
///
/// `DELETE /api/links/{code}`
///
/// # Errors
///
/// Returns 404 Not Found if no link uses the code.
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.shortener.delete(&code).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(
            "Short link not found",
            json!({ "short_code": code }),
        ))
    }
}
