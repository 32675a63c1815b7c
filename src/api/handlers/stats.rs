//! Handler for link statistics.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::json;

use crate::api::dto::link::StatsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns click count and metadata for a short link.
///
/// # Endpoint
///
/// `GET /api/links/{code}`
///
/// Does not count as a click. Expired links are still reported, with
/// `is_expired: true`.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.shortener.stats(&code).await?.ok_or_else(|| {
        AppError::not_found("Short link not found", json!({ "short_code": code }))
    })?;

    let short_url = state.shortener.short_url(&stats.short_code);

    Ok(Json(StatsResponse::new(stats, short_url)))
}
