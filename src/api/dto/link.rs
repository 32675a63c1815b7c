//! DTOs for link creation and statistics endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::entities::{Link, LinkStats};
use crate::utils::code_generator::validate_custom_code;

/// Applies the shared custom code rules during request validation.
fn validate_short_code(code: &str) -> Result<(), ValidationError> {
    validate_custom_code(code)
        .map_err(|e| ValidationError::new("short_code").with_message(e.to_string().into()))
}

/// Request to create one short link.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// Redirect target. Checked by
    /// [`validate_target_url`](crate::utils::url_validator::validate_target_url).
    pub url: Option<String>,

    /// Optional caller-chosen code, used verbatim.
    #[validate(custom(function = "validate_short_code"))]
    pub custom_code: Option<String>,

    /// Optional expiry timestamp. After this time the link answers 410 Gone.
    pub expires_at: Option<DateTime<Utc>>,
}

/// A stored link as returned by the create endpoint.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub short_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: i64,
}

impl LinkResponse {
    pub fn new(link: Link, short_url: String) -> Self {
        Self {
            id: link.id,
            short_code: link.short_code,
            original_url: link.original_url,
            short_url,
            created_at: link.created_at,
            expires_at: link.expires_at,
            click_count: link.click_count,
        }
    }
}

/// Statistics of a single link.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub short_code: String,
    pub original_url: String,
    pub short_url: String,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_expired: bool,
}

impl StatsResponse {
    pub fn new(stats: LinkStats, short_url: String) -> Self {
        Self {
            short_code: stats.short_code,
            original_url: stats.original_url,
            short_url,
            click_count: stats.click_count,
            created_at: stats.created_at,
            expires_at: stats.expires_at,
            is_expired: stats.is_expired,
        }
    }
}
