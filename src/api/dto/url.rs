//! DTOs for the `/url` endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create a short URL.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUrlRequest {
    /// The redirect target. Only presence is checked, not URL syntax.
    #[validate(
        required(message = "originalUrl is required"),
        length(min = 1, message = "originalUrl is required")
    )]
    pub original_url: Option<String>,

    /// Optional caller-chosen slug. Empty is treated as absent.
    pub custom_slug: Option<String>,
}

/// Response for a created short URL.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUrlResponse {
    pub message: String,
    pub short_url: String,
    pub short_code: String,
    pub target_url: String,
    pub created_at: DateTime<Utc>,
}

/// Query string of `GET /url`.
#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub slug: Option<String>,
}

/// Response for a resolved slug.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    pub message: String,
    pub original_url: String,
    pub visits: i64,
    pub created_at: DateTime<Utc>,
}
