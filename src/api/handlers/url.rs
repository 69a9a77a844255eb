//! Handlers for creating and resolving short URLs.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::url::{CreateUrlRequest, CreateUrlResponse, ResolveQuery, ResolveResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short URL.
///
/// # Endpoint
///
/// `POST /url`
///
/// # Request Body
///
/// ```json
/// { "originalUrl": "https://example.com", "customSlug": "promo" }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "message": "URL shortened successfully",
///   "shortUrl": "https://s.example.com/url/promo",
///   "shortCode": "promo",
///   "targetUrl": "https://example.com",
///   "createdAt": "2024-01-15T10:30:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 400 if the body is malformed, `originalUrl` is missing or `customSlug`
///   contains disallowed characters
/// - 409 if `customSlug` is already taken
/// - 500 if the storage backend fails
pub async fn create_url_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateUrlResponse>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let original_url = payload.original_url.ok_or_else(|| {
        AppError::bad_request("originalUrl is required", json!({ "field": "originalUrl" }))
    })?;

    let mapping = state
        .shortener
        .create(original_url, payload.custom_slug)
        .await?;

    let response = CreateUrlResponse {
        message: "URL shortened successfully".to_string(),
        short_url: state.shortener.short_url(&mapping.slug),
        short_code: mapping.slug,
        target_url: mapping.original_url,
        created_at: mapping.created_at,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Resolves a slug and counts the visit.
///
/// # Endpoint
///
/// `GET /url?slug=<slug>`
///
/// # Response
///
/// ```json
/// {
///   "message": "URL retrieved successfully",
///   "originalUrl": "https://example.com",
///   "visits": 1,
///   "createdAt": "2024-01-15T10:30:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 400 if `slug` is missing or empty, or the query string is malformed
/// - 404 if no mapping exists
/// - 500 if the storage backend fails
pub async fn resolve_url_handler(
    State(state): State<AppState>,
    query: Result<Query<ResolveQuery>, QueryRejection>,
) -> Result<Json<ResolveResponse>, AppError> {
    let Query(query) = query?;
    let slug = query.slug.unwrap_or_default();

    let resolution = state.shortener.resolve(&slug).await?;

    Ok(Json(ResolveResponse {
        message: "URL retrieved successfully".to_string(),
        original_url: resolution.original_url,
        visits: resolution.visits,
        created_at: resolution.created_at,
    }))
}
