//! Handler for following a short link.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::state::AppState;

/// Page shown when a short link does not exist.
///
/// Renders `templates/not_found.html`.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub slug: String,
}

/// Redirects a slug to its original URL.
///
/// # Endpoint
///
/// `GET /url/{slug}`
///
/// Counts a visit exactly like `GET /url?slug=` and answers with
/// `307 Temporary Redirect`, so browsers come back through the counter on
/// every visit.
///
/// # Errors
///
/// Unknown slugs render an HTML "URL Not Found" page with status 404.
/// Backend failures are returned as JSON errors. A stored target that is not
/// a valid `Location` header value is a JSON 500 and no visit is counted.
pub async fn redirect_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let mapping = match state.shortener.get(&slug).await {
        Ok(mapping) => mapping,
        Err(AppError::NotFound { .. }) => return Ok(not_found_page(slug)),
        Err(e) => return Err(e),
    };

    let location = HeaderValue::try_from(mapping.original_url.as_str()).map_err(|_| {
        warn!(slug = %slug, "Target URL is not a valid Location header");
        AppError::internal(
            "Target URL cannot be used as a redirect location",
            json!({ "slug": slug }),
        )
    })?;

    match state.shortener.resolve(&slug).await {
        Ok(_) => Ok((StatusCode::TEMPORARY_REDIRECT, [(LOCATION, location)]).into_response()),
        Err(AppError::NotFound { .. }) => Ok(not_found_page(slug)),
        Err(e) => Err(e),
    }
}

fn not_found_page(slug: String) -> Response {
    debug!(slug = %slug, "Short link not found");
    (StatusCode::NOT_FOUND, NotFoundTemplate { slug }).into_response()
}
