//! API route configuration.

use crate::api::handlers::{create_url_handler, redirect_handler, resolve_url_handler};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Short URL routes.
///
/// # Endpoints
///
/// - `POST /url`          - Create a short URL
/// - `GET  /url?slug=`    - Resolve a slug as JSON (counts a visit)
/// - `GET  /url/{slug}`   - Follow a short link (counts a visit, 307 redirect)
pub fn url_routes() -> Router<AppState> {
    Router::new()
        .route("/url", get(resolve_url_handler).post(create_url_handler))
        .route("/url/{slug}", get(redirect_handler))
}
