//! HTTP request handlers for API endpoints.

pub mod health;
pub mod redirect;
pub mod url;

pub use health::health_handler;
pub use redirect::redirect_handler;
pub use url::{create_url_handler, resolve_url_handler};
