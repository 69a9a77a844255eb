//! HTTP boundary: translates requests into [`ShortenerService`] calls.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Request processing middleware
//! - [`routes`] - Route configuration
//!
//! [`ShortenerService`]: crate::application::services::ShortenerService

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
