//! Core domain entities.
//!
//! - [`UrlMapping`] - A stored slug to URL mapping
//! - [`NewUrlMapping`] - Input for creating a mapping
//! - [`Resolution`] - Result of resolving a slug

pub mod url_mapping;

pub use url_mapping::{NewUrlMapping, Resolution, UrlMapping};
