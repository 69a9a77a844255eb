//! Data Transfer Objects for API requests and responses.
//!
//! Field names follow the camelCase JSON contract of the public API.

pub mod health;
pub mod url;
