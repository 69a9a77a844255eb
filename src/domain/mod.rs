//! Domain layer containing the URL mapping entity and the storage contract.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers. Repository traits define contracts implemented by
//! `crate::infrastructure::persistence`.

pub mod entities;
pub mod repositories;
