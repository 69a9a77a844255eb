//! Repository trait definitions for the domain layer.
//!
//! - [`MappingRepository`] - Persistence backend for URL mappings
//!
//! Mock implementations are generated via `mockall` for unit tests.

pub mod mapping_repository;

pub use mapping_repository::MappingRepository;

#[cfg(test)]
pub use mapping_repository::MockMappingRepository;
