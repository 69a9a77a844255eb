//! Repository trait for URL mapping storage.

use crate::domain::entities::{NewUrlMapping, UrlMapping};
use crate::error::AppError;
use async_trait::async_trait;

/// Persistence backend for URL mappings.
///
/// Implementations own all cross-request synchronization: `insert` must be
/// an atomic insert-if-absent and `increment_visits` an atomic `+1`.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgMappingRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryMappingRepository`] - Process-local map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingRepository: Send + Sync {
    /// Finds a mapping by exact slug match.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BackendUnavailable`] if the backend cannot be reached.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<UrlMapping>, AppError>;

    /// Stores a new mapping if its slug is not taken yet.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if a mapping with the same slug exists.
    /// Returns [`AppError::BackendUnavailable`] if the backend cannot be reached.
    async fn insert(&self, new_mapping: NewUrlMapping) -> Result<UrlMapping, AppError>;

    /// Atomically increments the visit counter.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(count))` with the counter value after the increment
    /// - `Ok(None)` if no mapping has this slug
    async fn increment_visits(&self, slug: &str) -> Result<Option<i64>, AppError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
