//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::ShortenerService;
use crate::domain::repositories::MappingRepository;

/// State shared by all request handlers.
///
/// Holds no mutable data of its own; the storage backend behind the service
/// is the only shared resource.
#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<ShortenerService>,
}

impl AppState {
    /// Builds state around an already constructed repository.
    pub fn new(repository: Arc<dyn MappingRepository>, base_url: impl Into<String>) -> Self {
        Self {
            shortener: Arc::new(ShortenerService::new(repository, base_url)),
        }
    }
}
