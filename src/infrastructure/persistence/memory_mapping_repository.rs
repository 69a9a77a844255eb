//! In-memory implementation of the mapping repository.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;

use crate::domain::entities::{NewUrlMapping, UrlMapping};
use crate::domain::repositories::MappingRepository;
use crate::error::AppError;

/// Process-local mapping storage backed by a sharded concurrent map.
///
/// Insert-if-absent goes through the entry API and increments happen under
/// the shard write lock, so both are atomic. Data does not survive a restart.
#[derive(Debug, Default)]
pub struct InMemoryMappingRepository {
    storage: DashMap<String, UrlMapping>,
}

impl InMemoryMappingRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// Number of stored mappings.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl MappingRepository for InMemoryMappingRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<UrlMapping>, AppError> {
        Ok(self.storage.get(slug).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, new_mapping: NewUrlMapping) -> Result<UrlMapping, AppError> {
        match self.storage.entry(new_mapping.slug.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(
                "Slug already exists",
                json!({ "slug": new_mapping.slug }),
            )),
            Entry::Vacant(vacant) => {
                let mapping = new_mapping.into_mapping();
                vacant.insert(mapping.clone());
                Ok(mapping)
            }
        }
    }

    async fn increment_visits(&self, slug: &str) -> Result<Option<i64>, AppError> {
        Ok(self.storage.get_mut(slug).map(|mut entry| {
            entry.visits += 1;
            entry.visits
        }))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
