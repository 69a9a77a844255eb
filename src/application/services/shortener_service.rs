//! Slug resolution, mapping creation and visit counting.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::domain::entities::{NewUrlMapping, Resolution, UrlMapping};
use crate::domain::repositories::MappingRepository;
use crate::error::AppError;
use crate::utils::slug::{generate_slug, is_valid_slug};

/// Total attempts for a generated slug, including the first one.
pub const MAX_GENERATION_ATTEMPTS: usize = 5;

/// Service for creating and resolving short URL mappings.
///
/// The repository is injected, so the same service runs on PostgreSQL, on
/// the in-memory backend or on a mock.
pub struct ShortenerService<R: MappingRepository + ?Sized = dyn MappingRepository> {
    repository: Arc<R>,
    base_url: String,
}

impl<R: MappingRepository + ?Sized> ShortenerService<R> {
    /// Creates a new shortener service.
    ///
    /// `base_url` is the public prefix short links are served under, e.g.
    /// `https://s.example.com/url`.
    pub fn new(repository: Arc<R>, base_url: impl Into<String>) -> Self {
        Self {
            repository,
            base_url: base_url.into(),
        }
    }

    /// Creates a mapping for `original_url`.
    ///
    /// # Slug Resolution
    ///
    /// - A non-empty `custom_slug` is validated and used as is
    /// - An absent or empty `custom_slug` gets a generated 6-character slug
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `original_url` is empty or the
    /// custom slug contains disallowed characters. No write happens then.
    ///
    /// Returns [`AppError::Conflict`] if the custom slug is already taken.
    ///
    /// Returns [`AppError::BackendUnavailable`] if the backend fails or no
    /// free slug was found after [`MAX_GENERATION_ATTEMPTS`] tries.
    pub async fn create(
        &self,
        original_url: String,
        custom_slug: Option<String>,
    ) -> Result<UrlMapping, AppError> {
        if original_url.is_empty() {
            return Err(AppError::bad_request(
                "originalUrl is required",
                json!({ "field": "originalUrl" }),
            ));
        }

        let mapping = match custom_slug.filter(|slug| !slug.is_empty()) {
            Some(slug) => self.create_with_custom_slug(original_url, slug).await?,
            None => self.create_with_generated_slug(original_url).await?,
        };

        metrics::counter!("shortener_mappings_created_total").increment(1);
        info!(slug = %mapping.slug, "Created URL mapping");

        Ok(mapping)
    }

    /// Resolves a slug and counts the visit.
    ///
    /// Every call counts, including repeated calls for the same slug.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `slug` is empty.
    /// Returns [`AppError::NotFound`] if no mapping has this slug.
    /// Returns [`AppError::BackendUnavailable`] on backend failures.
    pub async fn resolve(&self, slug: &str) -> Result<Resolution, AppError> {
        if slug.is_empty() {
            return Err(AppError::bad_request(
                "slug parameter is required",
                json!({ "field": "slug" }),
            ));
        }

        let mapping = self
            .repository
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| not_found(slug))?;

        // Mappings are never deleted, so a miss here only happens if storage
        // was modified out of band.
        let visits = self
            .repository
            .increment_visits(slug)
            .await?
            .ok_or_else(|| not_found(slug))?;

        metrics::counter!("shortener_resolutions_total").increment(1);
        debug!(slug, visits, "Resolved URL mapping");

        Ok(Resolution {
            original_url: mapping.original_url,
            visits,
            created_at: mapping.created_at,
        })
    }

    /// Reads a mapping without counting a visit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no mapping has this slug.
    pub async fn get(&self, slug: &str) -> Result<UrlMapping, AppError> {
        self.repository
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| not_found(slug))
    }

    /// Builds the public short URL for a slug.
    pub fn short_url(&self, slug: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), slug)
    }

    /// Checks that the storage backend answers.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }

    async fn create_with_custom_slug(
        &self,
        original_url: String,
        slug: String,
    ) -> Result<UrlMapping, AppError> {
        if !is_valid_slug(&slug) {
            return Err(AppError::bad_request(
                "customSlug contains invalid characters. Only alphanumeric characters, hyphens, and underscores are allowed.",
                json!({ "customSlug": slug }),
            ));
        }

        if self.repository.find_by_slug(&slug).await?.is_some() {
            return Err(slug_taken(&slug));
        }

        // The storage layer rejects a concurrent insert of the same slug.
        self.repository
            .insert(NewUrlMapping::new(slug.clone(), original_url))
            .await
            .map_err(|e| match e {
                AppError::Conflict { .. } => slug_taken(&slug),
                other => other,
            })
    }

    /// Inserts under a fresh random slug, retrying with backoff on collision.
    async fn create_with_generated_slug(&self, original_url: String) -> Result<UrlMapping, AppError> {
        let repository = self.repository.as_ref();
        let original_url = original_url.as_str();

        let strategy = ExponentialBackoff::from_millis(2)
            .factor(5)
            .max_delay(Duration::from_millis(200))
            .map(jitter)
            .take(MAX_GENERATION_ATTEMPTS - 1);

        let attempt = move || {
            let new_mapping = NewUrlMapping::new(generate_slug(), original_url.to_owned());
            repository.insert(new_mapping)
        };

        let is_collision = |e: &AppError| {
            let collided = matches!(e, AppError::Conflict { .. });
            if collided {
                metrics::counter!("shortener_slug_collisions_total").increment(1);
                warn!("Generated slug collided with an existing mapping, retrying");
            }
            collided
        };

        RetryIf::spawn(strategy, attempt, is_collision)
            .await
            .map_err(|e| match e {
                AppError::Conflict { .. } => AppError::backend_unavailable(
                    "Failed to generate a unique slug",
                    json!({ "attempts": MAX_GENERATION_ATTEMPTS }),
                ),
                other => other,
            })
    }
}

fn not_found(slug: &str) -> AppError {
    AppError::not_found("URL not found", json!({ "slug": slug }))
}

fn slug_taken(slug: &str) -> AppError {
    AppError::conflict("Custom slug already in use", json!({ "slug": slug }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockMappingRepository;
    use crate::infrastructure::persistence::InMemoryMappingRepository;
    use chrono::Utc;

    const BASE_URL: &str = "https://s.example.com/url";

    fn create_test_mapping(slug: &str, url: &str, visits: i64) -> UrlMapping {
        UrlMapping::new(slug.to_string(), url.to_string(), Utc::now(), visits)
    }

    fn memory_service() -> ShortenerService<InMemoryMappingRepository> {
        ShortenerService::new(Arc::new(InMemoryMappingRepository::new()), BASE_URL)
    }

    #[tokio::test]
    async fn test_create_with_generated_slug() {
        let mut mock_repo = MockMappingRepository::new();

        mock_repo.expect_find_by_slug().times(0);
        mock_repo
            .expect_insert()
            .withf(|new_mapping| new_mapping.slug.len() == 6 && is_valid_slug(&new_mapping.slug))
            .times(1)
            .returning(|new_mapping| Ok(new_mapping.into_mapping()));

        let service = ShortenerService::new(Arc::new(mock_repo), BASE_URL);

        let mapping = service
            .create("https://a.com".to_string(), None)
            .await
            .unwrap();

        assert_eq!(mapping.slug.len(), 6);
        assert!(is_valid_slug(&mapping.slug));
        assert_eq!(mapping.original_url, "https://a.com");
        assert_eq!(mapping.visits, 0);
    }

    #[tokio::test]
    async fn test_create_with_custom_slug() {
        let mut mock_repo = MockMappingRepository::new();

        mock_repo
            .expect_find_by_slug()
            .withf(|slug| slug == "promo")
            .times(1)
            .returning(|_| Ok(None));

        mock_repo
            .expect_insert()
            .withf(|new_mapping| new_mapping.slug == "promo")
            .times(1)
            .returning(|new_mapping| Ok(new_mapping.into_mapping()));

        let service = ShortenerService::new(Arc::new(mock_repo), BASE_URL);

        let mapping = service
            .create(
                "https://example.com".to_string(),
                Some("promo".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(mapping.slug, "promo");
        assert_eq!(mapping.original_url, "https://example.com");
    }

    #[tokio::test]
    async fn test_create_empty_custom_slug_is_generated() {
        let mut mock_repo = MockMappingRepository::new();

        mock_repo.expect_find_by_slug().times(0);
        mock_repo
            .expect_insert()
            .times(1)
            .returning(|new_mapping| Ok(new_mapping.into_mapping()));

        let service = ShortenerService::new(Arc::new(mock_repo), BASE_URL);

        let mapping = service
            .create("https://a.com".to_string(), Some(String::new()))
            .await
            .unwrap();

        assert_eq!(mapping.slug.len(), 6);
    }

    #[tokio::test]
    async fn test_create_invalid_custom_slug_performs_no_write() {
        let mut mock_repo = MockMappingRepository::new();
        mock_repo.expect_find_by_slug().times(0);
        mock_repo.expect_insert().times(0);

        let service = ShortenerService::new(Arc::new(mock_repo), BASE_URL);

        for slug in ["bad slug", "a/b", "ü", "x.y", "percent%"] {
            let result = service
                .create("https://example.com".to_string(), Some(slug.to_string()))
                .await;

            assert!(matches!(result, Err(AppError::Validation { .. })));
        }
    }

    #[tokio::test]
    async fn test_create_empty_url_is_rejected() {
        let mut mock_repo = MockMappingRepository::new();
        mock_repo.expect_insert().times(0);

        let service = ShortenerService::new(Arc::new(mock_repo), BASE_URL);

        let result = service.create(String::new(), None).await;

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert!(err.to_string().contains("originalUrl"));
    }

    #[tokio::test]
    async fn test_create_custom_slug_conflict() {
        let mut mock_repo = MockMappingRepository::new();

        let existing = create_test_mapping("taken", "https://other.com", 3);
        mock_repo
            .expect_find_by_slug()
            .withf(|slug| slug == "taken")
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        mock_repo.expect_insert().times(0);

        let service = ShortenerService::new(Arc::new(mock_repo), BASE_URL);

        let result = service
            .create("https://example.com".to_string(), Some("taken".to_string()))
            .await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_create_custom_slug_lost_race_is_conflict() {
        let mut mock_repo = MockMappingRepository::new();

        mock_repo.expect_find_by_slug().times(1).returning(|_| Ok(None));
        mock_repo.expect_insert().times(1).returning(|_| {
            Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "url_mappings_pkey" }),
            ))
        });

        let service = ShortenerService::new(Arc::new(mock_repo), BASE_URL);

        let err = service
            .create("https://example.com".to_string(), Some("race".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
        assert_eq!(err.to_string(), "Custom slug already in use");
    }

    #[tokio::test]
    async fn test_generated_slug_collision_is_retried() {
        let mut mock_repo = MockMappingRepository::new();
        let mut seq = mockall::Sequence::new();

        mock_repo
            .expect_insert()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::conflict("Slug already exists", json!({}))));
        mock_repo
            .expect_insert()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|new_mapping| Ok(new_mapping.into_mapping()));

        let service = ShortenerService::new(Arc::new(mock_repo), BASE_URL);

        let mapping = service
            .create("https://a.com".to_string(), None)
            .await
            .unwrap();

        assert_eq!(mapping.slug.len(), 6);
    }

    #[tokio::test]
    async fn test_generated_slug_exhaustion() {
        let mut mock_repo = MockMappingRepository::new();

        mock_repo
            .expect_insert()
            .times(MAX_GENERATION_ATTEMPTS)
            .returning(|_| Err(AppError::conflict("Slug already exists", json!({}))));

        let service = ShortenerService::new(Arc::new(mock_repo), BASE_URL);

        let result = service.create("https://a.com".to_string(), None).await;

        assert!(matches!(result, Err(AppError::BackendUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_generated_slug_backend_error_is_not_retried() {
        let mut mock_repo = MockMappingRepository::new();

        mock_repo
            .expect_insert()
            .times(1)
            .returning(|_| Err(AppError::backend_unavailable("down", json!({}))));

        let service = ShortenerService::new(Arc::new(mock_repo), BASE_URL);

        let result = service.create("https://a.com".to_string(), None).await;

        assert!(matches!(result, Err(AppError::BackendUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_resolve_increments_visits() {
        let mut mock_repo = MockMappingRepository::new();

        let mapping = create_test_mapping("abc", "https://example.com", 4);
        let created_at = mapping.created_at;
        mock_repo
            .expect_find_by_slug()
            .withf(|slug| slug == "abc")
            .times(1)
            .returning(move |_| Ok(Some(mapping.clone())));
        mock_repo
            .expect_increment_visits()
            .withf(|slug| slug == "abc")
            .times(1)
            .returning(|_| Ok(Some(5)));

        let service = ShortenerService::new(Arc::new(mock_repo), BASE_URL);

        let resolution = service.resolve("abc").await.unwrap();

        assert_eq!(resolution.original_url, "https://example.com");
        assert_eq!(resolution.visits, 5);
        assert_eq!(resolution.created_at, created_at);
    }

    #[tokio::test]
    async fn test_resolve_not_found_does_not_write() {
        let mut mock_repo = MockMappingRepository::new();

        mock_repo.expect_find_by_slug().times(1).returning(|_| Ok(None));
        mock_repo.expect_increment_visits().times(0);
        mock_repo.expect_insert().times(0);

        let service = ShortenerService::new(Arc::new(mock_repo), BASE_URL);

        let result = service.resolve("doesnotexist").await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_resolve_empty_slug() {
        let mock_repo = MockMappingRepository::new();
        let service = ShortenerService::new(Arc::new(mock_repo), BASE_URL);

        let result = service.resolve("").await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_resolve_backend_unavailable() {
        let mut mock_repo = MockMappingRepository::new();

        mock_repo
            .expect_find_by_slug()
            .times(1)
            .returning(|_| Err(AppError::backend_unavailable("timeout", json!({}))));

        let service = ShortenerService::new(Arc::new(mock_repo), BASE_URL);

        let err = service.resolve("abc").await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_uniqueness_of_custom_slug() {
        let service = memory_service();

        service
            .create("https://one.com".to_string(), Some("abc".to_string()))
            .await
            .unwrap();

        let result = service
            .create("https://two.com".to_string(), Some("abc".to_string()))
            .await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_visit_counter_is_monotonic() {
        let service = memory_service();

        service
            .create("https://example.com".to_string(), Some("abc".to_string()))
            .await
            .unwrap();

        for expected in 1..=10 {
            let resolution = service.resolve("abc").await.unwrap();
            assert_eq!(resolution.visits, expected);
        }
    }

    #[tokio::test]
    async fn test_promo_scenario() {
        let service = memory_service();

        let created = service
            .create(
                "https://example.com".to_string(),
                Some("promo".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(created.slug, "promo");

        let first = service.resolve("promo").await.unwrap();
        assert_eq!(first.original_url, "https://example.com");
        assert_eq!(first.visits, 1);
        assert_eq!(first.created_at, created.created_at);

        let second = service.resolve("promo").await.unwrap();
        assert_eq!(second.visits, 2);
    }

    #[tokio::test]
    async fn test_get_does_not_count_visit() {
        let service = memory_service();

        service
            .create("https://example.com".to_string(), Some("peek".to_string()))
            .await
            .unwrap();

        let mapping = service.get("peek").await.unwrap();
        assert_eq!(mapping.visits, 0);

        service.resolve("peek").await.unwrap();
        let mapping = service.get("peek").await.unwrap();
        assert_eq!(mapping.visits, 1);
    }

    #[tokio::test]
    async fn test_concurrent_resolves_lose_no_increments() {
        let service = Arc::new(memory_service());

        service
            .create("https://example.com".to_string(), Some("hot".to_string()))
            .await
            .unwrap();

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.resolve("hot").await.unwrap().visits })
            })
            .collect();

        let mut counts = Vec::new();
        for handle in handles {
            counts.push(handle.await.unwrap());
        }
        counts.sort_unstable();

        assert_eq!(counts, (1..=50).collect::<Vec<i64>>());
    }

    #[test]
    fn test_short_url() {
        let service = ShortenerService::new(
            Arc::new(MockMappingRepository::new()),
            "https://s.example.com/url/",
        );

        assert_eq!(
            service.short_url("promo"),
            "https://s.example.com/url/promo"
        );
    }
}
