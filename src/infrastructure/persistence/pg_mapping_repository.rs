//! PostgreSQL implementation of the mapping repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{NewUrlMapping, UrlMapping};
use crate::domain::repositories::MappingRepository;
use crate::error::AppError;

/// Default per-statement timeout.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(sqlx::FromRow)]
struct UrlMappingRow {
    slug: String,
    original_url: String,
    created_at: DateTime<Utc>,
    visits: i64,
}

impl From<UrlMappingRow> for UrlMapping {
    fn from(row: UrlMappingRow) -> Self {
        UrlMapping::new(row.slug, row.original_url, row.created_at, row.visits)
    }
}

/// PostgreSQL repository for URL mappings.
///
/// Each call checks a connection out of the injected pool for a single
/// statement and returns it when the statement completes or times out.
pub struct PgMappingRepository {
    pool: Arc<PgPool>,
    query_timeout: Duration,
}

impl PgMappingRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self::with_query_timeout(pool, DEFAULT_QUERY_TIMEOUT)
    }

    /// Creates a repository whose statements fail with
    /// [`AppError::BackendUnavailable`] after `query_timeout`.
    pub fn with_query_timeout(pool: Arc<PgPool>, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    async fn timed<T, F>(&self, query: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        Ok(tokio::time::timeout(self.query_timeout, query).await??)
    }
}

#[async_trait]
impl MappingRepository for PgMappingRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<UrlMapping>, AppError> {
        let row = self
            .timed(
                sqlx::query_as::<_, UrlMappingRow>(
                    r#"
                    SELECT slug, original_url, created_at, visits
                    FROM url_mappings
                    WHERE slug = $1
                    "#,
                )
                .bind(slug)
                .fetch_optional(self.pool.as_ref()),
            )
            .await?;

        Ok(row.map(UrlMapping::from))
    }

    async fn insert(&self, new_mapping: NewUrlMapping) -> Result<UrlMapping, AppError> {
        let row = self
            .timed(
                sqlx::query_as::<_, UrlMappingRow>(
                    r#"
                    INSERT INTO url_mappings (slug, original_url, created_at, visits)
                    VALUES ($1, $2, $3, 0)
                    ON CONFLICT (slug) DO NOTHING
                    RETURNING slug, original_url, created_at, visits
                    "#,
                )
                .bind(&new_mapping.slug)
                .bind(&new_mapping.original_url)
                .bind(new_mapping.created_at)
                .fetch_optional(self.pool.as_ref()),
            )
            .await?;

        row.map(UrlMapping::from).ok_or_else(|| {
            AppError::conflict(
                "Slug already exists",
                json!({ "slug": new_mapping.slug }),
            )
        })
    }

    async fn increment_visits(&self, slug: &str) -> Result<Option<i64>, AppError> {
        self.timed(
            sqlx::query_scalar::<_, i64>(
                r#"
                UPDATE url_mappings
                SET visits = visits + 1
                WHERE slug = $1
                RETURNING visits
                "#,
            )
            .bind(slug)
            .fetch_optional(self.pool.as_ref()),
        )
        .await
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.timed(sqlx::query("SELECT 1").execute(self.pool.as_ref()))
            .await?;
        Ok(())
    }
}
