#![allow(dead_code)]

use async_trait::async_trait;
use axum::ServiceExt;
use axum::extract::Request;
use axum_test::TestServer;
use serde_json::json;
use slug_shortener::domain::entities::{NewUrlMapping, UrlMapping};
use slug_shortener::domain::repositories::MappingRepository;
use slug_shortener::error::AppError;
use slug_shortener::infrastructure::persistence::InMemoryMappingRepository;
use slug_shortener::routes::{app_router, router};
use slug_shortener::state::AppState;
use std::sync::Arc;

pub const BASE_URL: &str = "https://s.example.com/url";

/// Repository whose backend is always unreachable.
pub struct UnavailableRepository;

#[async_trait]
impl MappingRepository for UnavailableRepository {
    async fn find_by_slug(&self, _slug: &str) -> Result<Option<UrlMapping>, AppError> {
        Err(unavailable())
    }

    async fn insert(&self, _new_mapping: NewUrlMapping) -> Result<UrlMapping, AppError> {
        Err(unavailable())
    }

    async fn increment_visits(&self, _slug: &str) -> Result<Option<i64>, AppError> {
        Err(unavailable())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(unavailable())
    }
}

fn unavailable() -> AppError {
    AppError::backend_unavailable("Storage backend unavailable", json!({ "reason": "timeout" }))
}

pub fn create_test_state() -> (AppState, Arc<InMemoryMappingRepository>) {
    let repository = Arc::new(InMemoryMappingRepository::new());
    let state = AppState::new(repository.clone(), BASE_URL);

    (state, repository)
}

pub fn create_test_server() -> (TestServer, Arc<InMemoryMappingRepository>) {
    let (state, repository) = create_test_state();
    let server = TestServer::new(router(state)).unwrap();

    (server, repository)
}

/// Server wrapped in trailing-slash normalization, as `server::run` serves it.
pub fn create_normalized_server() -> (TestServer, Arc<InMemoryMappingRepository>) {
    let (state, repository) = create_test_state();
    let app = ServiceExt::<Request>::into_make_service(app_router(state));
    let server = TestServer::new(app).unwrap();

    (server, repository)
}

pub fn create_unavailable_server() -> TestServer {
    let state = AppState::new(Arc::new(UnavailableRepository), BASE_URL);
    TestServer::new(router(state)).unwrap()
}

pub async fn create_test_mapping(repository: &InMemoryMappingRepository, slug: &str, url: &str) {
    repository
        .insert(NewUrlMapping::new(slug.to_string(), url.to_string()))
        .await
        .unwrap();
}
