#![allow(dead_code)]

use axum_test::TestServer;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use link_shortener::application::services::ShortenerService;
use link_shortener::domain::entities::{Link, NewLink};
use link_shortener::domain::repositories::LinkRepository;
use link_shortener::infrastructure::persistence::MemoryLinkRepository;
use link_shortener::state::AppState;
use link_shortener::utils::code_generator::CodeGenerator;

pub const BASE_URL: &str = "http://localhost:5000";

pub fn create_test_state() -> (AppState, Arc<MemoryLinkRepository>) {
    create_state_with(false)
}

pub fn create_permanent_state() -> (AppState, Arc<MemoryLinkRepository>) {
    create_state_with(true)
}

fn create_state_with(permanent_redirects: bool) -> (AppState, Arc<MemoryLinkRepository>) {
    let repo = Arc::new(MemoryLinkRepository::new());
    let dyn_repo: Arc<dyn LinkRepository> = repo.clone();

    let shortener = ShortenerService::new(dyn_repo, CodeGenerator::default(), BASE_URL);

    (
        AppState::new(Arc::new(shortener), permanent_redirects),
        repo,
    )
}

pub fn create_server(state: AppState) -> TestServer {
    let app = link_shortener::routes::routes().with_state(state);
    TestServer::new(app).unwrap()
}

pub async fn create_test_link(
    repo: &MemoryLinkRepository,
    code: &str,
    url: &str,
    expires_at: Option<DateTime<Utc>>,
) -> Link {
    repo.insert(NewLink {
        short_code: code.to_string(),
        original_url: url.to_string(),
        expires_at,
    })
    .await
    .unwrap()
}

pub async fn create_expired_link(repo: &MemoryLinkRepository, code: &str, url: &str) -> Link {
    create_test_link(repo, code, url, Some(Utc::now() - Duration::hours(1))).await
}
