mod common;

use axum::http::{StatusCode, header};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use link_shortener::domain::repositories::LinkRepository;

#[tokio::test]
async fn test_redirect_found() {
    let (state, repo) = common::create_test_state();
    common::create_test_link(&repo, "abc123", "https://example.com/page", None).await;
    let server = common::create_server(state);

    let response = server.get("/r/abc123").await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(
        response.header(header::LOCATION),
        "https://example.com/page"
    );
}

#[tokio::test]
async fn test_redirect_never_succeeds_without_location() {
    let (state, repo) = common::create_test_state();
    common::create_test_link(&repo, "broken", "https://example.com/a\nb", None).await;
    let server = common::create_server(state);

    let response = server.get("/r/broken").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get(header::LOCATION).is_none());

    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "internal_error");
}

#[tokio::test]
async fn test_redirect_permanent_when_configured() {
    let (state, repo) = common::create_permanent_state();
    common::create_test_link(&repo, "perm", "https://example.com", None).await;
    let server = common::create_server(state);

    let response = server.get("/r/perm").await;

    response.assert_status(StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.header(header::LOCATION), "https://example.com");
}

#[tokio::test]
async fn test_redirect_not_found() {
    let (state, _repo) = common::create_test_state();
    let server = common::create_server(state);

    let response = server.get("/r/missing").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_redirect_is_case_sensitive() {
    let (state, repo) = common::create_test_state();
    common::create_test_link(&repo, "AbC", "https://example.com", None).await;
    let server = common::create_server(state);

    server
        .get("/r/abc")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_redirect_expired_is_gone_without_click() {
    let (state, repo) = common::create_test_state();
    common::create_expired_link(&repo, "old", "https://example.com").await;
    let server = common::create_server(state);

    let response = server.get("/r/old").await;

    response.assert_status(StatusCode::GONE);
    assert_eq!(response.json::<Value>()["error"]["code"], "gone");

    let stored = repo.find_by_code("old").await.unwrap().unwrap();
    assert_eq!(stored.click_count, 0);
}

#[tokio::test]
async fn test_redirect_before_expiry_counts() {
    let (state, repo) = common::create_test_state();
    common::create_test_link(
        &repo,
        "soon",
        "https://example.com",
        Some(Utc::now() + Duration::hours(1)),
    )
    .await;
    let server = common::create_server(state);

    server
        .get("/r/soon")
        .await
        .assert_status(StatusCode::FOUND);

    let stored = repo.find_by_code("soon").await.unwrap().unwrap();
    assert_eq!(stored.click_count, 1);
}

#[tokio::test]
async fn test_each_redirect_increments_by_one() {
    let (state, repo) = common::create_test_state();
    common::create_test_link(&repo, "count", "https://example.com", None).await;
    let server = common::create_server(state);

    for expected in 1..=5 {
        server
            .get("/r/count")
            .await
            .assert_status(StatusCode::FOUND);

        let stored = repo.find_by_code("count").await.unwrap().unwrap();
        assert_eq!(stored.click_count, expected);
    }
}

#[tokio::test]
async fn test_create_redirect_and_stats_flow() {
    let (state, _repo) = common::create_test_state();
    let server = common::create_server(state);

    server
        .post("/api/links")
        .json(&json!({ "url": "https://example.com", "custom_code": "abc123" }))
        .await
        .assert_status(StatusCode::CREATED);

    let stats = server.get("/api/links/abc123").await.json::<Value>();
    assert_eq!(stats["click_count"], 0);

    for _ in 0..3 {
        let response = server.get("/r/abc123").await;
        response.assert_status(StatusCode::FOUND);
        assert_eq!(response.header(header::LOCATION), "https://example.com");
    }

    let stats = server.get("/api/links/abc123").await.json::<Value>();
    assert_eq!(stats["click_count"], 3);
}
