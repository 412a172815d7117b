mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::*;
use repo_summary::{config::AppConfig, create_app, AppState};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer};

const SUMMARY_URI: &str = "/api/repos/datastax/adelphi/summary?start=2020-12-15&end=2020-12-18";

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_json = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);
    (status, body_json)
}

fn app_for(server: &MockServer, token: Option<&str>) -> axum::Router {
    let config = AppConfig {
        github_token: token.map(str::to_string),
        github_api_base_url: Some(server.uri()),
    };
    let state = Arc::new(AppState::new(config).expect("Failed to create state"));
    create_app(state)
}

#[tokio::test]
async fn test_health_check() {
    let state = Arc::new(AppState::new(AppConfig::default()).expect("Failed to create state"));
    let app = create_app(state);

    let (status, body_json) = get_json(app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body_json["status"], "ok");
    assert_eq!(body_json["service"], "repo-summary");
}

#[tokio::test]
async fn test_get_repo_summary() {
    let server = MockServer::start().await;
    mount_adelphi(&server, &[CLOSED_PRS_QUERY]).await;

    let (status, body_json) = get_json(app_for(&server, Some(TOKEN)), SUMMARY_URI).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body_json["repository"]["id"], REPOSITORY_ID);
    assert_eq!(body_json["new_issues"].as_object().unwrap().len(), 4);
    assert_eq!(body_json["closed_issues"].as_object().unwrap().len(), 5);
    assert_eq!(
        body_json["new_issues"]["769167211"]["title"],
        "Add a README section describing the workflow config"
    );

    // Succeeded with no matches: present and empty.
    assert_eq!(body_json["new_prs"], serde_json::json!({}));
    // Failed: omitted entirely.
    assert!(body_json.get("closed_prs").is_none());
}

#[tokio::test]
async fn test_get_repo_summary_without_token_is_bad_request() {
    let server = MockServer::start().await;
    mount_adelphi(&server, &[]).await;

    let (status, _) = get_json(app_for(&server, None), SUMMARY_URI).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(server
        .received_requests()
        .await
        .unwrap_or_default()
        .is_empty());
}

#[tokio::test]
async fn test_get_repo_summary_unknown_repository() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/datastax/missing"))
        .respond_with(github_error(404, "Not Found"))
        .mount(&server)
        .await;

    let (status, _) = get_json(
        app_for(&server, Some(TOKEN)),
        "/api/repos/datastax/missing/summary?start=2020-12-15&end=2020-12-18",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_repo_summary_requires_window() {
    let server = MockServer::start().await;

    let (status, _) = get_json(
        app_for(&server, Some(TOKEN)),
        "/api/repos/datastax/adelphi/summary?start=2020-12-15",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_repo_summary_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/datastax/adelphi"))
        .respond_with(
            github_error(403, "Forbidden").insert_header("x-ratelimit-remaining", "0"),
        )
        .mount(&server)
        .await;

    let (status, _) = get_json(app_for(&server, Some(TOKEN)), SUMMARY_URI).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_get_repo_summary_passes_item_fields_through() {
    let server = MockServer::start().await;
    mount_adelphi(&server, &[]).await;

    let (status, body_json) = get_json(app_for(&server, Some(TOKEN)), SUMMARY_URI).await;

    assert_eq!(status, StatusCode::OK);
    let issue = &body_json["new_issues"]["769167211"];
    assert_eq!(issue["body"], "The workflow config keys are undocumented.");
    assert_eq!(issue["milestone"]["number"], 2);
    assert_eq!(issue["labels"][0]["color"], "0075ca");
}
