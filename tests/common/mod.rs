//! Shared wiremock setup standing in for the GitHub API.
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const OWNER: &str = "datastax";
pub const REPO: &str = "adelphi";
pub const REPOSITORY_ID: u64 = 280185818;
pub const TOKEN: &str = "test-token";

pub const NEW_ISSUES_QUERY: &str = "repo:datastax/adelphi is:issue created:2020-12-15..2020-12-18";
pub const UPDATED_ISSUES_QUERY: &str = "repo:datastax/adelphi is:issue updated:2020-12-15..2020-12-18";
pub const CLOSED_ISSUES_QUERY: &str = "repo:datastax/adelphi is:issue closed:2020-12-15..2020-12-18";
pub const NEW_PRS_QUERY: &str = "repo:datastax/adelphi is:pull-request created:2020-12-15..2020-12-18";
pub const UPDATED_PRS_QUERY: &str =
    "repo:datastax/adelphi is:pull-request updated:2020-12-15..2020-12-18";
pub const CLOSED_PRS_QUERY: &str =
    "repo:datastax/adelphi is:pull-request closed:2020-12-15..2020-12-18";

/// Search query paired with the fixture GitHub answers it with.
const SEARCHES: [(&str, &str); 6] = [
    (NEW_ISSUES_QUERY, "new_issues.json"),
    (UPDATED_ISSUES_QUERY, "empty_search.json"),
    (CLOSED_ISSUES_QUERY, "closed_issues.json"),
    (NEW_PRS_QUERY, "empty_search.json"),
    (UPDATED_PRS_QUERY, "updated_pull_requests.json"),
    (CLOSED_PRS_QUERY, "empty_search.json"),
];

pub fn window() -> (DateTime<Utc>, DateTime<Utc>) {
    (
        Utc.with_ymd_and_hms(2020, 12, 15, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2020, 12, 18, 0, 0, 0).unwrap(),
    )
}

pub fn fixture(name: &str) -> serde_json::Value {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    let raw = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e));
    serde_json::from_str(&raw).unwrap()
}

pub fn github_error(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(serde_json::json!({
        "message": message,
        "documentation_url": "https://docs.github.com/rest"
    }))
}

pub async fn mount_repository(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/repos/datastax/adelphi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture("repository.json")))
        .mount(server)
        .await;
}

pub async fn mount_search(server: &MockServer, query: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param("q", query))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Mounts the repository and all six searches. Queries listed in `failing`
/// answer with a 422 instead of their fixture.
pub async fn mount_adelphi(server: &MockServer, failing: &[&str]) {
    mount_repository(server).await;
    for (query, fixture_name) in SEARCHES {
        let response = if failing.contains(&query) {
            github_error(422, "Validation Failed")
        } else {
            ResponseTemplate::new(200).set_body_json(fixture(fixture_name))
        };
        mount_search(server, query, response).await;
    }
}
