//! The GitHub collaborator: repository lookup and issue search.
//!
//! `GitHubApi` is the seam between the summary logic and the network. The
//! Octocrab implementation maps GitHub's responses onto `SummaryError`, and
//! tests substitute either a mock or a local HTTP server.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http::Uri;
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::SummaryError;

pub use octocrab::models::Repository;

const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// An issue or pull request as returned by the search endpoint.
///
/// GitHub represents both kinds with the same shape; only `id` is read by the
/// summary logic, the remaining fields are passed through to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ItemUser>,
    #[serde(default)]
    pub labels: Vec<ItemLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    /// Present only on pull requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
    /// Every other field GitHub sent, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemUser {
    pub login: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemLabel {
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Remote operations the summary generator depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Looks up repository metadata for `owner/repo`.
    async fn resolve_repository(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
    ) -> Result<Repository, SummaryError>;

    /// Runs a single issue search and returns the first page of matches in
    /// result order. `None` entries stand for items GitHub returned as null.
    async fn search_items(&self, token: &str, query: &str)
        -> Result<Vec<Option<Item>>, SummaryError>;
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    items: Vec<Option<Item>>,
}

/// Octocrab-backed `GitHubApi`.
#[derive(Clone, Debug, Default)]
pub struct OctocrabGitHub {
    base_uri: Option<Uri>,
}

impl OctocrabGitHub {
    /// Creates a client for api.github.com, or for `api_base` when given
    /// (GitHub Enterprise or a local test server).
    pub fn new(api_base: Option<&str>) -> anyhow::Result<Self> {
        let base_uri = api_base.map(str::parse::<Uri>).transpose()?;
        Ok(Self { base_uri })
    }

    fn client(&self, token: &str) -> Result<Octocrab, SummaryError> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if let Some(base_uri) = &self.base_uri {
            builder = builder
                .base_uri(base_uri.clone())
                .map_err(|e| transport_failure("build client", e))?;
        }
        builder
            .build()
            .map_err(|e| transport_failure("build client", e))
    }

    /// GETs `route` and decodes a 2xx body as JSON.
    ///
    /// The status is checked on the raw response, so an error page that is
    /// not JSON still comes back as `RemoteError` with its status.
    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        operation: &'static str,
        route: String,
    ) -> Result<T, SummaryError> {
        let client = self.client(token)?;
        let response = client
            ._get(route)
            .await
            .map_err(|e| transport_failure(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            let rate_limit_remaining = response
                .headers()
                .get(RATE_LIMIT_REMAINING)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse().ok());
            let body = client
                .body_to_string(response)
                .await
                .unwrap_or_else(|_| String::new());

            return Err(SummaryError::RemoteError {
                operation,
                status,
                message: extract_github_message(&body).unwrap_or_else(|| {
                    status.canonical_reason().unwrap_or("unknown error").to_string()
                }),
                rate_limit_remaining,
            });
        }

        let body = client
            .body_to_string(response)
            .await
            .map_err(|e| transport_failure(operation, e))?;
        serde_json::from_str(&body).map_err(|e| transport_failure(operation, e))
    }
}

#[async_trait]
impl GitHubApi for OctocrabGitHub {
    async fn resolve_repository(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
    ) -> Result<Repository, SummaryError> {
        self.get_json(token, "get repository", format!("/repos/{owner}/{repo}"))
            .await
    }

    async fn search_items(
        &self,
        token: &str,
        query: &str,
    ) -> Result<Vec<Option<Item>>, SummaryError> {
        let params = form_urlencoded::Serializer::new(String::new())
            .append_pair("q", query)
            .finish();
        let results: SearchResults = self
            .get_json(token, "search issues", format!("/search/issues?{params}"))
            .await?;

        Ok(results.items)
    }
}

fn transport_failure<E>(operation: &'static str, error: E) -> SummaryError
where
    E: std::error::Error + Send + Sync + 'static,
{
    SummaryError::TransportFailure {
        operation,
        source: Box::new(error),
    }
}

/// Pulls GitHub's `message` out of an error body, if the body is JSON.
fn extract_github_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}
