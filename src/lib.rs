pub mod config;
pub mod error;
pub mod fetcher;
pub mod github;
pub mod summary;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use config::{AppConfig, RepoId};
use error::SummaryError;
use github::OctocrabGitHub;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use summary::{RepositorySummary, SummaryGenerator};
use tower_http::trace::TraceLayer;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// Shared application state accessible to all request handlers.
pub struct AppState {
    /// Builds repository summaries against GitHub.
    pub generator: SummaryGenerator,
    /// Application configuration loaded from environment variables.
    pub config: AppConfig,
}

impl AppState {
    /// Initializes the application state with an Octocrab-backed generator.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let github = OctocrabGitHub::new(config.github_api_base_url.as_deref())?;
        Ok(Self {
            generator: SummaryGenerator::new(Arc::new(github)),
            config,
        })
    }
}

/// Date window for a summary request. `end` is exclusive.
#[derive(Debug, Deserialize)]
pub struct SummaryWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/repos/{owner}/{repo}/summary", get(get_repo_summary))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "repo-summary",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn get_repo_summary(
    Path(repo_id): Path<RepoId>,
    Query(window): Query<SummaryWindow>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<RepositorySummary>, (StatusCode, String)> {
    let token = state.config.github_token.as_deref().unwrap_or_default();
    let start = window.start.and_time(NaiveTime::MIN).and_utc();
    let end = window.end.and_time(NaiveTime::MIN).and_utc();

    match state
        .generator
        .generate_summary(token, &repo_id.owner, &repo_id.repo, start, end)
        .await
    {
        Ok(summary) => {
            tracing::debug!(repo_id = %repo_id, "Returning summary");
            Ok(Json(summary))
        }
        Err(e) => {
            tracing::error!("Failed to summarize {}: {}", repo_id, e);
            Err(error_response(&e))
        }
    }
}

fn error_response(error: &SummaryError) -> (StatusCode, String) {
    match error {
        SummaryError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, error.to_string()),
        SummaryError::RemoteError {
            status: StatusCode::NOT_FOUND,
            ..
        } => (StatusCode::NOT_FOUND, "Repository Not Found".to_string()),
        SummaryError::RemoteError { .. } if error.is_rate_limited() => (
            StatusCode::TOO_MANY_REQUESTS,
            "GitHub Rate Limit Exceeded".to_string(),
        ),
        SummaryError::RemoteError { .. } | SummaryError::TransportFailure { .. } => (
            StatusCode::BAD_GATEWAY,
            "GitHub Request Failed".to_string(),
        ),
    }
}
