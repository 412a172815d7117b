//! Assembles a repository activity summary.
//!
//! `SummaryGenerator` is the entry point for building summaries. It:
//! 1. Validates the credential and repository coordinates.
//! 2. Resolves the repository metadata, failing the whole call if that fails.
//! 3. Fetches the six issue/pull request categories concurrently.
//! 4. Keeps every category that succeeded; failed categories stay absent.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{validate_coordinates, SummaryError};
use crate::fetcher::{self, Category, DateContext, ItemKind, ItemMap};
use crate::github::{GitHubApi, Repository};

/// Maps a category to its summary field, borrowed through the given receiver
/// tokens (`&self` or `&mut self`).
macro_rules! category_field {
    ($category:expr, $($receiver:tt)+) => {
        match ($category.kind, $category.context) {
            (ItemKind::Issue, DateContext::Created) => $($receiver)+.new_issues,
            (ItemKind::Issue, DateContext::Updated) => $($receiver)+.updated_issues,
            (ItemKind::Issue, DateContext::Closed) => $($receiver)+.closed_issues,
            (ItemKind::PullRequest, DateContext::Created) => $($receiver)+.new_pull_requests,
            (ItemKind::PullRequest, DateContext::Updated) => $($receiver)+.updated_pull_requests,
            (ItemKind::PullRequest, DateContext::Closed) => $($receiver)+.closed_pull_requests,
        }
    };
}

/// Repository metadata plus the items active in a date window.
///
/// A `None` category means its search failed. An empty map means the search
/// succeeded and matched nothing. Absent categories are omitted from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub repository: Repository,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_issues: Option<ItemMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_issues: Option<ItemMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_issues: Option<ItemMap>,
    #[serde(default, rename = "new_prs", skip_serializing_if = "Option::is_none")]
    pub new_pull_requests: Option<ItemMap>,
    #[serde(default, rename = "updated_prs", skip_serializing_if = "Option::is_none")]
    pub updated_pull_requests: Option<ItemMap>,
    #[serde(default, rename = "closed_prs", skip_serializing_if = "Option::is_none")]
    pub closed_pull_requests: Option<ItemMap>,
}

impl RepositorySummary {
    pub fn new(repository: Repository) -> Self {
        Self {
            repository,
            new_issues: None,
            updated_issues: None,
            closed_issues: None,
            new_pull_requests: None,
            updated_pull_requests: None,
            closed_pull_requests: None,
        }
    }

    /// Returns the items for a category, or `None` if its fetch failed.
    pub fn category(&self, category: Category) -> Option<&ItemMap> {
        category_field!(category, &self).as_ref()
    }

    fn category_mut(&mut self, category: Category) -> &mut Option<ItemMap> {
        category_field!(category, &mut self)
    }
}

#[derive(Clone)]
pub struct SummaryGenerator {
    api: Arc<dyn GitHubApi>,
}

impl SummaryGenerator {
    pub fn new(api: Arc<dyn GitHubApi>) -> Self {
        Self { api }
    }

    /// Builds the summary for `owner/repo` over `[start_inc, end_exc)`.
    ///
    /// Fails only on blank inputs or when the repository cannot be resolved.
    /// A category whose search fails is left as `None` and does not affect the
    /// others or the returned `Result`.
    pub async fn generate_summary(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        start_inc: DateTime<Utc>,
        end_exc: DateTime<Utc>,
    ) -> Result<RepositorySummary, SummaryError> {
        validate_coordinates(token, owner, repo)?;

        let repository = self.api.resolve_repository(token, owner, repo).await?;
        let mut summary = RepositorySummary::new(repository);

        let fetches = Category::ALL.map(|category| async move {
            let result = fetcher::fetch_category(
                self.api.as_ref(),
                token,
                owner,
                repo,
                category,
                start_inc,
                end_exc,
            )
            .await;
            (category, result)
        });

        for (category, result) in join_all(fetches).await {
            match result {
                Ok(items) => *summary.category_mut(category) = Some(items),
                Err(e) => {
                    tracing::warn!(owner, repo, %category, "Category fetch failed, leaving it out: {}", e);
                }
            }
        }

        Ok(summary)
    }
}
