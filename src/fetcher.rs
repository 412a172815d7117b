//! Builds and runs the per-category issue searches.
//!
//! Each category is one (item kind, date context) pair. A search is scoped to
//! one repository, one kind and one timestamp field, executed once, and
//! reduced into a map keyed by item id.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{validate_coordinates, SummaryError};
use crate::github::{GitHubApi, Item};

/// Items keyed by their GitHub id.
pub type ItemMap = BTreeMap<u64, Item>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Issue,
    PullRequest,
}

impl ItemKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ItemKind::Issue => "issue",
            ItemKind::PullRequest => "pull-request",
        }
    }
}

/// Which timestamp field the date window filters on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DateContext {
    Created,
    Updated,
    Closed,
}

impl DateContext {
    pub fn keyword(self) -> &'static str {
        match self {
            DateContext::Created => "created",
            DateContext::Updated => "updated",
            DateContext::Closed => "closed",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Category {
    pub kind: ItemKind,
    pub context: DateContext,
}

impl Category {
    /// The six categories fetched for every summary.
    pub const ALL: [Category; 6] = [
        Category::new(ItemKind::Issue, DateContext::Created),
        Category::new(ItemKind::Issue, DateContext::Updated),
        Category::new(ItemKind::Issue, DateContext::Closed),
        Category::new(ItemKind::PullRequest, DateContext::Created),
        Category::new(ItemKind::PullRequest, DateContext::Updated),
        Category::new(ItemKind::PullRequest, DateContext::Closed),
    ];

    pub const fn new(kind: ItemKind, context: DateContext) -> Self {
        Self { kind, context }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.context.keyword(), self.kind.keyword())
    }
}

/// Builds the search query for one category.
///
/// Both bounds are truncated to the calendar day. GitHub's `a..b` range is
/// inclusive on both ends, so callers wanting `[start, end)` pass an `end_exc`
/// one day past the last day they care about.
pub fn build_query(
    owner: &str,
    repo: &str,
    category: Category,
    start_inc: DateTime<Utc>,
    end_exc: DateTime<Utc>,
) -> String {
    format!(
        "repo:{}/{} is:{} {}:{}..{}",
        owner,
        repo,
        category.kind.keyword(),
        category.context.keyword(),
        start_inc.format("%Y-%m-%d"),
        end_exc.format("%Y-%m-%d"),
    )
}

/// Keys items by id. Null entries and items without an id are dropped; a
/// repeated id keeps the last occurrence.
pub fn reduce_items<I>(items: I) -> ItemMap
where
    I: IntoIterator<Item = Option<Item>>,
{
    items
        .into_iter()
        .flatten()
        .filter_map(|item| item.id.map(|id| (id, item)))
        .collect()
}

/// Fetches one category of items for `owner/repo` within the date window.
pub async fn fetch_category(
    api: &dyn GitHubApi,
    token: &str,
    owner: &str,
    repo: &str,
    category: Category,
    start_inc: DateTime<Utc>,
    end_exc: DateTime<Utc>,
) -> Result<ItemMap, SummaryError> {
    validate_coordinates(token, owner, repo)?;

    let query = build_query(owner, repo, category, start_inc, end_exc);
    tracing::debug!(%query, "Searching issues");

    let items = api.search_items(token, &query).await?;
    Ok(reduce_items(items))
}
