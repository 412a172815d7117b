//! Application configuration and environment variable parsing.
//!
//! Settings are read from the environment (optionally seeded from a .env
//! file). The GitHub token lives here rather than being picked up ad hoc, so
//! the summary generator only ever sees explicit values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for a GitHub repository.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    /// The owner of the repository (e.g., "datastax").
    pub owner: String,
    /// The name of the repository (e.g., "adelphi").
    pub repo: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
    /// GitHub Personal Access Token used for every summary request.
    pub github_token: Option<String>,

    /// Alternate GitHub API base URL, e.g. a GitHub Enterprise instance.
    /// Defaults to api.github.com when unset.
    pub github_api_base_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}
