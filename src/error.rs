//! Error types surfaced while building a repository summary.

use http::StatusCode;
use thiserror::Error;

/// Errors returned by the fetcher, the summary generator and the GitHub collaborator.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// A credential or repository coordinate was empty.
    #[error("{field} provided is invalid")]
    InvalidInput {
        /// Name of the rejected input (`token`, `owner` or `repo`).
        field: &'static str,
    },

    /// GitHub answered, but with a non-success status.
    #[error("failed response status code received from GitHub API: {status} ({operation}: {message})")]
    RemoteError {
        /// The call that failed, e.g. `search issues`.
        operation: &'static str,
        /// HTTP status returned by GitHub.
        status: StatusCode,
        /// GitHub's `message`, or the status reason when the body is not JSON.
        message: String,
        /// Value of the `x-ratelimit-remaining` header, when GitHub sent one.
        rate_limit_remaining: Option<u64>,
    },

    /// The call to GitHub could not complete.
    #[error("{operation} failed: {source}")]
    TransportFailure {
        /// The call that failed.
        operation: &'static str,
        /// The underlying client error, unchanged.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl SummaryError {
    /// Returns the remote status code for `RemoteError`, if any.
    pub fn remote_status(&self) -> Option<StatusCode> {
        match self {
            SummaryError::RemoteError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when GitHub refused the call because the rate limit is spent:
    /// a 429, or a 403 reporting zero remaining requests.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            SummaryError::RemoteError {
                status,
                rate_limit_remaining,
                ..
            } => {
                *status == StatusCode::TOO_MANY_REQUESTS
                    || (*status == StatusCode::FORBIDDEN && *rate_limit_remaining == Some(0))
            }
            _ => false,
        }
    }
}

/// Rejects empty or whitespace-only inputs before any network call is made.
pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), SummaryError> {
    if value.trim().is_empty() {
        return Err(SummaryError::InvalidInput { field });
    }
    Ok(())
}

/// Validates the credential and repository coordinates shared by every entry point.
pub(crate) fn validate_coordinates(token: &str, owner: &str, repo: &str) -> Result<(), SummaryError> {
    require_non_empty("token", token)?;
    require_non_empty("owner", owner)?;
    require_non_empty("repo", repo)
}
