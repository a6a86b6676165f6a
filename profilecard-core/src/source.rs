//! Remote data source abstraction.

use std::error::Error;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::domain::{LanguageBytes, PullRequestSearch, RepositorySummary};

/// Why a remote fetch produced no data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, TLS, or timeout failure.
    Transport(String),
    /// The server answered with a non-success status.
    Status {
        /// HTTP status code.
        code: u16,
        /// Response body, possibly truncated.
        body: String,
    },
    /// The response body could not be decoded.
    Decode(String),
}

impl FetchError {
    /// Whether the failure looks like API throttling.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::Status { code: 403 | 429, .. })
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(message) => write!(f, "request failed: {message}"),
            FetchError::Status { code, body } => write!(f, "api error ({code}): {body}"),
            FetchError::Decode(message) => write!(f, "response decode failed: {message}"),
        }
    }
}

impl Error for FetchError {}

/// Result of a single remote call.
pub type FetchResult<T> = Result<T, FetchError>;

/// Boxed future returned by [`ProfileSource`] methods.
pub type FetchFuture<'a, T> = Pin<Box<dyn Future<Output = FetchResult<T>> + Send + 'a>>;

/// Read-only access to a source-hosting API.
pub trait ProfileSource: Send + Sync {
    /// Fetch one page of the user's repositories (pages start at 1).
    fn list_repositories<'a>(
        &'a self,
        user: &'a str,
        page: u32,
        per_page: u32,
    ) -> FetchFuture<'a, Vec<RepositorySummary>>;

    /// Fetch the language byte map of a repository.
    fn repository_languages<'a>(
        &'a self,
        repository: &'a RepositorySummary,
    ) -> FetchFuture<'a, LanguageBytes>;

    /// Search pull requests authored by the user.
    fn search_pull_requests<'a>(&'a self, user: &'a str) -> FetchFuture<'a, PullRequestSearch>;

    /// Count commits authored by the user, as reported by commit search.
    fn search_commits<'a>(&'a self, user: &'a str) -> FetchFuture<'a, u64>;
}

/// Extract the owner login from an API repository URL
/// (`https://api.github.com/repos/<owner>/<name>`).
pub fn owner_from_repository_url(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("/repos/")?;
    let (owner, name) = rest.split_once('/')?;
    if owner.is_empty() || name.is_empty() {
        return None;
    }
    Some(owner)
}
