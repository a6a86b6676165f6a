//! GitHub REST client backing the profile pipeline.

use crate::CliResult;
use profilecard_core::{
    FetchError, FetchFuture, FetchResult, LanguageBytes, ProfileSource, PullRequestSearch,
    RepositorySummary, owner_from_repository_url,
};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default GitHub API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";
const ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = "profilecard";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SEARCH_PAGE_SIZE: u32 = 100;
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Deserialize)]
struct RepositoryPayload {
    name: String,
    owner: OwnerPayload,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    open_issues_count: u64,
    #[serde(default)]
    fork: bool,
    languages_url: String,
}

#[derive(Debug, Deserialize)]
struct OwnerPayload {
    login: String,
}

impl From<RepositoryPayload> for RepositorySummary {
    fn from(payload: RepositoryPayload) -> Self {
        Self {
            name: payload.name,
            owner: payload.owner.login,
            stars: payload.stargazers_count,
            open_issues: payload.open_issues_count,
            fork: payload.fork,
            languages_url: payload.languages_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IssueSearchPayload {
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    items: Vec<IssueItem>,
}

#[derive(Debug, Deserialize)]
struct IssueItem {
    #[serde(default)]
    repository_url: String,
}

#[derive(Debug, Deserialize)]
struct CommitSearchPayload {
    #[serde(default)]
    total_count: u64,
}

/// Reqwest-backed GitHub API client.
#[derive(Debug, Clone)]
pub struct ReqwestGitHubClient {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl ReqwestGitHubClient {
    /// Build a client for `base_url`, authenticating when a token is given.
    pub fn new(base_url: &str, token: Option<String>) -> CliResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err("api url is required".into());
        }
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.to_string(),
            token: token.filter(|token| !token.trim().is_empty()),
            client,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> FetchResult<T> {
        let mut request = self.client.get(url).header("Accept", ACCEPT).query(query);
        if let Some(token) = self.token.as_ref() {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                code: status.as_u16(),
                body: truncate(body),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|err| FetchError::Decode(err.to_string()))
    }

    async fn list_repositories_page(
        &self,
        user: &str,
        page: u32,
        per_page: u32,
    ) -> FetchResult<Vec<RepositorySummary>> {
        let url = format!("{}/users/{user}/repos", self.base_url);
        let query = [("per_page", per_page.to_string()), ("page", page.to_string())];
        let payload: Vec<RepositoryPayload> = self.get_json(&url, &query).await?;
        Ok(payload.into_iter().map(RepositorySummary::from).collect())
    }

    async fn search_pull_requests_for(&self, user: &str) -> FetchResult<PullRequestSearch> {
        let url = format!("{}/search/issues", self.base_url);
        let query = [
            ("q", format!("author:{user} type:pr")),
            ("per_page", SEARCH_PAGE_SIZE.to_string()),
        ];
        let payload: IssueSearchPayload = self.get_json(&url, &query).await?;
        let repository_owners = payload
            .items
            .iter()
            .filter_map(|item| owner_from_repository_url(&item.repository_url))
            .map(str::to_string)
            .collect();
        Ok(PullRequestSearch {
            total_count: payload.total_count,
            repository_owners,
        })
    }

    async fn search_commits_for(&self, user: &str) -> FetchResult<u64> {
        let url = format!("{}/search/commits", self.base_url);
        let query = [("q", format!("author:{user}"))];
        let payload: CommitSearchPayload = self.get_json(&url, &query).await?;
        Ok(payload.total_count)
    }
}

impl ProfileSource for ReqwestGitHubClient {
    fn list_repositories<'a>(
        &'a self,
        user: &'a str,
        page: u32,
        per_page: u32,
    ) -> FetchFuture<'a, Vec<RepositorySummary>> {
        Box::pin(self.list_repositories_page(user, page, per_page))
    }

    fn repository_languages<'a>(
        &'a self,
        repository: &'a RepositorySummary,
    ) -> FetchFuture<'a, LanguageBytes> {
        Box::pin(self.get_json::<LanguageBytes>(&repository.languages_url, &[]))
    }

    fn search_pull_requests<'a>(&'a self, user: &'a str) -> FetchFuture<'a, PullRequestSearch> {
        Box::pin(self.search_pull_requests_for(user))
    }

    fn search_commits<'a>(&'a self, user: &'a str) -> FetchFuture<'a, u64> {
        Box::pin(self.search_commits_for(user))
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}
