//! In-memory sources shared by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::{LanguageBytes, PullRequestSearch, RepositorySummary};
use crate::source::{FetchError, FetchFuture, FetchResult, ProfileSource};

pub(crate) fn repo(name: &str, owner: &str) -> RepositorySummary {
    RepositorySummary {
        name: name.to_string(),
        owner: owner.to_string(),
        stars: 0,
        open_issues: 0,
        fork: false,
        languages_url: format!("https://api.example.test/repos/{owner}/{name}/languages"),
    }
}

pub(crate) fn bytes(entries: &[(&str, u64)]) -> LanguageBytes {
    entries
        .iter()
        .map(|(name, count)| (name.to_string(), *count))
        .collect()
}

/// Scripted source: pages, language maps and searches are fixed up front.
pub(crate) struct FakeSource {
    pages: Vec<FetchResult<Vec<RepositorySummary>>>,
    languages: HashMap<String, FetchResult<LanguageBytes>>,
    pull_requests: FetchResult<PullRequestSearch>,
    commits: FetchResult<u64>,
    pub(crate) requested_pages: Mutex<Vec<u32>>,
    pub(crate) language_calls: AtomicUsize,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self {
            pages: Vec::new(),
            languages: HashMap::new(),
            pull_requests: Ok(PullRequestSearch::default()),
            commits: Ok(0),
            requested_pages: Mutex::new(Vec::new()),
            language_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_page(mut self, page: FetchResult<Vec<RepositorySummary>>) -> Self {
        self.pages.push(page);
        self
    }

    pub(crate) fn with_languages(mut self, name: &str, result: FetchResult<LanguageBytes>) -> Self {
        self.languages.insert(name.to_string(), result);
        self
    }

    pub(crate) fn with_pull_requests(mut self, result: FetchResult<PullRequestSearch>) -> Self {
        self.pull_requests = result;
        self
    }

    pub(crate) fn with_commits(mut self, result: FetchResult<u64>) -> Self {
        self.commits = result;
        self
    }

    pub(crate) fn pages_requested(&self) -> Vec<u32> {
        self.requested_pages.lock().expect("pages lock").clone()
    }
}

impl ProfileSource for FakeSource {
    fn list_repositories<'a>(
        &'a self,
        _user: &'a str,
        page: u32,
        _per_page: u32,
    ) -> FetchFuture<'a, Vec<RepositorySummary>> {
        self.requested_pages.lock().expect("pages lock").push(page);
        let result = self
            .pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()));
        Box::pin(async move { result })
    }

    fn repository_languages<'a>(
        &'a self,
        repository: &'a RepositorySummary,
    ) -> FetchFuture<'a, LanguageBytes> {
        self.language_calls.fetch_add(1, Ordering::SeqCst);
        let result = self
            .languages
            .get(&repository.name)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Status {
                code: 404,
                body: "Not Found".to_string(),
            }));
        Box::pin(async move { result })
    }

    fn search_pull_requests<'a>(&'a self, _user: &'a str) -> FetchFuture<'a, PullRequestSearch> {
        let result = self.pull_requests.clone();
        Box::pin(async move { result })
    }

    fn search_commits<'a>(&'a self, _user: &'a str) -> FetchFuture<'a, u64> {
        let result = self.commits.clone();
        Box::pin(async move { result })
    }
}

/// Source whose every call fails with a transport error.
pub(crate) struct FailingSource;

impl FailingSource {
    fn error() -> FetchError {
        FetchError::Transport("connection refused".to_string())
    }
}

impl ProfileSource for FailingSource {
    fn list_repositories<'a>(
        &'a self,
        _user: &'a str,
        _page: u32,
        _per_page: u32,
    ) -> FetchFuture<'a, Vec<RepositorySummary>> {
        Box::pin(async { Err(FailingSource::error()) })
    }

    fn repository_languages<'a>(
        &'a self,
        _repository: &'a RepositorySummary,
    ) -> FetchFuture<'a, LanguageBytes> {
        Box::pin(async { Err(FailingSource::error()) })
    }

    fn search_pull_requests<'a>(&'a self, _user: &'a str) -> FetchFuture<'a, PullRequestSearch> {
        Box::pin(async { Err(FailingSource::error()) })
    }

    fn search_commits<'a>(&'a self, _user: &'a str) -> FetchFuture<'a, u64> {
        Box::pin(async { Err(FailingSource::error()) })
    }
}
