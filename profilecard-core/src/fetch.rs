//! Pagination and bounded concurrent fetching over a [`ProfileSource`].

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::domain::{LanguageBytes, RepositorySummary};
use crate::source::{FetchError, FetchResult, ProfileSource};

/// Repositories collected from the paginated listing.
#[derive(Debug, Clone, Default)]
pub struct RepositoryListing {
    /// Repositories from every page fetched before pagination stopped.
    pub repositories: Vec<RepositorySummary>,
    /// Number of page requests issued.
    pub pages_requested: u32,
    /// The failure that ended pagination early, if any.
    pub error: Option<FetchError>,
}

/// Language fetch outcome for one repository.
#[derive(Debug, Clone)]
pub struct RepositoryLanguages {
    /// The repository the languages belong to.
    pub repository: RepositorySummary,
    /// Byte map, or why it is unavailable.
    pub bytes: FetchResult<LanguageBytes>,
}

/// Walk the repository listing page by page.
///
/// Pagination continues while pages come back full; an empty or short page
/// ends it. A failing page also ends it, keeping what was already collected.
pub async fn collect_repositories<S>(source: &S, user: &str, per_page: u32) -> RepositoryListing
where
    S: ProfileSource + ?Sized,
{
    let per_page = per_page.max(1);
    let mut listing = RepositoryListing::default();
    let mut page = 1u32;

    loop {
        listing.pages_requested += 1;
        match source.list_repositories(user, page, per_page).await {
            Ok(batch) => {
                let received = batch.len();
                debug!("repository page {page}: {received} entries");
                listing.repositories.extend(batch);
                if received < per_page as usize {
                    break;
                }
                page += 1;
            }
            Err(err) => {
                warn!(
                    "repository listing stopped at page {page} ({} collected): {err}",
                    listing.repositories.len()
                );
                listing.error = Some(err);
                break;
            }
        }
    }

    listing
}

/// Fetch language maps for every repository with at most `concurrency`
/// requests in flight. Results keep the input order.
pub async fn fetch_language_maps<S>(
    source: Arc<S>,
    repositories: Vec<RepositorySummary>,
    concurrency: usize,
) -> Vec<RepositoryLanguages>
where
    S: ProfileSource + ?Sized + 'static,
{
    let concurrency = if concurrency == 0 { 1 } else { concurrency };
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut slots: Vec<Option<RepositoryLanguages>> = vec![None; repositories.len()];
    let mut tasks = JoinSet::new();

    for (index, repository) in repositories.iter().cloned().enumerate() {
        let permit = match semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(err) => {
                slots[index] = Some(RepositoryLanguages {
                    repository,
                    bytes: Err(FetchError::Transport(err.to_string())),
                });
                continue;
            }
        };
        let source = source.clone();
        tasks.spawn(async move {
            let _permit = permit;
            let bytes = source.repository_languages(&repository).await;
            (index, RepositoryLanguages { repository, bytes })
        });
    }

    while let Some(result) = tasks.join_next().await {
        match result {
            Ok((index, outcome)) => slots[index] = Some(outcome),
            Err(err) => warn!("language fetch task failed: {err}"),
        }
    }

    slots
        .into_iter()
        .zip(repositories)
        .map(|(slot, repository)| {
            slot.unwrap_or_else(|| RepositoryLanguages {
                repository,
                bytes: Err(FetchError::Transport("language fetch task aborted".to_string())),
            })
        })
        .inspect(|outcome| {
            if let Err(err) = &outcome.bytes {
                debug!("languages unavailable for {}: {err}", outcome.repository.name);
            }
        })
        .collect()
}
