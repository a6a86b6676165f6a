//! End-to-end profile run: fetch, aggregate, resolve.

use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};

use crate::config::PipelineConfig;
use crate::domain::{
    GradeResult, LanguageDistribution, MetricSnapshot, RepositorySummary, VisibleLanguage,
};
use crate::error::{ProfileError, Result};
use crate::fetch::{collect_repositories, fetch_language_maps};
use crate::fs::FileSystem;
use crate::languages::aggregate_languages;
use crate::metrics::{count_contributions, reconcile_commits, sum_open_issues, sum_stars};
use crate::normalizer::visible_languages;
use crate::resilience::{Resolved, SnapshotStore, resolve_languages, resolve_stats};
use crate::source::ProfileSource;

/// Live aggregates; each side fails independently.
#[derive(Debug)]
pub struct LiveProfile {
    /// Aggregated metrics.
    pub stats: Result<MetricSnapshot>,
    /// Language accumulator before normalization.
    pub languages: Result<LanguageDistribution>,
}

/// Data chosen for rendering, with its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRun {
    /// Stats snapshot to render.
    pub stats: Resolved<MetricSnapshot>,
    /// Language accumulator to normalize and render.
    pub languages: Resolved<LanguageDistribution>,
}

impl ProfileRun {
    /// Grade of the resolved stats.
    pub fn grade(&self, config: &PipelineConfig) -> GradeResult {
        config.grading.grade(&self.stats.value)
    }

    /// Visible languages of the resolved accumulator.
    pub fn visible_languages(&self, config: &PipelineConfig) -> Vec<VisibleLanguage> {
        visible_languages(
            &self.languages.value,
            &config.priority,
            config.visible_cap,
            config.priority_floor,
        )
    }
}

/// Fetch and aggregate everything needed for both badges.
pub async fn gather<S>(source: Arc<S>, config: &PipelineConfig) -> LiveProfile
where
    S: ProfileSource + ?Sized + 'static,
{
    let user = config.username.as_str();
    let listing = collect_repositories(source.as_ref(), user, config.per_page).await;
    if listing.repositories.is_empty() {
        let reason = match listing.error {
            Some(err) => ProfileError::Fetch(err),
            None => ProfileError::Other(format!("no repositories found for {user}")),
        };
        let message = reason.to_string();
        return LiveProfile {
            stats: Err(reason),
            languages: Err(ProfileError::Other(message)),
        };
    }
    info!(
        "collected {} repositories in {} page(s)",
        listing.repositories.len(),
        listing.pages_requested
    );

    let stats = gather_stats(source.as_ref(), config, &listing.repositories).await;
    let languages = gather_languages(source, config, listing.repositories).await;
    LiveProfile {
        stats: Ok(stats),
        languages,
    }
}

async fn gather_stats<S>(
    source: &S,
    config: &PipelineConfig,
    repositories: &[RepositorySummary],
) -> MetricSnapshot
where
    S: ProfileSource + ?Sized,
{
    let user = config.username.as_str();
    let (prs, contribs) = match source.search_pull_requests(user).await {
        Ok(search) => {
            let owners = search.repository_owners.iter().map(String::as_str);
            let contribs =
                count_contributions(user, repositories, owners, config.contribution_floor);
            (search.total_count, Some(contribs))
        }
        Err(err) => {
            warn!("pull request search failed: {err}");
            (0, None)
        }
    };

    let raw_commits = match source.search_commits(user).await {
        Ok(count) => count,
        Err(err) => {
            warn!("commit search failed: {err}");
            0
        }
    };
    let commits = reconcile_commits(raw_commits, config.baseline_commits, config.commit_noise);

    MetricSnapshot {
        stars: sum_stars(repositories),
        commits,
        prs,
        issues: sum_open_issues(repositories),
        contribs,
        timestamp: Some(Utc::now()),
    }
}

async fn gather_languages<S>(
    source: Arc<S>,
    config: &PipelineConfig,
    repositories: Vec<RepositorySummary>,
) -> Result<LanguageDistribution>
where
    S: ProfileSource + ?Sized + 'static,
{
    let strategy = config.language_strategy;
    let eligible: Vec<RepositorySummary> = repositories
        .into_iter()
        .filter(|repository| strategy.is_eligible(repository))
        .collect();
    if eligible.is_empty() {
        return Err(ProfileError::Other(
            "no repositories eligible for language aggregation".into(),
        ));
    }

    let outcomes = fetch_language_maps(source, eligible, config.concurrency).await;
    let failed = outcomes.iter().filter(|outcome| outcome.bytes.is_err()).count();
    if failed > 0 {
        warn!("language data unavailable for {failed} of {} repositories", outcomes.len());
    }
    Ok(aggregate_languages(&strategy, &outcomes, &config.priority))
}

/// Run the pipeline and resolve each artifact against the cache.
pub async fn run_profile<S, F>(
    source: Arc<S>,
    config: &PipelineConfig,
    store: &SnapshotStore<F>,
) -> ProfileRun
where
    S: ProfileSource + ?Sized + 'static,
    F: FileSystem,
{
    let live = gather(source, config).await;
    let stats = resolve_stats(store, live.stats, config.baseline_commits);
    let languages = resolve_languages(store, live.languages);
    info!(
        "stats origin: {}, languages origin: {}",
        stats.origin.as_str(),
        languages.origin.as_str()
    );
    ProfileRun { stats, languages }
}
