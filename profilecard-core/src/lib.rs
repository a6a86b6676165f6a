#![deny(missing_docs)]
//! profilecard core library.
//!
//! Fetches a user's repository data through a [`ProfileSource`], aggregates
//! metrics and language shares, grades the profile, and renders SVG badges.
//! Every run falls back to the last known-good snapshot when live data is
//! unavailable.

pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod fs;
pub mod grader;
pub mod languages;
pub mod metrics;
pub mod normalizer;
pub mod pipeline;
pub mod publish;
pub mod render;
pub mod resilience;
pub mod source;

#[cfg(test)]
mod testing;

pub use config::PipelineConfig;
pub use domain::{
    DataOrigin, Grade, GradeResult, LanguageBytes, LanguageDistribution, MetricSnapshot,
    PriorityLanguageSet, PullRequestSearch, RepositorySummary, VisibleLanguage,
};
pub use error::{ProfileError, Result};
pub use fs::{FileSystem, StdFileSystem};
pub use grader::{GradeThreshold, GradingModel, ScoreWeights};
pub use languages::{LanguageStrategy, aggregate_languages};
pub use metrics::{format_commits, parse_commits};
pub use normalizer::visible_languages;
pub use pipeline::{LiveProfile, ProfileRun, gather, run_profile};
pub use publish::{cache_bust, publish_readme};
pub use render::{render_languages_svg, render_stats_svg};
pub use resilience::{
    LANGUAGES_CACHE_FILE, Resolved, STATS_CACHE_FILE, SnapshotStore, synthetic_languages,
    synthetic_stats,
};
pub use source::{FetchError, FetchFuture, FetchResult, ProfileSource, owner_from_repository_url};
