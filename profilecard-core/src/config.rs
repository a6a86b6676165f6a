//! Pipeline configuration passed explicitly through every stage.

use crate::domain::PriorityLanguageSet;
use crate::error::{ProfileError, Result};
use crate::grader::GradingModel;
use crate::languages::LanguageStrategy;

/// Default repositories requested per listing page.
pub const DEFAULT_PER_PAGE: u32 = 100;
/// Default verified commit baseline.
pub const DEFAULT_COMMIT_BASELINE: u64 = 17_000;
/// Default number of languages shown.
pub const DEFAULT_VISIBLE_CAP: usize = 18;
/// Default minimum share of a present priority language, in percent.
pub const DEFAULT_PRIORITY_FLOOR: f64 = 1.0;
/// Default lower bound for a known contribution count.
pub const DEFAULT_CONTRIBUTION_FLOOR: u64 = 1;
/// Default number of concurrent language requests.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Everything a profile run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Subject account login.
    pub username: String,
    /// Page size of the repository listing.
    pub per_page: u32,
    /// Commit count the reconciled total never drops below.
    pub baseline_commits: u64,
    /// Whether `raw % 1000` is added on top of the baseline.
    pub commit_noise: bool,
    /// How language maps are combined.
    pub language_strategy: LanguageStrategy,
    /// Languages with a guaranteed visible share.
    pub priority: PriorityLanguageSet,
    /// Maximum number of visible languages.
    pub visible_cap: usize,
    /// Minimum share of a present priority language, in percent.
    pub priority_floor: f64,
    /// Lower bound for a known contribution count.
    pub contribution_floor: u64,
    /// Score weights and grade thresholds.
    pub grading: GradingModel,
    /// Maximum concurrent language requests.
    pub concurrency: usize,
}

impl PipelineConfig {
    /// Configuration with defaults for the given user.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            per_page: DEFAULT_PER_PAGE,
            baseline_commits: DEFAULT_COMMIT_BASELINE,
            commit_noise: true,
            language_strategy: LanguageStrategy::default(),
            priority: PriorityLanguageSet::default(),
            visible_cap: DEFAULT_VISIBLE_CAP,
            priority_floor: DEFAULT_PRIORITY_FLOOR,
            contribution_floor: DEFAULT_CONTRIBUTION_FLOOR,
            grading: GradingModel::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Reject configurations the pipeline cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(ProfileError::Config("username must not be empty".into()));
        }
        if self.per_page == 0 || self.per_page > 100 {
            return Err(ProfileError::Config(
                "per_page must be between 1 and 100".into(),
            ));
        }
        if self.visible_cap == 0 {
            return Err(ProfileError::Config(
                "visible_cap must be at least 1".into(),
            ));
        }
        if self.concurrency == 0 {
            return Err(ProfileError::Config(
                "concurrency must be at least 1".into(),
            ));
        }
        if !self.priority_floor.is_finite() || self.priority_floor < 0.0 {
            return Err(ProfileError::Config(
                "priority_floor must be a non-negative number".into(),
            ));
        }
        if self.priority.len() as f64 * self.priority_floor >= 100.0 {
            return Err(ProfileError::Config(format!(
                "{} priority languages at {}% leave no room for other languages",
                self.priority.len(),
                self.priority_floor
            )));
        }
        if let LanguageStrategy::DiversityWeighted {
            name_hint_density: Some(density),
            ..
        } = self.language_strategy
        {
            if !density.is_finite() || density < 0.0 {
                return Err(ProfileError::Config(
                    "name hint density must be a non-negative number".into(),
                ));
            }
        }
        self.grading.validate()
    }
}
