//! Weighted scoring and grade lookup.

use crate::domain::{Grade, GradeResult, MetricSnapshot};
use crate::error::{ProfileError, Result};

/// Default weight per star.
pub const STAR_WEIGHT: f64 = 10.0;
/// Default weight per commit.
pub const COMMIT_WEIGHT: f64 = 1.5;
/// Default weight per pull request.
pub const PULL_REQUEST_WEIGHT: f64 = 50.0;
/// Default weight per open issue.
pub const ISSUE_WEIGHT: f64 = 5.0;
/// Default weight per contribution context.
pub const CONTRIBUTION_WEIGHT: f64 = 100.0;

/// Per-metric score weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    /// Weight per star.
    pub stars: f64,
    /// Weight per commit.
    pub commits: f64,
    /// Weight per pull request.
    pub pull_requests: f64,
    /// Weight per open issue.
    pub issues: f64,
    /// Weight per contribution context.
    pub contributions: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            stars: STAR_WEIGHT,
            commits: COMMIT_WEIGHT,
            pull_requests: PULL_REQUEST_WEIGHT,
            issues: ISSUE_WEIGHT,
            contributions: CONTRIBUTION_WEIGHT,
        }
    }
}

/// A score strictly above `min_score` earns `grade` and `percentile`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeThreshold {
    /// Exclusive lower bound of the band.
    pub min_score: f64,
    /// Grade awarded in the band.
    pub grade: Grade,
    /// Percentile awarded in the band.
    pub percentile: u8,
}

/// Weights plus the ascending threshold table.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingModel {
    /// Per-metric weights.
    pub weights: ScoreWeights,
    /// Grade for scores not above the first threshold.
    pub base: GradeResult,
    /// Bands ordered by ascending `min_score`.
    pub thresholds: Vec<GradeThreshold>,
}

impl Default for GradingModel {
    fn default() -> Self {
        let band = |min_score, grade, percentile| GradeThreshold {
            min_score,
            grade,
            percentile,
        };
        Self {
            weights: ScoreWeights::default(),
            base: GradeResult {
                grade: Grade::C,
                percentile: 30,
            },
            thresholds: vec![
                band(1000.0, Grade::BMinus, 45),
                band(2000.0, Grade::B, 55),
                band(3000.0, Grade::BPlus, 65),
                band(4000.0, Grade::AMinus, 75),
                band(6000.0, Grade::A, 85),
                band(8000.0, Grade::APlus, 95),
            ],
        }
    }
}

impl GradingModel {
    /// Check the model keeps grading monotonic.
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("stars", self.weights.stars),
            ("commits", self.weights.commits),
            ("pull_requests", self.weights.pull_requests),
            ("issues", self.weights.issues),
            ("contributions", self.weights.contributions),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ProfileError::Config(format!(
                    "weight {name} must be a non-negative number"
                )));
            }
        }
        if self.base.percentile > 100 {
            return Err(ProfileError::Config("percentile must be <= 100".into()));
        }

        let mut previous_score = f64::NEG_INFINITY;
        let mut previous = self.base;
        for band in &self.thresholds {
            if !band.min_score.is_finite() || band.min_score <= previous_score {
                return Err(ProfileError::Config(
                    "grade thresholds must be strictly ascending".into(),
                ));
            }
            if band.percentile > 100 || band.percentile < previous.percentile {
                return Err(ProfileError::Config(
                    "grade percentiles must be non-decreasing and <= 100".into(),
                ));
            }
            if band.grade < previous.grade {
                return Err(ProfileError::Config(
                    "grade labels must be non-decreasing".into(),
                ));
            }
            previous_score = band.min_score;
            previous = GradeResult {
                grade: band.grade,
                percentile: band.percentile,
            };
        }
        Ok(())
    }

    /// Weighted score of a snapshot. Unknown contributions score zero.
    pub fn score(&self, snapshot: &MetricSnapshot) -> f64 {
        let weights = &self.weights;
        snapshot.stars as f64 * weights.stars
            + snapshot.commits as f64 * weights.commits
            + snapshot.prs as f64 * weights.pull_requests
            + snapshot.issues as f64 * weights.issues
            + snapshot.contribs.unwrap_or(0) as f64 * weights.contributions
    }

    /// Grade a snapshot.
    pub fn grade(&self, snapshot: &MetricSnapshot) -> GradeResult {
        let score = self.score(snapshot);
        self.thresholds
            .iter()
            .rev()
            .find(|band| score > band.min_score)
            .map(|band| GradeResult {
                grade: band.grade,
                percentile: band.percentile,
            })
            .unwrap_or(self.base)
    }
}
