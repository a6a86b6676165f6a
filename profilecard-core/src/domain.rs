//! Domain entities for profilecard.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::metrics::parse_commits;

/// A mapping of language names to a non-negative weight.
///
/// Depending on the stage this holds raw byte sums, density fractions, or
/// finalized percentages.
pub type LanguageDistribution = BTreeMap<String, f64>;

/// Byte counts per language for a single repository.
pub type LanguageBytes = BTreeMap<String, u64>;

/// Repository metadata taken from one page of the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    /// Repository name without the owner prefix.
    pub name: String,
    /// Login of the repository owner.
    pub owner: String,
    /// Stargazer count.
    pub stars: u64,
    /// Open issue count (GitHub includes open pull requests here).
    pub open_issues: u64,
    /// Whether the repository is a fork.
    pub fork: bool,
    /// Endpoint returning the language byte map for this repository.
    pub languages_url: String,
}

/// Result of a pull request search for the subject user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestSearch {
    /// Total number of pull requests reported by the search.
    pub total_count: u64,
    /// Owner logins of the repositories the returned pull requests target.
    pub repository_owners: Vec<String>,
}

/// A language entry of the rendered distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleLanguage {
    /// Language name.
    pub name: String,
    /// Share of the visible set, in percent.
    pub percentage: f64,
}

/// Aggregated profile metrics; the unit persisted to the stats cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// Total stars across owned repositories.
    pub stars: u64,
    /// Reconciled commit count. Older caches store a formatted string.
    #[serde(deserialize_with = "deserialize_commits")]
    pub commits: u64,
    /// Pull requests authored.
    pub prs: u64,
    /// Open issues across owned repositories.
    pub issues: u64,
    /// Distinct external contribution contexts; `None` when unknown.
    #[serde(default)]
    pub contribs: Option<u64>,
    /// When the snapshot was computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl MetricSnapshot {
    /// Whether live data looks real enough to overwrite the cache.
    pub fn is_plausible(&self) -> bool {
        self.stars > 0 || self.prs > 0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CommitField {
    Count(u64),
    Text(String),
}

fn deserialize_commits<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match CommitField::deserialize(deserializer)? {
        CommitField::Count(count) => Ok(count),
        CommitField::Text(text) => parse_commits(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid commit count: {text:?}"))),
    }
}

/// Ordinal grade labels, lowest first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
    /// Baseline grade.
    C,
    /// B-.
    BMinus,
    /// B.
    B,
    /// B+.
    BPlus,
    /// A-.
    AMinus,
    /// A.
    A,
    /// A+.
    APlus,
}

impl Grade {
    /// Human-readable grade label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::C => "C",
            Grade::BMinus => "B-",
            Grade::B => "B",
            Grade::BPlus => "B+",
            Grade::AMinus => "A-",
            Grade::A => "A",
            Grade::APlus => "A+",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grade label and percentile derived from a snapshot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GradeResult {
    /// Ordinal grade.
    pub grade: Grade,
    /// Percentile, 0-100.
    pub percentile: u8,
}

/// Languages guaranteed a minimum visible share when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityLanguageSet {
    names: Vec<String>,
}

impl PriorityLanguageSet {
    /// Build a set from names, keeping the first occurrence of duplicates.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self { names: unique }
    }

    /// Whether the language is a priority language.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|candidate| candidate == name)
    }

    /// Priority languages in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of priority languages.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for PriorityLanguageSet {
    fn default() -> Self {
        Self::new(["R", "Julia", "MATLAB", "LaTeX", "C++", "Python"])
    }
}

/// Where the data behind a rendered artifact came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    /// Freshly fetched and aggregated.
    Live,
    /// Restored from the resilience cache.
    Cached,
    /// Built-in synthetic default.
    Synthetic,
}

impl DataOrigin {
    /// Human-readable origin label.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataOrigin::Live => "live",
            DataOrigin::Cached => "cached",
            DataOrigin::Synthetic => "synthetic",
        }
    }
}
