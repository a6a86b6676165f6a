//! Cross-repository language aggregation.

use log::debug;

use crate::domain::{LanguageBytes, LanguageDistribution, PriorityLanguageSet, RepositorySummary};
use crate::fetch::RepositoryLanguages;

/// How per-repository language maps are folded into one distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LanguageStrategy {
    /// Sum raw byte counts of non-fork repositories.
    RawBytes,
    /// Average per-repository language shares so every repository counts
    /// equally regardless of size.
    DiversityWeighted {
        /// Whether forks take part (and count towards the divisor).
        include_forks: bool,
        /// Density injected for priority languages named in a repository
        /// whose language data is unavailable.
        name_hint_density: Option<f64>,
    },
}

impl LanguageStrategy {
    /// Whether the repository contributes to the distribution.
    pub fn is_eligible(&self, repository: &RepositorySummary) -> bool {
        match self {
            LanguageStrategy::RawBytes => !repository.fork,
            LanguageStrategy::DiversityWeighted { include_forks, .. } => {
                *include_forks || !repository.fork
            }
        }
    }

    /// Short identifier used in logs and CLI values.
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageStrategy::RawBytes => "raw",
            LanguageStrategy::DiversityWeighted { .. } => "diversity",
        }
    }
}

impl Default for LanguageStrategy {
    fn default() -> Self {
        LanguageStrategy::DiversityWeighted {
            include_forks: true,
            name_hint_density: Some(0.1),
        }
    }
}

/// Fold fetched language maps into a global accumulator.
///
/// Repositories the strategy does not consider eligible are ignored. Failed
/// fetches and repositories with zero bytes contribute nothing.
pub fn aggregate_languages(
    strategy: &LanguageStrategy,
    outcomes: &[RepositoryLanguages],
    priority: &PriorityLanguageSet,
) -> LanguageDistribution {
    let eligible: Vec<&RepositoryLanguages> = outcomes
        .iter()
        .filter(|outcome| strategy.is_eligible(&outcome.repository))
        .collect();

    let mut accumulator = LanguageDistribution::new();
    match strategy {
        LanguageStrategy::RawBytes => {
            for outcome in eligible {
                if let Ok(bytes) = &outcome.bytes {
                    add_raw_bytes(&mut accumulator, bytes);
                }
            }
        }
        LanguageStrategy::DiversityWeighted {
            name_hint_density, ..
        } => {
            let repository_count = eligible.len();
            for outcome in eligible {
                match &outcome.bytes {
                    Ok(bytes) if bytes.values().any(|count| *count > 0) => {
                        add_local_shares(&mut accumulator, bytes, repository_count)
                    }
                    // Failed fetches and empty maps both count as unknown.
                    _ => {
                        if let Some(density) = name_hint_density {
                            add_name_hints(
                                &mut accumulator,
                                &outcome.repository.name,
                                priority,
                                *density,
                                repository_count,
                            );
                        }
                    }
                }
            }
        }
    }

    debug!(
        "aggregated {} languages with the {} strategy",
        accumulator.len(),
        strategy.as_str()
    );
    accumulator
}

fn add_raw_bytes(accumulator: &mut LanguageDistribution, bytes: &LanguageBytes) {
    for (language, count) in bytes {
        *accumulator.entry(language.clone()).or_insert(0.0) += *count as f64;
    }
}

fn add_local_shares(
    accumulator: &mut LanguageDistribution,
    bytes: &LanguageBytes,
    repository_count: usize,
) {
    let total: u64 = bytes.values().sum();
    if total == 0 || repository_count == 0 {
        return;
    }
    for (language, count) in bytes {
        let share = *count as f64 / total as f64;
        *accumulator.entry(language.clone()).or_insert(0.0) += share / repository_count as f64;
    }
}

fn add_name_hints(
    accumulator: &mut LanguageDistribution,
    repository_name: &str,
    priority: &PriorityLanguageSet,
    density: f64,
    repository_count: usize,
) {
    if repository_count == 0 || density <= 0.0 {
        return;
    }
    let repository_name = repository_name.to_lowercase();
    for language in priority.iter() {
        if repository_name.contains(&language.to_lowercase()) {
            *accumulator.entry(language.to_string()).or_insert(0.0) +=
                density / repository_count as f64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LanguageStrategy, aggregate_languages};
    use crate::domain::PriorityLanguageSet;
    use crate::fetch::RepositoryLanguages;
    use crate::source::FetchError;
    use crate::testing::{bytes, repo};

    fn outcome(name: &str, entries: &[(&str, u64)]) -> RepositoryLanguages {
        RepositoryLanguages {
            repository: repo(name, "octo"),
            bytes: Ok(bytes(entries)),
        }
    }

    fn failed(name: &str) -> RepositoryLanguages {
        RepositoryLanguages {
            repository: repo(name, "octo"),
            bytes: Err(FetchError::Transport("timeout".to_string())),
        }
    }

    fn diversity(include_forks: bool, hint: Option<f64>) -> LanguageStrategy {
        LanguageStrategy::DiversityWeighted {
            include_forks,
            name_hint_density: hint,
        }
    }

    fn assert_close(actual: Option<&f64>, expected: f64) {
        let actual = *actual.expect("language present");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn diversity_weighting_gives_each_repository_one_vote() {
        let outcomes = vec![
            outcome("solo", &[("Python", 1000)]),
            outcome("mixed", &[("Python", 500), ("R", 500)]),
        ];

        let result = aggregate_languages(
            &diversity(true, None),
            &outcomes,
            &PriorityLanguageSet::default(),
        );

        assert_close(result.get("Python"), 0.75);
        assert_close(result.get("R"), 0.25);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn raw_strategy_sums_bytes_and_skips_forks() {
        let mut forked = outcome("fork", &[("Java", 1_000_000)]);
        forked.repository.fork = true;
        let outcomes = vec![
            outcome("big", &[("Rust", 9000), ("Shell", 100)]),
            outcome("small", &[("Rust", 1000)]),
            forked,
            failed("broken"),
        ];

        let result = aggregate_languages(
            &LanguageStrategy::RawBytes,
            &outcomes,
            &PriorityLanguageSet::default(),
        );

        assert_close(result.get("Rust"), 10_000.0);
        assert_close(result.get("Shell"), 100.0);
        assert!(!result.contains_key("Java"));
    }

    #[test]
    fn diversity_divisor_counts_eligible_repositories_only() {
        let mut forked = outcome("fork", &[("Go", 10)]);
        forked.repository.fork = true;
        let outcomes = vec![outcome("own", &[("Rust", 10)]), forked];

        let without_forks = aggregate_languages(
            &diversity(false, None),
            &outcomes,
            &PriorityLanguageSet::default(),
        );
        assert_close(without_forks.get("Rust"), 1.0);
        assert!(!without_forks.contains_key("Go"));

        let with_forks = aggregate_languages(
            &diversity(true, None),
            &outcomes,
            &PriorityLanguageSet::default(),
        );
        assert_close(with_forks.get("Rust"), 0.5);
        assert_close(with_forks.get("Go"), 0.5);
    }

    #[test]
    fn zero_byte_repositories_are_skipped_but_still_counted() {
        let outcomes = vec![outcome("empty", &[]), outcome("full", &[("C", 42)])];

        let result = aggregate_languages(
            &diversity(true, None),
            &outcomes,
            &PriorityLanguageSet::default(),
        );

        assert_close(result.get("C"), 0.5);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn name_hints_fill_in_for_missing_language_data() {
        let outcomes = vec![
            failed("julia-notebooks"),
            outcome("site", &[("HTML", 100)]),
        ];

        let result = aggregate_languages(
            &diversity(true, Some(0.1)),
            &outcomes,
            &PriorityLanguageSet::default(),
        );

        assert_close(result.get("Julia"), 0.05);
        assert_close(result.get("HTML"), 0.5);
    }

    #[test]
    fn name_hints_apply_to_repositories_without_detected_languages() {
        let outcomes = vec![
            outcome("julia-notebooks", &[]),
            outcome("site", &[("HTML", 100)]),
        ];

        let result = aggregate_languages(
            &diversity(true, Some(0.1)),
            &outcomes,
            &PriorityLanguageSet::default(),
        );

        assert_close(result.get("Julia"), 0.05);
        assert_close(result.get("HTML"), 0.5);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn name_hints_are_optional() {
        let outcomes = vec![failed("python-scripts")];
        let result = aggregate_languages(
            &diversity(true, None),
            &outcomes,
            &PriorityLanguageSet::default(),
        );
        assert!(result.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_accumulator() {
        let result = aggregate_languages(
            &LanguageStrategy::default(),
            &[],
            &PriorityLanguageSet::default(),
        );
        assert!(result.is_empty());
    }
}
