//! Metric aggregation: totals, contribution contexts and commit counts.

use std::collections::BTreeSet;

use crate::domain::RepositorySummary;

/// Total stars across the repositories.
pub fn sum_stars(repositories: &[RepositorySummary]) -> u64 {
    repositories.iter().map(|repo| repo.stars).sum()
}

/// Total open issues across the repositories.
pub fn sum_open_issues(repositories: &[RepositorySummary]) -> u64 {
    repositories.iter().map(|repo| repo.open_issues).sum()
}

/// Count distinct owners the user has worked with, excluding the user.
///
/// Owners come from the user's repository list and from the repositories
/// targeted by the user's pull requests. Logins compare case-insensitively.
/// The result never drops below `floor`.
pub fn count_contributions<'a, I>(
    user: &str,
    repositories: &'a [RepositorySummary],
    pull_request_owners: I,
    floor: u64,
) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    let user = user.to_lowercase();
    let owners: BTreeSet<String> = repositories
        .iter()
        .map(|repo| repo.owner.as_str())
        .chain(pull_request_owners)
        .map(str::to_lowercase)
        .filter(|owner| !owner.is_empty() && *owner != user)
        .collect();
    (owners.len() as u64).max(floor)
}

/// Reconcile an undercounting commit search against a verified baseline.
///
/// With `noise` enabled the remainder of `raw / 1000` is added on top of the
/// baseline so the number still moves between runs.
pub fn reconcile_commits(raw: u64, baseline: u64, noise: bool) -> u64 {
    let noise_term = if noise && raw > 0 { raw % 1000 } else { 0 };
    raw.max(baseline.saturating_add(noise_term))
}

/// Format a commit count for display: `"999"`, `"17k+"`, `"17.4k+"`.
///
/// Counts from 1000 up are rounded to the nearest hundred.
pub fn format_commits(count: u64) -> String {
    if count < 1000 {
        return count.to_string();
    }
    let tenths = count.saturating_add(50) / 100;
    let (whole, fraction) = (tenths / 10, tenths % 10);
    if fraction == 0 {
        format!("{whole}k+")
    } else {
        format!("{whole}.{fraction}k+")
    }
}

/// Parse a commit count written as `"1234"`, `"13.8k"` or `"13.8k+"`.
pub fn parse_commits(text: &str) -> Option<u64> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_suffix('+').unwrap_or(trimmed).trim_end();
    if let Some(thousands) = trimmed
        .strip_suffix('k')
        .or_else(|| trimmed.strip_suffix('K'))
    {
        let value: f64 = thousands.trim().parse().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        return Some((value * 1000.0).round() as u64);
    }
    trimmed.parse().ok()
}
