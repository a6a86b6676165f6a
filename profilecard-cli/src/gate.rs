//! Scheduled-run gate keyed on the owner's local hour.

use chrono::{DateTime, Timelike, Utc};
use log::debug;
use tokio::process::Command;

/// Event name of scheduled CI runs.
pub const SCHEDULE_EVENT: &str = "schedule";

/// Whether a run should proceed.
///
/// Only scheduled runs with a non-empty hour list are gated.
pub fn should_run(event_name: Option<&str>, run_hours: &[u32], local_hour: u32) -> bool {
    if event_name != Some(SCHEDULE_EVENT) || run_hours.is_empty() {
        return true;
    }
    run_hours.contains(&local_hour)
}

/// Local hour at `now` using the UTC offset of a `git log --format=%ai` line.
pub fn local_hour_from_commit_date(commit_date: &str, now: DateTime<Utc>) -> Option<u32> {
    let committed = DateTime::parse_from_str(commit_date.trim(), "%Y-%m-%d %H:%M:%S %z").ok()?;
    Some(now.with_timezone(committed.offset()).hour())
}

/// Current local hour, derived from the latest commit in the working
/// directory. Falls back to the UTC hour.
pub async fn local_hour() -> u32 {
    let now = Utc::now();
    match latest_commit_date().await {
        Some(date) => local_hour_from_commit_date(&date, now).unwrap_or_else(|| {
            debug!("unrecognized commit date {date:?}, using UTC");
            now.hour()
        }),
        None => now.hour(),
    }
}

async fn latest_commit_date() -> Option<String> {
    let output = Command::new("git")
        .args(["log", "-1", "--format=%ai"])
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        debug!("git log failed with status {}", output.status);
        return None;
    }
    String::from_utf8(output.stdout).ok()
}
