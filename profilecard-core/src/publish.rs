//! README cache-busting for published badges.

use std::path::Path;

use log::{debug, info};
use regex::Regex;

use crate::error::{ProfileError, Result};
use crate::fs::FileSystem;

/// Rewrite every reference to `assets` so it carries `?t=<stamp>`.
///
/// The stamp is `now`, unless the content already carries a stamp at or
/// after `now` for one of the assets, in which case it is that stamp plus
/// one. Returns the rewritten content and the stamp used.
pub fn cache_bust(content: &str, assets: &[&str], now: u64) -> Result<(String, u64)> {
    let patterns = assets
        .iter()
        .map(|asset| asset_pattern(asset))
        .collect::<Result<Vec<Regex>>>()?;

    let previous = patterns
        .iter()
        .flat_map(|pattern| pattern.captures_iter(content))
        .filter_map(|captures| captures.get(1))
        .filter_map(|stamp| stamp.as_str().parse::<u64>().ok())
        .max();
    let stamp = match previous {
        Some(previous) if previous >= now => previous + 1,
        _ => now,
    };

    let mut rewritten = content.to_string();
    for (pattern, asset) in patterns.iter().zip(assets) {
        let replacement = format!("{asset}?t={stamp}");
        rewritten = pattern
            .replace_all(&rewritten, regex::NoExpand(&replacement))
            .into_owned();
    }
    Ok((rewritten, stamp))
}

/// Cache-bust the README at `readme` in place.
///
/// Returns `Ok(None)` when the README does not exist, otherwise the stamp
/// written.
pub fn publish_readme<F: FileSystem>(
    fs: &F,
    readme: &Path,
    assets: &[&str],
    now: u64,
) -> Result<Option<u64>> {
    if !fs.exists(readme) {
        debug!("{} not found, nothing to publish", readme.display());
        return Ok(None);
    }
    let content = fs.read_to_string(readme)?;
    let (rewritten, stamp) = cache_bust(&content, assets, now)?;
    fs.write_atomic(readme, &rewritten)?;
    info!("updated {} with cache stamp {stamp}", readme.display());
    Ok(Some(stamp))
}

fn asset_pattern(asset: &str) -> Result<Regex> {
    let pattern = format!(r"{}(?:\?t=(\d+))?", regex::escape(asset));
    Regex::new(&pattern).map_err(|err| ProfileError::Other(format!("invalid asset path: {err}")))
}
