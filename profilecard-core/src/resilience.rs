//! Last-known-good snapshots and the live / cached / synthetic fallback.

use std::path::{Path, PathBuf};

use log::{error, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::{DataOrigin, LanguageDistribution, MetricSnapshot};
use crate::error::Result;
use crate::fs::FileSystem;

/// File name of the stats snapshot inside the output directory.
pub const STATS_CACHE_FILE: &str = "stats_cache.json";
/// File name of the language snapshot inside the output directory.
pub const LANGUAGES_CACHE_FILE: &str = "languages_cache.json";

/// Reads and writes the resilience cache files.
#[derive(Debug, Clone)]
pub struct SnapshotStore<F: FileSystem> {
    fs: F,
    stats_path: PathBuf,
    languages_path: PathBuf,
}

impl<F: FileSystem> SnapshotStore<F> {
    /// Store keeping both cache files in `output_dir`.
    pub fn new(fs: F, output_dir: &Path) -> Self {
        Self {
            fs,
            stats_path: output_dir.join(STATS_CACHE_FILE),
            languages_path: output_dir.join(LANGUAGES_CACHE_FILE),
        }
    }

    /// Path of the stats cache.
    pub fn stats_path(&self) -> &Path {
        &self.stats_path
    }

    /// Path of the language cache.
    pub fn languages_path(&self) -> &Path {
        &self.languages_path
    }

    /// Load the cached stats snapshot; `Ok(None)` when no cache exists.
    pub fn load_stats(&self) -> Result<Option<MetricSnapshot>> {
        self.load(&self.stats_path)
    }

    /// Persist a stats snapshot.
    pub fn save_stats(&self, snapshot: &MetricSnapshot) -> Result<()> {
        self.save(&self.stats_path, snapshot)
    }

    /// Load the cached language accumulator; `Ok(None)` when no cache exists.
    pub fn load_languages(&self) -> Result<Option<LanguageDistribution>> {
        self.load(&self.languages_path)
    }

    /// Persist a language accumulator.
    pub fn save_languages(&self, languages: &LanguageDistribution) -> Result<()> {
        self.save(&self.languages_path, languages)
    }

    fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !self.fs.exists(path) {
            return Ok(None);
        }
        let contents = self.fs.read_to_string(path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let contents = serde_json::to_string_pretty(value)?;
        self.fs.write_atomic(path, &contents)
    }
}

/// A value together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    /// Origin of the value.
    pub origin: DataOrigin,
    /// The value to render.
    pub value: T,
}

/// Stats used when neither live data nor a cache is available.
pub fn synthetic_stats(baseline_commits: u64) -> MetricSnapshot {
    MetricSnapshot {
        stars: 0,
        commits: baseline_commits,
        prs: 0,
        issues: 0,
        contribs: None,
        timestamp: None,
    }
}

/// Languages used when neither live data nor a cache is available.
pub fn synthetic_languages() -> LanguageDistribution {
    [
        ("HTML", 35.5),
        ("Python", 25.0),
        ("Jupyter Notebook", 10.0),
        ("R", 8.5),
        ("JavaScript", 5.0),
    ]
    .into_iter()
    .map(|(name, weight)| (name.to_string(), weight))
    .collect()
}

/// Whether an accumulator carries any usable weight.
pub fn has_language_weight(languages: &LanguageDistribution) -> bool {
    languages
        .values()
        .filter(|weight| weight.is_finite())
        .sum::<f64>()
        > 0.0
}

/// Pick the stats to render: plausible live data (persisted), then the
/// cache, then the synthetic default.
pub fn resolve_stats<F: FileSystem>(
    store: &SnapshotStore<F>,
    live: Result<MetricSnapshot>,
    baseline_commits: u64,
) -> Resolved<MetricSnapshot> {
    resolve(
        "stats",
        live,
        MetricSnapshot::is_plausible,
        |snapshot| store.save_stats(snapshot),
        || store.load_stats(),
        || synthetic_stats(baseline_commits),
    )
}

/// Pick the language accumulator to render: live data with positive weight
/// (persisted), then the cache, then the synthetic default.
pub fn resolve_languages<F: FileSystem>(
    store: &SnapshotStore<F>,
    live: Result<LanguageDistribution>,
) -> Resolved<LanguageDistribution> {
    resolve(
        "languages",
        live,
        has_language_weight,
        |languages| store.save_languages(languages),
        || store.load_languages(),
        synthetic_languages,
    )
}

fn resolve<T>(
    artifact: &str,
    live: Result<T>,
    is_sane: impl Fn(&T) -> bool,
    save: impl FnOnce(&T) -> Result<()>,
    load: impl FnOnce() -> Result<Option<T>>,
    synthetic: impl FnOnce() -> T,
) -> Resolved<T> {
    match live {
        Ok(value) if is_sane(&value) => {
            if let Err(err) = save(&value) {
                warn!("failed to update {artifact} cache: {err}");
            }
            info!("{artifact}: using live data");
            return Resolved {
                origin: DataOrigin::Live,
                value,
            };
        }
        Ok(_) => warn!("{artifact}: live data failed the sanity check"),
        Err(err) => warn!("{artifact}: live data unavailable: {err}"),
    }

    match load() {
        Ok(Some(value)) => {
            info!("{artifact}: restored from cache");
            Resolved {
                origin: DataOrigin::Cached,
                value,
            }
        }
        Ok(None) => {
            error!("{artifact}: no live data and no cache, using synthetic defaults");
            Resolved {
                origin: DataOrigin::Synthetic,
                value: synthetic(),
            }
        }
        Err(err) => {
            error!("{artifact}: cache unreadable ({err}), using synthetic defaults");
            Resolved {
                origin: DataOrigin::Synthetic,
                value: synthetic(),
            }
        }
    }
}
