//! Visible-set selection and percentage normalization.

use std::cmp::Ordering;

use crate::domain::{LanguageDistribution, PriorityLanguageSet, VisibleLanguage};

/// Select the visible languages and convert their weights to percentages.
///
/// Priority languages with nonzero weight are always selected and end at or
/// above `floor` percent; the rest of the slots up to `visible_cap` go to the
/// heaviest remaining languages. The returned percentages sum to 100.0
/// (empty input, or input without positive weights, yields an empty list).
pub fn visible_languages(
    accumulator: &LanguageDistribution,
    priority: &PriorityLanguageSet,
    visible_cap: usize,
    floor: f64,
) -> Vec<VisibleLanguage> {
    let mut ranked: Vec<(&str, f64)> = accumulator
        .iter()
        .filter(|(_, weight)| weight.is_finite() && **weight > 0.0)
        .map(|(name, weight)| (name.as_str(), *weight))
        .collect();
    ranked.sort_by(by_weight_desc);

    let mut selected: Vec<(&str, f64)> = Vec::new();
    for language in priority.iter() {
        if selected.len() >= visible_cap {
            break;
        }
        if let Some(entry) = ranked.iter().find(|(name, _)| *name == language) {
            selected.push(*entry);
        }
    }
    for entry in &ranked {
        if selected.len() >= visible_cap {
            break;
        }
        if !selected.iter().any(|(name, _)| *name == entry.0) {
            selected.push(*entry);
        }
    }
    selected.sort_by(by_weight_desc);

    let total: f64 = selected.iter().map(|(_, weight)| weight).sum();
    let total = if total == 0.0 { 1.0 } else { total };
    let mut visible: Vec<VisibleLanguage> = selected
        .into_iter()
        .map(|(name, weight)| VisibleLanguage {
            name: name.to_string(),
            percentage: weight / total * 100.0,
        })
        .collect();

    apply_priority_floor(&mut visible, priority, floor);
    visible.sort_by(|a, b| {
        b.percentage
            .partial_cmp(&a.percentage)
            .unwrap_or(Ordering::Equal)
    });
    visible
}

/// Raise priority entries to `floor` and rescale the others so the total is
/// exactly 100.0.
///
/// Priority entries are visited from smallest to largest. An entry is pinned
/// at the floor when the scale implied by the entries pinned so far would
/// leave it below the floor; the first entry that clears the floor ends the
/// pass, since every later one is larger.
fn apply_priority_floor(visible: &mut [VisibleLanguage], priority: &PriorityLanguageSet, floor: f64) {
    if visible.is_empty() {
        return;
    }
    let floor = floor.max(0.0);
    let total: f64 = visible.iter().map(|entry| entry.percentage).sum();

    let mut candidates: Vec<usize> = (0..visible.len())
        .filter(|index| priority.contains(&visible[*index].name))
        .collect();
    candidates.sort_by(|a, b| {
        visible[*a]
            .percentage
            .partial_cmp(&visible[*b].percentage)
            .unwrap_or(Ordering::Equal)
    });

    let mut pinned = vec![false; visible.len()];
    let mut pinned_count = 0usize;
    let mut pinned_original = 0.0;
    for index in candidates {
        let free_original = total - pinned_original;
        let free_target = (100.0 - pinned_count as f64 * floor).max(0.0);
        if free_original <= 0.0 {
            break;
        }
        let scale = free_target / free_original;
        if visible[index].percentage * scale >= floor {
            break;
        }
        pinned[index] = true;
        pinned_count += 1;
        pinned_original += visible[index].percentage;
    }

    let free_original = total - pinned_original;
    if pinned_count == visible.len() || free_original <= 0.0 {
        let even = 100.0 / visible.len() as f64;
        for entry in visible.iter_mut() {
            entry.percentage = even;
        }
        return;
    }

    let free_target = (100.0 - pinned_count as f64 * floor).max(0.0);
    let scale = free_target / free_original;
    for (entry, is_pinned) in visible.iter_mut().zip(&pinned) {
        entry.percentage = if *is_pinned {
            floor
        } else {
            entry.percentage * scale
        };
    }

    let residue = 100.0 - visible.iter().map(|entry| entry.percentage).sum::<f64>();
    let largest_free = (0..visible.len())
        .filter(|index| !pinned[*index])
        .max_by(|a, b| {
            visible[*a]
                .percentage
                .partial_cmp(&visible[*b].percentage)
                .unwrap_or(Ordering::Equal)
        });
    if let Some(index) = largest_free {
        visible[index].percentage = (visible[index].percentage + residue).max(0.0);
    }
}

fn by_weight_desc(a: &(&str, f64), b: &(&str, f64)) -> Ordering {
    b.1.partial_cmp(&a.1)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.0.cmp(b.0))
}
