//! Completion statistics of a target locale against the reference key space.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::{Category, KeySource};

/// Completion of one category. `coverage` is a percentage in `0.0..=100.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCoverage {
    pub total: usize,
    pub translated: usize,
    pub coverage: f64,
    pub missing_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub categories: BTreeMap<Category, CategoryCoverage>,
    pub total: usize,
    pub translated: usize,
    pub coverage: f64,
    /// Reference keys with no non-empty target value, sorted.
    pub missing_keys: Vec<String>,
}

impl CoverageReport {
    pub fn is_complete(&self) -> bool {
        self.missing_keys.is_empty()
    }
}

/// Percentage of `part` in `whole`; 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Rounds a percentage to one decimal place for display.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Computes per-category and overall coverage.
///
/// The overall ratio is built from the summed counts, not from the mean of
/// the category ratios. Target keys outside the reference are ignored.
pub fn coverage(
    reference: &BTreeMap<Category, BTreeSet<String>>,
    target_nonempty: &BTreeSet<String>,
) -> CoverageReport {
    let mut categories = BTreeMap::new();
    let mut missing = BTreeSet::new();
    let mut total = 0;
    let mut translated = 0;

    for (category, keys) in reference {
        let done = keys.intersection(target_nonempty).count();
        let category_missing: Vec<&String> = keys.difference(target_nonempty).collect();

        categories.insert(
            category.clone(),
            CategoryCoverage {
                total: keys.len(),
                translated: done,
                coverage: percentage(done, keys.len()),
                missing_count: category_missing.len(),
            },
        );

        total += keys.len();
        translated += done;
        missing.extend(category_missing.into_iter().cloned());
    }

    CoverageReport {
        categories,
        total,
        translated,
        coverage: percentage(translated, total),
        missing_keys: missing.into_iter().collect(),
    }
}

/// Groups the reference sources' keys by category.
pub fn reference_index(sources: &[KeySource]) -> BTreeMap<Category, BTreeSet<String>> {
    let mut index: BTreeMap<Category, BTreeSet<String>> = BTreeMap::new();
    for source in sources {
        index
            .entry(source.category.clone())
            .or_default()
            .extend(source.entries.keys().map(str::to_string));
    }
    index
}
