//! Reconciling a target locale's key set against the reference locale.
//!
//! [`reconcile`] is the pure set computation over one flat namespace.
//! [`reconcile_sources`] runs it over a whole locale and spreads the result
//! back over the locale's category files. The scaffolding and override helpers build
//! on the same rules: existing non-placeholder values are never overwritten by
//! a placeholder.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    merge::merge_sources,
    types::{Category, FlatMapping, KeySource, Locale},
};

/// What happens to target keys that the reference no longer has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeletionPolicy {
    /// Drop keys absent from the reference.
    #[default]
    #[serde(rename = "delete")]
    DeleteMissing,
    /// Keep keys absent from the reference; they are still reported as removed.
    #[serde(rename = "preserve")]
    PreserveMissing,
}

impl DeletionPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            DeletionPolicy::DeleteMissing => "delete",
            DeletionPolicy::PreserveMissing => "preserve",
        }
    }
}

impl Display for DeletionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeletionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delete" | "delete-missing" | "delete_missing" => Ok(DeletionPolicy::DeleteMissing),
            "preserve" | "preserve-missing" | "preserve_missing" => {
                Ok(DeletionPolicy::PreserveMissing)
            }
            other => Err(Error::validation_error(format!(
                "unknown deletion policy `{}` (expected `delete` or `preserve`)",
                other
            ))),
        }
    }
}

/// Outcome of reconciling one target mapping with a reference key set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Reference keys the target lacked; they map to `""` in `mapping`.
    pub added: BTreeSet<String>,
    /// Target keys absent from the reference, whatever the policy.
    pub removed: BTreeSet<String>,
    /// Keys in both; their target values are carried over unchanged.
    pub kept: BTreeSet<String>,
    pub policy: DeletionPolicy,
    pub mapping: FlatMapping,
}

impl ReconciliationResult {
    /// True when `mapping` differs from the target it was computed from.
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty()
            || (self.policy == DeletionPolicy::DeleteMissing && !self.removed.is_empty())
    }
}

/// Computes added/removed/kept keys and the new target mapping.
pub fn reconcile(
    reference: &BTreeSet<String>,
    target: &FlatMapping,
    policy: DeletionPolicy,
) -> ReconciliationResult {
    let mut added = BTreeSet::new();
    let mut kept = BTreeSet::new();
    let mut mapping = FlatMapping::new();

    for key in reference {
        match target.get(key) {
            Some(value) => {
                kept.insert(key.clone());
                mapping.insert(key.clone(), value);
            }
            None => {
                added.insert(key.clone());
                mapping.insert(key.clone(), "");
            }
        }
    }

    let removed: BTreeSet<String> = target
        .keys()
        .filter(|key| !reference.contains(*key))
        .map(str::to_string)
        .collect();

    if policy == DeletionPolicy::PreserveMissing {
        for key in &removed {
            if let Some(value) = target.get(key) {
                mapping.insert(key.clone(), value);
            }
        }
    }

    ReconciliationResult {
        added,
        removed,
        kept,
        policy,
        mapping,
    }
}

/// Maps every key to the category of the last source that defines it.
pub fn key_categories(sources: &[KeySource]) -> BTreeMap<String, Category> {
    let mut owners = BTreeMap::new();
    for source in sources {
        for key in source.entries.keys() {
            owners.insert(key.to_string(), source.category.clone());
        }
    }
    owners
}

/// One category file of a reconciled target locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledFile {
    /// File name inside the target locale directory.
    pub file_name: String,
    /// New content; `origin` is set when the target already had this file.
    pub source: KeySource,
    /// Keys the target file had that are gone from `source`.
    pub dropped: BTreeSet<String>,
    /// Entries differ from the target file's, or the file is new.
    pub changed: bool,
}

/// Locale-wide reconciliation spread back over category files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReconciliation {
    pub result: ReconciliationResult,
    /// Reference files first (reference order), then target-only files.
    pub files: Vec<ReconciledFile>,
}

impl SourceReconciliation {
    pub fn changed_files(&self) -> impl Iterator<Item = &ReconciledFile> {
        self.files.iter().filter(|file| file.changed)
    }
}

/// Reconciles all of a target locale's sources against the reference sources.
///
/// Target files mirror the reference files by file name (see
/// [`KeySource::file_name`]). Every reference key lands in the file that owns
/// it in the reference, so a key that moved between files keeps its
/// translation. Preserved removed keys stay in every target file that had them;
/// under [`DeletionPolicy::DeleteMissing`] they are dropped from all of them.
pub fn reconcile_sources(
    reference: &[KeySource],
    target: &[KeySource],
    locale: &Locale,
    policy: DeletionPolicy,
) -> SourceReconciliation {
    let reference_keys = merge_sources(reference).key_set();
    let target_merged = merge_sources(target);
    let result = reconcile(&reference_keys, &target_merged, policy);

    let mut names: Vec<String> = Vec::new();
    let mut seen = BTreeSet::new();
    for source in reference.iter().chain(target) {
        let name = source.file_name();
        if seen.insert(name.clone()) {
            names.push(name);
        }
    }

    let mut by_file: BTreeMap<String, FlatMapping> = BTreeMap::new();
    let mut owners: BTreeMap<&str, String> = BTreeMap::new();
    for source in reference {
        let name = source.file_name();
        for key in source.entries.keys() {
            owners.insert(key, name.clone());
        }
    }
    for (key, name) in owners {
        if let Some(value) = result.mapping.get(key) {
            by_file.entry(name).or_default().insert(key, value);
        }
    }
    if policy == DeletionPolicy::PreserveMissing {
        for source in target {
            for (key, value) in &source.entries {
                if result.removed.contains(key) {
                    by_file
                        .entry(source.file_name())
                        .or_default()
                        .insert(key.clone(), value.clone());
                }
            }
        }
    }

    let mut files = Vec::with_capacity(names.len());
    for name in names {
        let existing: Vec<&KeySource> = target
            .iter()
            .filter(|source| source.file_name() == name)
            .collect();
        let entries = by_file.remove(&name).unwrap_or_default();

        let mut previous = FlatMapping::new();
        for source in &existing {
            for (key, value) in &source.entries {
                previous.insert(key.clone(), value.clone());
            }
        }
        let dropped: BTreeSet<String> = previous
            .keys()
            .filter(|key| !entries.contains_key(key))
            .map(str::to_string)
            .collect();
        let changed = existing.is_empty() || previous != entries;

        let template = existing.last().copied().or_else(|| {
            reference
                .iter()
                .rev()
                .find(|source| source.file_name() == name)
        });
        let mut source = match template {
            Some(template) => {
                KeySource::unchecked(locale.clone(), template.category.clone(), entries)
                    .with_version(template.version.clone())
                    .with_schema(template.schema.clone())
            }
            None => KeySource::unchecked(locale.clone(), name.trim_end_matches(".json"), entries),
        };
        if let Some(origin) = existing.last().and_then(|source| source.origin.clone()) {
            source = source.with_origin(origin);
        }

        files.push(ReconciledFile {
            file_name: name,
            source,
            dropped,
            changed,
        });
    }

    tracing::info!(
        locale = %locale,
        policy = %policy,
        added = result.added.len(),
        removed = result.removed.len(),
        kept = result.kept.len(),
        changed_files = files.iter().filter(|file| file.changed).count(),
        "reconciled locale"
    );

    SourceReconciliation { result, files }
}

/// Values given to keys of a freshly scaffolded locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placeholder {
    /// Every value is `""`.
    #[default]
    Empty,
    /// Every value is copied from the reference.
    Reference,
}

/// Creates a target locale's sources from the reference sources, one per category.
pub fn scaffold_locale(
    reference: &[KeySource],
    locale: &Locale,
    placeholder: Placeholder,
) -> Vec<KeySource> {
    reference
        .iter()
        .map(|source| {
            let entries: FlatMapping = match placeholder {
                Placeholder::Empty => source.entries.keys().map(|key| (key, "")).collect(),
                Placeholder::Reference => source.entries.clone(),
            };
            KeySource::unchecked(locale.clone(), source.category.clone(), entries)
                .with_version(source.version.clone())
                .with_schema(source.schema.clone())
        })
        .collect()
}

/// Result of [`apply_overrides`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideOutcome {
    pub mapping: FlatMapping,
    /// Keys whose value actually changed.
    pub changed: BTreeSet<String>,
}

/// Applies `overrides` on top of `target`. Empty override values are ignored.
pub fn apply_overrides(target: &FlatMapping, overrides: &FlatMapping) -> OverrideOutcome {
    let mut mapping = target.clone();
    let mut changed = BTreeSet::new();
    for (key, value) in overrides {
        if value.is_empty() {
            continue;
        }
        if mapping.get(key) != Some(value.as_str()) {
            mapping.insert(key.clone(), value.clone());
            changed.insert(key.clone());
        }
    }
    OverrideOutcome { mapping, changed }
}

/// Keys of a mapping split by the category that owns them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutedKeys {
    pub by_category: BTreeMap<Category, FlatMapping>,
    /// Keys no category owns.
    pub unrouted: BTreeSet<String>,
}

/// Splits `mapping` by the owners from [`key_categories`].
pub fn route_by_category(owners: &BTreeMap<String, Category>, mapping: &FlatMapping) -> RoutedKeys {
    let mut routed = RoutedKeys::default();
    for (key, value) in mapping {
        match owners.get(key) {
            Some(category) => {
                routed
                    .by_category
                    .entry(category.clone())
                    .or_default()
                    .insert(key.clone(), value.clone());
            }
            None => {
                routed.unrouted.insert(key.clone());
            }
        }
    }
    routed
}
