//! Merging ordered key sources into one flat namespace.

use std::collections::BTreeMap;

use crate::types::{FlatMapping, KeySource, Locale};

/// Merges `sources` in order; on a key collision the later source wins.
///
/// Collisions are not errors: category files are expected to be disjoint, and
/// an overlap is resolved silently (it is logged at `debug` level).
pub fn merge_sources(sources: &[KeySource]) -> FlatMapping {
    merge_in_order(sources)
}

fn merge_in_order<'a>(sources: impl IntoIterator<Item = &'a KeySource>) -> FlatMapping {
    let mut merged = FlatMapping::new();
    for source in sources {
        for (key, value) in &source.entries {
            if let Some(previous) = merged.insert(key.clone(), value.clone())
                && previous != *value
            {
                tracing::debug!(
                    key = key.as_str(),
                    origin = %source.origin_label(),
                    "later source overrides key"
                );
            }
        }
    }
    merged
}

/// Groups `sources` by locale, keeping their relative order, and merges each group.
pub fn merge_by_locale(sources: &[KeySource]) -> BTreeMap<Locale, FlatMapping> {
    let mut grouped: BTreeMap<Locale, Vec<&KeySource>> = BTreeMap::new();
    for source in sources {
        grouped
            .entry(source.locale.clone())
            .or_default()
            .push(source);
    }

    grouped
        .into_iter()
        .map(|(locale, group)| (locale, merge_in_order(group)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(locale: &str, category: &str, pairs: &[(&str, &str)]) -> KeySource {
        KeySource::new(
            Locale::parse(locale).unwrap(),
            category,
            pairs.iter().copied().collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_merge_later_source_wins() {
        let merged = merge_sources(&[
            source("en", "a", &[("k", "1")]),
            source("en", "b", &[("k", "2")]),
        ]);
        assert_eq!(merged, [("k", "2")].into_iter().collect::<FlatMapping>());
    }

    #[test]
    fn test_merge_same_source_twice_is_idempotent() {
        let a = source("en", "common", &[("common.ok", "OK"), ("common.no", "No")]);
        assert_eq!(
            merge_sources(&[a.clone(), a.clone()]),
            merge_sources(&[a])
        );
    }

    #[test]
    fn test_merge_disjoint_sources_unions_keys() {
        let merged = merge_sources(&[
            source("en", "auth", &[("auth.login", "Log in")]),
            source("en", "common", &[("common.ok", "OK")]),
            source("en", "empty", &[]),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("auth.login"), Some("Log in"));
        assert_eq!(merged.get("common.ok"), Some("OK"));
    }

    #[test]
    fn test_merge_empty_list() {
        assert!(merge_sources(&[]).is_empty());
    }

    #[test]
    fn test_merge_by_locale_keeps_order_within_locale() {
        let merged = merge_by_locale(&[
            source("fr", "a", &[("k", "fr-1")]),
            source("en", "a", &[("k", "en-1")]),
            source("fr", "b", &[("k", "fr-2")]),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(
            merged[&Locale::parse("fr").unwrap()].get("k"),
            Some("fr-2")
        );
        assert_eq!(
            merged[&Locale::parse("en").unwrap()].get("k"),
            Some("en-1")
        );
    }
}
