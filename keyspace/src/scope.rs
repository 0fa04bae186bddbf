//! Prefix scopes: smaller bundles for consumers that only need part of the key space.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::FlatMapping;

/// A named set of accepted key prefixes, e.g. `cloud = ["cloud."]`.
///
/// Prefixes match the literal leading substring of a key, so include the
/// trailing `.` to match whole segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub name: String,
    pub prefixes: BTreeSet<String>,
}

impl Scope {
    pub fn new<I, S>(name: impl Into<String>, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Scope {
            name: name.into(),
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, key: &str) -> bool {
        matches_any(&self.prefixes, key)
    }
}

fn matches_any(prefixes: &BTreeSet<String>, key: &str) -> bool {
    prefixes.iter().any(|prefix| key.starts_with(prefix.as_str()))
}

/// Keeps the keys that start with one of `prefixes`; `None` returns `mapping` unchanged.
pub fn filter_by_prefixes(mapping: FlatMapping, prefixes: Option<&BTreeSet<String>>) -> FlatMapping {
    let Some(prefixes) = prefixes else {
        return mapping;
    };
    mapping
        .into_iter()
        .filter(|(key, _)| matches_any(prefixes, key))
        .collect()
}

/// [`filter_by_prefixes`] with the prefixes of an optional named scope.
pub fn filter_scope(mapping: FlatMapping, scope: Option<&Scope>) -> FlatMapping {
    filter_by_prefixes(mapping, scope.map(|s| &s.prefixes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> FlatMapping {
        [
            ("cloud.feature.label", "Feature"),
            ("cloud.auth.title", "Sign in"),
            ("cloudy.weather", "Cloudy"),
            ("modules.browser.click.label", "Click"),
            ("common.ok", "OK"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_no_scope_is_identity() {
        assert_eq!(filter_scope(mapping(), None), mapping());
        assert_eq!(filter_by_prefixes(mapping(), None), mapping());
    }

    #[test]
    fn test_scope_keeps_literal_prefix_matches() {
        let scope = Scope::new("cloud", ["cloud."]);
        let filtered = filter_scope(mapping(), Some(&scope));
        assert_eq!(
            filtered.keys().collect::<Vec<_>>(),
            vec!["cloud.auth.title", "cloud.feature.label"]
        );
    }

    #[test]
    fn test_scope_with_several_prefixes() {
        let scope = Scope::new("modules", ["modules.", "common."]);
        let filtered = filter_scope(mapping(), Some(&scope));
        assert_eq!(filtered.len(), 2);
        assert!(filtered.contains_key("common.ok"));
        assert!(filtered.contains_key("modules.browser.click.label"));
    }

    #[test]
    fn test_prefix_without_dot_matches_substring() {
        let scope = Scope::new("loose", ["cloud"]);
        assert_eq!(filter_scope(mapping(), Some(&scope)).len(), 3);
        assert!(scope.matches("cloudy.weather"));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let scope = Scope::new("cloud", ["cloud.", "common."]);
        let once = filter_scope(mapping(), Some(&scope));
        let twice = filter_scope(once.clone(), Some(&scope));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_prefix_set_drops_everything() {
        let scope = Scope::new("nothing", Vec::<String>::new());
        assert!(filter_scope(mapping(), Some(&scope)).is_empty());
    }
}
