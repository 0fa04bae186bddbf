use keyspace::{
    AssembleOptions, DeletionPolicy, FlatMapping, KeySource, Locale, Scope, assemble, coverage,
    filter_scope, merge_sources, reconcile,
};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

fn key_strategy() -> impl Strategy<Value = String> {
    // Small alphabet so parent/child collisions are common.
    prop::collection::vec("[a-c][a-c0-9_]{0,1}", 1..4).prop_map(|segments| segments.join("."))
}

fn value_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 ]{0,12}").expect("valid value regex")
}

fn mapping_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(key_strategy(), value_strategy(), 0..16)
}

fn key_set_strategy() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(key_strategy(), 0..16)
}

fn source(category: &str, values: &BTreeMap<String, String>) -> KeySource {
    KeySource::new(
        Locale::parse("en").expect("valid locale"),
        category,
        values.clone().into(),
    )
    .expect("generated keys are valid")
}

fn shadowed(key: &str, mapping: &FlatMapping) -> bool {
    let prefix = format!("{}.", key);
    mapping.keys().any(|other| other.starts_with(&prefix))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn merge_of_repeated_source_equals_single_merge(values in mapping_strategy()) {
        let a = source("a", &values);
        prop_assert_eq!(merge_sources(&[a.clone(), a.clone()]), merge_sources(&[a]));
    }

    #[test]
    fn merge_prefers_later_sources(first in mapping_strategy(), second in mapping_strategy()) {
        let merged = merge_sources(&[source("a", &first), source("b", &second)]);
        for (key, value) in &merged {
            let expected = second.get(key).or_else(|| first.get(key));
            prop_assert_eq!(Some(value), expected);
        }
        prop_assert_eq!(
            merged.key_set(),
            first.keys().chain(second.keys()).cloned().collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn assembly_keeps_exactly_the_unshadowed_keys(values in mapping_strategy()) {
        let mapping: FlatMapping = values.into();
        let tree = assemble(&mapping, &AssembleOptions::new());
        let expected: FlatMapping = mapping
            .iter()
            .filter(|(key, _)| !shadowed(key, &mapping))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        prop_assert_eq!(tree.flatten(), expected);
    }

    #[test]
    fn reconciliation_never_rewrites_kept_values(
        reference in key_set_strategy(),
        target in mapping_strategy(),
    ) {
        let target: FlatMapping = target.into();
        for policy in [DeletionPolicy::DeleteMissing, DeletionPolicy::PreserveMissing] {
            let result = reconcile(&reference, &target, policy);
            for key in &result.kept {
                prop_assert_eq!(result.mapping.get(key), target.get(key));
            }
            for key in &result.added {
                prop_assert_eq!(result.mapping.get(key), Some(""));
            }
            prop_assert!(result.added.is_disjoint(&result.kept));
            prop_assert_eq!(
                result.kept.len() + result.removed.len(),
                target.len()
            );
            match policy {
                DeletionPolicy::DeleteMissing => {
                    prop_assert_eq!(result.mapping.key_set(), reference.clone());
                }
                DeletionPolicy::PreserveMissing => {
                    for key in &result.removed {
                        prop_assert_eq!(result.mapping.get(key), target.get(key));
                    }
                }
            }
        }
    }

    #[test]
    fn scope_filter_is_idempotent(values in mapping_strategy(), prefix in "[a-c]{1,2}\\.?") {
        let scope = Scope::new("generated", [prefix]);
        let once = filter_scope(values.into(), Some(&scope));
        prop_assert_eq!(filter_scope(once.clone(), Some(&scope)), once);
    }

    #[test]
    fn coverage_stays_within_bounds(reference in key_set_strategy(), done in key_set_strategy()) {
        let index = BTreeMap::from([("all".to_string(), reference.clone())]);
        let report = coverage(&index, &done);
        prop_assert!(report.translated <= report.total);
        prop_assert!((0.0..=100.0).contains(&report.coverage));
        prop_assert_eq!(report.total - report.translated, report.missing_keys.len());
    }
}

#[test]
fn test_documented_examples() {
    let options = AssembleOptions::new();

    let tree = assemble(
        &[("a.b", "x"), ("a.b.c", "y")].into_iter().collect(),
        &options,
    );
    assert_eq!(
        serde_json::to_value(&tree).unwrap(),
        serde_json::json!({"a": {"b": {"c": "y"}}})
    );

    let reference: BTreeSet<String> = ["a", "b", "c"].iter().map(|k| k.to_string()).collect();
    let target: FlatMapping = [("a", "A"), ("d", "D")].into_iter().collect();

    let deleted = reconcile(&reference, &target, DeletionPolicy::DeleteMissing);
    assert_eq!(
        deleted.mapping,
        [("a", "A"), ("b", ""), ("c", "")].into_iter().collect::<FlatMapping>()
    );

    let preserved = reconcile(&reference, &target, DeletionPolicy::PreserveMissing);
    assert_eq!(
        preserved.mapping,
        [("a", "A"), ("b", ""), ("c", ""), ("d", "D")].into_iter().collect::<FlatMapping>()
    );
}
