//! Core types shared by every stage of the key-space pipeline.
//! Category-file decoding produces these; the engine consumes and produces them.

use std::{
    collections::{BTreeMap, BTreeSet, btree_map},
    fmt::Display,
    str::FromStr,
};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

use crate::error::Error;

lazy_static! {
    static ref SEGMENT_REGEX: Regex = Regex::new(r"^[a-z][a-z0-9_]*$").unwrap();
}

/// Separator between key segments.
pub const KEY_SEPARATOR: char = '.';

/// Grouping label of a [`KeySource`], usually the stem of its category file.
pub type Category = String;

/// A validated, dot-separated translation key such as `modules.browser.click.label`.
///
/// Every segment matches `[a-z][a-z0-9_]*`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key(String);

impl Key {
    /// Parses and validates a raw key, reporting the first offending segment.
    pub fn parse(raw: &str) -> Result<Self, String> {
        raw.parse()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(KEY_SEPARATOR)
    }

    /// Number of segments in the key.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The first segment.
    pub fn root(&self) -> &str {
        self.segments().next().unwrap_or_default()
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("key is empty".to_string());
        }
        for segment in s.split(KEY_SEPARATOR) {
            if segment.is_empty() {
                return Err("key contains an empty segment".to_string());
            }
            if !SEGMENT_REGEX.is_match(segment) {
                return Err(format!(
                    "segment `{}` does not match [a-z][a-z0-9_]*",
                    segment
                ));
            }
        }
        Ok(Key(s.to_string()))
    }
}

impl TryFrom<String> for Key {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Key> for String {
    fn from(value: Key) -> Self {
        value.0
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A locale identifier such as `en`, `zh-TW` or `pt-BR`.
///
/// The original spelling is kept (it usually names a directory); `_` is
/// normalized to `-`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let normalized = raw.trim().replace('_', "-");
        if normalized.is_empty() {
            return Err(Error::InvalidLocale(raw.to_string()));
        }
        normalized
            .parse::<LanguageIdentifier>()
            .map_err(|_| Error::InvalidLocale(raw.to_string()))?;
        Ok(Locale(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn language_identifier(&self) -> Option<LanguageIdentifier> {
        self.0.parse().ok()
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Locale::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(value: Locale) -> Self {
        value.0
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A flat key → value namespace. Iteration is always in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatMapping {
    entries: BTreeMap<String, String>,
}

impl FlatMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts a value, returning the previous one for that key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn key_set(&self) -> BTreeSet<String> {
        self.entries.keys().cloned().collect()
    }

    /// Keys whose value is not the empty string.
    pub fn non_empty_keys(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn non_empty_count(&self) -> usize {
        self.entries.values().filter(|v| !v.is_empty()).count()
    }
}

impl From<BTreeMap<String, String>> for FlatMapping {
    fn from(entries: BTreeMap<String, String>) -> Self {
        FlatMapping { entries }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FlatMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FlatMapping {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for FlatMapping {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a FlatMapping {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// One flat unit of translations for a single locale and category,
/// typically decoded from one category file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySource {
    pub locale: Locale,

    pub category: Category,

    /// Where the source came from (a file path, usually); used in error messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub origin: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub version: Option<String>,

    /// `$schema` reference carried through rewrites.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub schema: Option<String>,

    pub entries: FlatMapping,
}

impl KeySource {
    /// Creates a source after checking every key with [`Key::parse`].
    pub fn new(
        locale: Locale,
        category: impl Into<Category>,
        entries: FlatMapping,
    ) -> Result<Self, Error> {
        let source = Self::unchecked(locale, category, entries);
        source.check_keys()?;
        Ok(source)
    }

    /// Creates a source without key validation; for data produced by the engine itself.
    pub fn unchecked(locale: Locale, category: impl Into<Category>, entries: FlatMapping) -> Self {
        KeySource {
            locale,
            category: category.into(),
            origin: None,
            version: None,
            schema: None,
            entries,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    pub fn with_schema(mut self, schema: Option<String>) -> Self {
        self.schema = schema;
        self
    }

    /// Label naming this source in diagnostics.
    pub fn origin_label(&self) -> String {
        self.origin
            .clone()
            .unwrap_or_else(|| format!("{}/{}", self.locale, self.category))
    }

    /// Name of the category file this source is stored in: the origin's file
    /// name when known, `<category>.json` otherwise.
    pub fn file_name(&self) -> String {
        self.origin
            .as_deref()
            .and_then(|origin| std::path::Path::new(origin).file_name())
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("{}.json", self.category))
    }

    /// Fails on the first key that is not a valid [`Key`].
    pub fn check_keys(&self) -> Result<(), Error> {
        for key in self.entries.keys() {
            Key::parse(key)
                .map_err(|reason| Error::invalid_key(key, self.origin_label(), reason))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locale(raw: &str) -> Locale {
        Locale::parse(raw).unwrap()
    }

    #[test]
    fn test_key_parse_valid() {
        let key = Key::parse("modules.browser.click_2.label").unwrap();
        assert_eq!(key.depth(), 4);
        assert_eq!(key.root(), "modules");
        assert_eq!(
            key.segments().collect::<Vec<_>>(),
            vec!["modules", "browser", "click_2", "label"]
        );
    }

    #[test]
    fn test_key_parse_single_segment() {
        assert_eq!(Key::parse("title").unwrap().depth(), 1);
    }

    #[test]
    fn test_key_parse_rejects_bad_segments() {
        assert!(Key::parse("").is_err());
        assert!(Key::parse("a..b").is_err());
        assert!(Key::parse(".a").is_err());
        assert!(Key::parse("a.").is_err());
        assert!(Key::parse("cloud.myTemplates").is_err());
        assert!(Key::parse("common.2fa").is_err());
        assert!(Key::parse("common.with-dash").is_err());
    }

    #[test]
    fn test_key_parse_error_names_segment() {
        let err = Key::parse("common.Title").unwrap_err();
        assert!(err.contains("`Title`"));
    }

    #[test]
    fn test_key_serde_rejects_invalid() {
        assert!(serde_json::from_str::<Key>("\"Bad.Key\"").is_err());
        let key: Key = serde_json::from_str("\"good.key\"").unwrap();
        assert_eq!(key.as_str(), "good.key");
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!(locale("en").as_str(), "en");
        assert_eq!(locale("zh-TW").as_str(), "zh-TW");
        assert_eq!(locale("pt_BR").as_str(), "pt-BR");
        let id = locale("zh-TW").language_identifier().unwrap();
        assert_eq!(id.language.as_str(), "zh");
        assert_eq!(id.region.unwrap().as_str(), "TW");
    }

    #[test]
    fn test_locale_parse_invalid() {
        assert!(Locale::parse("").is_err());
        assert!(Locale::parse("   ").is_err());
        assert!(Locale::parse("not a locale").is_err());
    }

    #[test]
    fn test_flat_mapping_basics() {
        let mut mapping: FlatMapping = [("b.key", "B"), ("a.key", "")].into_iter().collect();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.keys().collect::<Vec<_>>(), vec!["a.key", "b.key"]);
        assert_eq!(mapping.non_empty_count(), 1);
        assert_eq!(
            mapping.non_empty_keys(),
            BTreeSet::from(["b.key".to_string()])
        );
        assert_eq!(mapping.insert("a.key", "A"), Some(String::new()));
        assert_eq!(mapping.get("a.key"), Some("A"));
        assert_eq!(mapping.remove("b.key"), Some("B".to_string()));
        assert!(!mapping.contains_key("b.key"));
    }

    #[test]
    fn test_flat_mapping_serializes_as_plain_object() {
        let mapping: FlatMapping = [("z", "Z"), ("a", "A")].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&mapping).unwrap(),
            r#"{"a":"A","z":"Z"}"#
        );
    }

    #[test]
    fn test_key_source_new_validates_keys() {
        let entries: FlatMapping = [("common.ok", "OK"), ("common.Cancel", "Cancel")]
            .into_iter()
            .collect();
        let err = KeySource::new(locale("en"), "common", entries)
            .map(|s| s.with_origin("locales/en/common.json"))
            .unwrap_err();
        assert!(err.to_string().contains("common.Cancel"));
        assert!(err.to_string().contains("en/common"));
    }

    #[test]
    fn test_key_source_origin_label() {
        let source = KeySource::unchecked(locale("fr"), "auth", FlatMapping::new());
        assert_eq!(source.origin_label(), "fr/auth");
        let source = source.with_origin("locales/fr/auth.json");
        assert_eq!(source.origin_label(), "locales/fr/auth.json");
    }

    #[test]
    fn test_key_source_file_name_prefers_origin() {
        let source = KeySource::unchecked(locale("en"), "browser", FlatMapping::new());
        assert_eq!(source.file_name(), "browser.json");
        let source = source.with_origin("locales/en/modules.browser.json");
        assert_eq!(source.file_name(), "modules.browser.json");
    }
}
