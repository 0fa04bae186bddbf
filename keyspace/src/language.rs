//! Display metadata for locales, used in bundles and the manifest.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Locale;

/// English name, native name, and representative region of a locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageMeta {
    pub name: String,
    pub native: String,
    pub region: String,
}

impl LanguageMeta {
    pub fn new(name: impl Into<String>, native: impl Into<String>, region: impl Into<String>) -> Self {
        LanguageMeta {
            name: name.into(),
            native: native.into(),
            region: region.into(),
        }
    }

    /// Metadata for a locale missing from the table: its own tag as both
    /// names, and its region subtag (or upper-cased language) as region.
    pub fn fallback(locale: &Locale) -> Self {
        let region = locale
            .language_identifier()
            .and_then(|id| {
                id.region
                    .map(|region| region.as_str().to_string())
                    .or_else(|| Some(id.language.as_str().to_ascii_uppercase()))
            })
            .unwrap_or_else(|| locale.as_str().to_ascii_uppercase());
        LanguageMeta::new(locale.as_str(), locale.as_str(), region)
    }
}

const BUILTIN_LANGUAGES: &[(&str, &str, &str, &str)] = &[
    ("en", "English", "English", "US"),
    ("zh-TW", "Traditional Chinese", "繁體中文", "TW"),
    ("zh-CN", "Simplified Chinese", "简体中文", "CN"),
    ("ja", "Japanese", "日本語", "JP"),
    ("ko", "Korean", "한국어", "KR"),
    ("es", "Spanish", "Español", "ES"),
    ("fr", "French", "Français", "FR"),
    ("de", "German", "Deutsch", "DE"),
    ("pt", "Portuguese", "Português", "BR"),
    ("it", "Italian", "Italiano", "IT"),
    ("ru", "Russian", "Русский", "RU"),
    ("th", "Thai", "ไทย", "TH"),
    ("vi", "Vietnamese", "Tiếng Việt", "VN"),
    ("ar", "Arabic", "العربية", "SA"),
    ("hi", "Hindi", "हिन्दी", "IN"),
    ("id", "Indonesian", "Bahasa Indonesia", "ID"),
    ("ms", "Malay", "Bahasa Melayu", "MY"),
    ("nl", "Dutch", "Nederlands", "NL"),
    ("pl", "Polish", "Polski", "PL"),
    ("tr", "Turkish", "Türkçe", "TR"),
    ("uk", "Ukrainian", "Українська", "UA"),
];

/// Immutable locale → [`LanguageMeta`] table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageTable {
    entries: BTreeMap<String, LanguageMeta>,
}

impl LanguageTable {
    /// An empty table; every lookup falls back.
    pub fn new() -> Self {
        Self::default()
    }

    /// The 21 locales shipped by default.
    pub fn builtin() -> Self {
        let entries = BUILTIN_LANGUAGES
            .iter()
            .map(|(tag, name, native, region)| {
                (tag.to_string(), LanguageMeta::new(*name, *native, *region))
            })
            .collect();
        LanguageTable { entries }
    }

    /// Returns a copy of the table with `locale` added or replaced.
    pub fn with_entry(mut self, locale: impl Into<String>, meta: LanguageMeta) -> Self {
        self.entries.insert(locale.into(), meta);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, locale: &str) -> Option<&LanguageMeta> {
        self.entries.get(locale)
    }

    /// Metadata for `locale`, falling back to [`LanguageMeta::fallback`].
    pub fn meta_for(&self, locale: &Locale) -> LanguageMeta {
        self.get(locale.as_str())
            .cloned()
            .unwrap_or_else(|| LanguageMeta::fallback(locale))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LanguageMeta)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
