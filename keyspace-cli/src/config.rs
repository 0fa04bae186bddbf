//! `keyspace.toml` project configuration.
//!
//! Every field has a default, so a project without a config file works with
//! the conventional `locales/<locale>/*.json` layout and `en` as reference.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use keyspace::{
    DeletionPolicy, LanguageMeta, LanguageTable, Locale, Scope, ValidationOptions,
    validate::DEFAULT_MAX_VALUE_LENGTH,
};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "keyspace.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_locales_dir")]
    pub locales_dir: PathBuf,
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
    #[serde(default = "default_reference_locale")]
    pub reference_locale: String,
    /// Leading key segment stripped from nested bundles, e.g. `cloud`.
    #[serde(default)]
    pub root_alias: Option<String>,
    /// Version stamped on bundles and the manifest.
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub sync_policy: DeletionPolicy,
    /// Scope name → accepted key prefixes.
    #[serde(default)]
    pub scopes: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Additional or replacement language metadata, by locale.
    #[serde(default)]
    pub languages: BTreeMap<String, LanguageMeta>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ValidationConfig {
    #[serde(default = "default_max_value_length")]
    pub max_value_length: usize,
    #[serde(default)]
    pub required_roots: Vec<String>,
}

fn default_locales_dir() -> PathBuf {
    PathBuf::from("locales")
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_reference_locale() -> String {
    "en".to_string()
}

fn default_version() -> String {
    "0.0.0".to_string()
}

fn default_max_value_length() -> usize {
    DEFAULT_MAX_VALUE_LENGTH
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            max_value_length: default_max_value_length(),
            required_roots: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            locales_dir: default_locales_dir(),
            dist_dir: default_dist_dir(),
            reference_locale: default_reference_locale(),
            root_alias: None,
            version: default_version(),
            sync_policy: DeletionPolicy::default(),
            scopes: BTreeMap::new(),
            validation: ValidationConfig::default(),
            languages: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| format!("Invalid configuration: {}", e))
    }

    /// Loads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config '{}': {}", path.display(), e))?;
        Self::from_toml_str(&text).map_err(|e| format!("{} ({})", e, path.display()))
    }

    pub fn reference_locale(&self) -> Result<Locale, String> {
        Locale::parse(&self.reference_locale)
            .map_err(|e| format!("Invalid reference_locale in config: {}", e))
    }

    /// Looks up a named scope.
    pub fn scope(&self, name: &str) -> Result<Scope, String> {
        self.scopes
            .get(name)
            .map(|prefixes| Scope::new(name, prefixes.iter().cloned()))
            .ok_or_else(|| {
                let known: Vec<&str> = self.scopes.keys().map(String::as_str).collect();
                if known.is_empty() {
                    format!("Unknown scope '{}': no scopes are configured", name)
                } else {
                    format!("Unknown scope '{}'. Configured scopes: {}", name, known.join(", "))
                }
            })
    }

    /// Built-in language table with the configured entries applied on top.
    pub fn language_table(&self) -> LanguageTable {
        self.languages
            .iter()
            .fold(LanguageTable::builtin(), |table, (locale, meta)| {
                table.with_entry(locale.clone(), meta.clone())
            })
    }

    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            max_value_length: self.validation.max_value_length,
            required_roots: self.validation.required_roots.clone(),
            ..ValidationOptions::default()
        }
    }
}
