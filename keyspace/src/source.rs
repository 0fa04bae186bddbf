//! Category files and locale directories.
//!
//! A locale directory holds one JSON document per category:
//!
//! ```json
//! {
//!   "$schema": "../../schema/locale.schema.json",
//!   "locale": "en",
//!   "category": "common",
//!   "version": "1.0.0",
//!   "translations": { "common.ok": "OK" }
//! }
//! ```
//!
//! Decoding turns a document into a [`KeySource`] after checking keys and
//! value types, so the engine only ever sees well-formed data.

use std::{
    collections::BTreeMap,
    io::{BufRead, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::Error,
    read_options::ReadOptions,
    traits::{Parser, write_pretty_json},
    types::{FlatMapping, KeySource, Locale},
};

/// Version stamped on category files written for sources that carry none.
pub const DEFAULT_FILE_VERSION: &str = "1.0.0";

const CATEGORY_FILE_EXTENSION: &str = "json";

/// Raw category file document. Every field is optional so that validation
/// can report what is missing instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct CategoryFile {
    #[serde(rename = "$schema")]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub schema: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub locale: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub translations: Option<BTreeMap<String, Value>>,
}

impl Parser for CategoryFile {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        serde_json::from_reader(reader).map_err(Error::Parse)
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        write_pretty_json(writer, self)
    }
}

impl CategoryFile {
    /// Converts the document into a [`KeySource`].
    ///
    /// `locale` is the directory's locale and always wins over the declared
    /// one; `fallback_category` is used when the document declares none.
    pub fn into_key_source(
        self,
        locale: &Locale,
        fallback_category: &str,
        origin: &str,
    ) -> Result<KeySource, Error> {
        let translations = self.translations.ok_or_else(|| Error::MissingField {
            field: "translations".to_string(),
            origin: origin.to_string(),
        })?;

        if let Some(declared) = self.locale.as_deref()
            && declared != locale.as_str()
        {
            tracing::warn!(
                origin,
                declared,
                directory = %locale,
                "category file declares a different locale than its directory"
            );
        }

        let mut entries = FlatMapping::new();
        for (key, value) in translations {
            match value {
                Value::String(text) => {
                    entries.insert(key, text);
                }
                other => {
                    return Err(Error::InvalidValue {
                        key,
                        origin: origin.to_string(),
                        found: json_type_name(&other).to_string(),
                    });
                }
            }
        }

        let category = self
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| fallback_category.to_string());

        let source = KeySource::unchecked(locale.clone(), category, entries)
            .with_origin(origin)
            .with_version(self.version)
            .with_schema(self.schema);
        source.check_keys()?;
        Ok(source)
    }
}

impl From<&KeySource> for CategoryFile {
    fn from(source: &KeySource) -> Self {
        CategoryFile {
            schema: source.schema.clone(),
            locale: Some(source.locale.to_string()),
            category: Some(source.category.clone()),
            version: Some(
                source
                    .version
                    .clone()
                    .unwrap_or_else(|| DEFAULT_FILE_VERSION.to_string()),
            ),
            translations: Some(
                source
                    .entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
        }
    }
}

/// Name of a JSON value's type, as used in diagnostics.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Lists the category files (`*.json`) of a locale directory, sorted by file name.
///
/// A missing directory yields an empty list.
pub fn category_file_paths(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for dent in std::fs::read_dir(dir)? {
        let path = dent?.path();
        if path.is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(CATEGORY_FILE_EXTENSION)
        {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// Reads one category file of `locale`.
pub fn read_category_file(
    path: &Path,
    locale: &Locale,
    options: &ReadOptions,
) -> Result<KeySource, Error> {
    let origin = path.display().to_string();
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    let mut source = CategoryFile::read_from(path)?.into_key_source(locale, &stem, &origin)?;
    if !options.attach_origin {
        source.origin = None;
    }
    Ok(source)
}

/// Reads every category file of a locale directory in file-name order.
///
/// In lenient mode files that fail to decode are skipped with a warning; in
/// strict mode the first failure is returned.
pub fn read_locale_dir(
    dir: &Path,
    locale: &Locale,
    options: &ReadOptions,
) -> Result<Vec<KeySource>, Error> {
    let mut sources = Vec::new();
    for path in category_file_paths(dir)? {
        match read_category_file(&path, locale, options) {
            Ok(source) => sources.push(source),
            Err(e) if !options.strict => {
                tracing::warn!(path = %path.display(), error = %e, "skipping category file");
            }
            Err(e) => return Err(e),
        }
    }
    tracing::debug!(locale = %locale, files = sources.len(), "loaded locale directory");
    Ok(sources)
}

/// Lists the locales under `locales_dir` (one subdirectory each), sorted.
///
/// Directory names that are not valid locale identifiers, or that are not
/// spelled canonically (`pt_BR` rather than `pt-BR`), are skipped.
pub fn discover_locales(locales_dir: &Path) -> Result<Vec<Locale>, Error> {
    let mut locales = Vec::new();
    for dent in std::fs::read_dir(locales_dir)? {
        let path = dent?.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match Locale::parse(name) {
            Ok(locale) if locale.as_str() == name => locales.push(locale),
            Ok(locale) => {
                tracing::warn!(directory = name, canonical = %locale, "ignoring locale directory with non-canonical name");
            }
            Err(_) => {
                tracing::warn!(directory = name, "ignoring directory that is not a locale");
            }
        }
    }
    locales.sort();
    Ok(locales)
}

/// Writes a source into `dir` under [`KeySource::file_name`], returning the path written.
pub fn write_key_source(source: &KeySource, dir: &Path) -> Result<PathBuf, Error> {
    let path = dir.join(source.file_name());
    CategoryFile::from(source).write_to(&path)?;
    Ok(path)
}
