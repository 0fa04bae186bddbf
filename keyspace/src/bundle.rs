//! Distribution bundles: one merged document per locale plus a manifest.

use std::{
    collections::BTreeMap,
    io::{BufRead, Write},
};

use serde::{Deserialize, Serialize};

use crate::{
    coverage::{percentage, round_one_decimal},
    error::Error,
    language::LanguageTable,
    merge::merge_sources,
    scope::{Scope, filter_scope},
    traits::{Parser, write_compact_json, write_pretty_json},
    tree::{AssembleOptions, Tree, assemble},
    types::{FlatMapping, KeySource, Locale},
};

/// Parameters of a bundle build. `version` is stamped verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleOptions {
    pub scope: Option<Scope>,
    pub root_alias: Option<String>,
    pub version: String,
}

impl BundleOptions {
    pub fn new(version: impl Into<String>) -> Self {
        BundleOptions {
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_scope(mut self, scope: Option<Scope>) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_root_alias(mut self, alias: Option<String>) -> Self {
        self.root_alias = alias;
        self
    }
}

/// Nested translations of one locale with its display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleBundle {
    pub locale: Locale,
    pub name: String,
    pub native: String,
    pub region: String,
    pub version: String,
    pub files_merged: usize,
    pub total_keys: usize,
    /// Non-empty values among `total_keys`; only reported in the manifest.
    #[serde(skip)]
    pub translated_keys: usize,
    pub translations: Tree,
}

/// Flat translations of one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatBundle {
    pub locale: Locale,
    pub version: String,
    pub key_count: usize,
    pub translations: FlatMapping,
}

fn scoped_mapping(locale: &Locale, sources: &[KeySource], options: &BundleOptions) -> (Vec<KeySource>, FlatMapping) {
    let own: Vec<KeySource> = sources
        .iter()
        .filter(|source| source.locale == *locale)
        .cloned()
        .collect();
    let merged = filter_scope(merge_sources(&own), options.scope.as_ref());
    (own, merged)
}

/// Merges `locale`'s sources, applies the scope, and assembles the tree.
///
/// Sources of other locales in `sources` are ignored.
pub fn build_bundle(
    locale: &Locale,
    sources: &[KeySource],
    options: &BundleOptions,
    languages: &LanguageTable,
) -> LocaleBundle {
    let (own, mapping) = scoped_mapping(locale, sources, options);
    let meta = languages.meta_for(locale);
    let assemble_options = AssembleOptions::new().with_root_alias(options.root_alias.clone());

    LocaleBundle {
        locale: locale.clone(),
        name: meta.name,
        native: meta.native,
        region: meta.region,
        version: options.version.clone(),
        files_merged: own.len(),
        total_keys: mapping.len(),
        translated_keys: mapping.non_empty_count(),
        translations: assemble(&mapping, &assemble_options),
    }
}

/// Like [`build_bundle`] but keeps the merged mapping flat.
pub fn build_flat_bundle(locale: &Locale, sources: &[KeySource], options: &BundleOptions) -> FlatBundle {
    let (_, mapping) = scoped_mapping(locale, sources, options);
    FlatBundle {
        locale: locale.clone(),
        version: options.version.clone(),
        key_count: mapping.len(),
        translations: mapping,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub native: String,
    pub region: String,
    pub total_keys: usize,
    pub translated_keys: usize,
    /// Percentage rounded to one decimal.
    pub completion: f64,
    pub files_merged: usize,
}

/// Index of every built locale bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub locales: BTreeMap<Locale, ManifestEntry>,
}

impl Manifest {
    /// Locales whose bundle has every key translated.
    pub fn complete_locales(&self) -> impl Iterator<Item = &Locale> {
        self.locales
            .iter()
            .filter(|(_, entry)| entry.total_keys > 0 && entry.translated_keys == entry.total_keys)
            .map(|(locale, _)| locale)
    }
}

/// Builds the manifest from already-built bundles.
pub fn build_manifest(version: impl Into<String>, bundles: &[LocaleBundle]) -> Manifest {
    let locales = bundles
        .iter()
        .map(|bundle| {
            let entry = ManifestEntry {
                name: bundle.name.clone(),
                native: bundle.native.clone(),
                region: bundle.region.clone(),
                total_keys: bundle.total_keys,
                translated_keys: bundle.translated_keys,
                completion: round_one_decimal(percentage(bundle.translated_keys, bundle.total_keys)),
                files_merged: bundle.files_merged,
            };
            (bundle.locale.clone(), entry)
        })
        .collect();
    Manifest {
        version: version.into(),
        locales,
    }
}

impl Parser for LocaleBundle {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        write_compact_json(writer, self)
    }
}

impl Parser for FlatBundle {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        write_compact_json(writer, self)
    }
}

impl Parser for Manifest {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        write_pretty_json(writer, self)
    }
}
