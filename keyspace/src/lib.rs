#![forbid(unsafe_code)]
//! Key-space reconciliation and tree assembly for localization projects.
//!
//! Translations live as flat, dot-separated keys spread over many small
//! per-category files, one directory per locale. This crate merges those
//! sources into one namespace per locale, assembles nested trees for
//! distribution, reconciles target locales against the reference locale, and
//! reports coverage.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use keyspace::{
//!     AssembleOptions, DeletionPolicy, Locale, ReadOptions, assemble, merge_sources,
//!     reconcile_sources, source::read_locale_dir,
//! };
//!
//! let en = Locale::parse("en")?;
//! let fr = Locale::parse("fr")?;
//! let reference = read_locale_dir(Path::new("locales/en"), &en, &ReadOptions::new())?;
//! let target = read_locale_dir(Path::new("locales/fr"), &fr, &ReadOptions::new())?;
//!
//! // Nested tree for a bundle
//! let tree = assemble(&merge_sources(&reference), &AssembleOptions::new());
//!
//! // Bring French in line with English
//! let synced = reconcile_sources(&reference, &target, &fr, DeletionPolicy::DeleteMissing);
//! println!("{} added, {} removed", synced.result.added.len(), synced.result.removed.len());
//! # let _ = tree;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Pipeline
//!
//! - [`merge`]: ordered sources → one flat mapping (later wins)
//! - [`scope`]: prefix filter for smaller bundles
//! - [`tree`]: flat mapping → nested tree, deeper keys win
//! - [`reconcile`]: added / removed / kept against the reference
//! - [`coverage`]: per-category and overall completion
//!
//! Engine functions are pure and never fail. Errors come from decoding and
//! validating category files.

pub mod bundle;
pub mod coverage;
pub mod error;
pub mod language;
pub mod merge;
pub mod read_options;
pub mod reconcile;
pub mod scope;
pub mod source;
pub mod traits;
pub mod tree;
pub mod types;
pub mod validate;

// Re-export most used types for easy consumption
pub use crate::{
    bundle::{
        BundleOptions, FlatBundle, LocaleBundle, Manifest, ManifestEntry, build_bundle,
        build_flat_bundle, build_manifest,
    },
    coverage::{CategoryCoverage, CoverageReport, coverage, reference_index},
    error::{Error, ErrorCode},
    language::{LanguageMeta, LanguageTable},
    merge::{merge_by_locale, merge_sources},
    read_options::ReadOptions,
    reconcile::{
        DeletionPolicy, OverrideOutcome, Placeholder, ReconciledFile, ReconciliationResult,
        SourceReconciliation, apply_overrides, key_categories, reconcile, reconcile_sources, scaffold_locale,
    },
    scope::{Scope, filter_by_prefixes, filter_scope},
    source::CategoryFile,
    traits::Parser,
    tree::{AssembleOptions, Tree, TreeNode, assemble, flatten},
    types::{Category, FlatMapping, Key, KeySource, Locale},
    validate::{IssueKind, ValidationIssue, ValidationOptions, validate_file},
};
