use std::path::{Path, PathBuf};

use keyspace::{
    BundleOptions, LanguageTable, Locale, LocaleBundle, Parser, build_bundle, build_flat_bundle,
    build_manifest,
};
use keyspace_cli::{Project, validation::validate_output_dir};
use rayon::prelude::*;

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub locale: Option<String>,
    pub scope: Option<String>,
    pub flat: bool,
    pub output: Option<String>,
    pub bundle_version: Option<String>,
}

fn bundle_file_name(locale: &Locale, scope: Option<&str>) -> String {
    match scope {
        Some(scope) => format!("{}.{}.json", locale, scope),
        None => format!("{}.json", locale),
    }
}

fn manifest_file_name(scope: Option<&str>) -> String {
    match scope {
        Some(scope) => format!("manifest.{}.json", scope),
        None => "manifest.json".to_string(),
    }
}

fn build_locale(
    project: &Project,
    locale: &Locale,
    options: &BundleOptions,
    languages: &LanguageTable,
    flat: bool,
    output_dir: &Path,
) -> Result<(LocaleBundle, PathBuf), String> {
    let sources = project.load_sources(locale, true)?;
    if sources.is_empty() {
        tracing::warn!(locale = %locale, "no translations found");
    }

    let bundle = build_bundle(locale, &sources, options, languages);
    let scope = options.scope.as_ref().map(|s| s.name.as_str());
    let path = output_dir.join(bundle_file_name(locale, scope));
    let written = if flat {
        build_flat_bundle(locale, &sources, options).write_to(&path)
    } else {
        bundle.write_to(&path)
    };
    written.map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;

    Ok((bundle, path))
}

pub fn run_build_command(project: &Project, opts: BuildOptions) -> Result<(), String> {
    let locales = project.selected_locales(opts.locale.as_deref(), true)?;
    if locales.is_empty() {
        return Err(format!(
            "No locales found in {}",
            project.locales_dir().display()
        ));
    }

    let scope = opts
        .scope
        .as_deref()
        .map(|name| project.config.scope(name))
        .transpose()?;
    let version = opts
        .bundle_version
        .clone()
        .unwrap_or_else(|| project.config.version.clone());
    let options = BundleOptions::new(version.clone())
        .with_scope(scope)
        .with_root_alias(project.config.root_alias.clone());
    let languages = project.config.language_table();

    let output_dir = opts
        .output
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| project.dist_dir());
    validate_output_dir(&output_dir)?;

    println!(
        "Building {} locale(s) into {}",
        locales.len(),
        output_dir.display()
    );

    let built: Vec<(LocaleBundle, PathBuf)> = locales
        .par_iter()
        .map(|locale| build_locale(project, locale, &options, &languages, opts.flat, &output_dir))
        .collect::<Result<_, String>>()?;

    for (bundle, path) in &built {
        println!(
            "  [{}] → {} ({} keys, {} files)",
            bundle.locale,
            path.display(),
            bundle.total_keys,
            bundle.files_merged
        );
    }

    let bundles: Vec<LocaleBundle> = built.into_iter().map(|(bundle, _)| bundle).collect();
    let manifest = build_manifest(version, &bundles);
    let manifest_path = output_dir.join(manifest_file_name(opts.scope.as_deref()));
    manifest
        .write_to(&manifest_path)
        .map_err(|e| format!("Failed to write '{}': {}", manifest_path.display(), e))?;
    println!("  → {}", manifest_path.display());

    println!();
    for (locale, entry) in &manifest.locales {
        let status = if entry.total_keys > 0 && entry.translated_keys == entry.total_keys {
            "✅"
        } else {
            "🔄"
        };
        println!(
            "  {} {}: {}% ({}/{})",
            status, locale, entry.completion, entry.translated_keys, entry.total_keys
        );
    }
    println!("✅ Build complete");
    Ok(())
}
