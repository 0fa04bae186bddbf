use std::{collections::BTreeMap, path::PathBuf};

use keyspace::{
    CategoryFile, KeySource, Locale, Parser, apply_overrides, flatten, key_categories,
    reconcile::route_by_category,
};
use keyspace_cli::{
    Project,
    validation::{validate_file_path, validate_key_prefix},
};
use serde_json::Value;

const SKIPPED_KEYS_SHOWN: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub from: String,
    pub prefix: Option<String>,
    pub dry_run: bool,
}

#[derive(Debug, Default)]
struct ImportTotals {
    files: usize,
    translations: usize,
    skipped: usize,
}

/// A category file rewrite computed before anything is written.
struct PendingWrite {
    path: PathBuf,
    file: CategoryFile,
    changed: usize,
}

impl PendingWrite {
    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

fn read_overrides(path: &str) -> Result<serde_json::Map<String, Value>, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path, e))?;
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(format!(
            "Override document '{}' must be an object keyed by locale",
            path
        )),
        Err(e) => Err(format!("Invalid JSON in '{}': {}", path, e)),
    }
}

fn import_locale(
    project: &Project,
    locale: &Locale,
    nested: &Value,
    opts: &ImportOptions,
    owners: &BTreeMap<String, String>,
    totals: &mut ImportTotals,
    pending: &mut Vec<PendingWrite>,
) -> Result<(), String> {
    let overrides = flatten(nested, opts.prefix.as_deref())
        .map_err(|e| format!("Invalid overrides for '{}': {}", locale, e))?;
    println!("  Found {} translations in overrides", overrides.len());

    let target = project.load_sources(locale, true)?;
    let mut owners = owners.clone();
    owners.extend(key_categories(&target));
    let routed = route_by_category(&owners, &overrides);

    for (category, entries) in &routed.by_category {
        let Some(source) = target.iter().rev().find(|s| &s.category == category) else {
            println!("    Skipping {}: no category file in this locale", category);
            totals.skipped += entries.len();
            continue;
        };

        let outcome = apply_overrides(&source.entries, entries);
        if outcome.changed.is_empty() {
            continue;
        }

        let path = source
            .origin
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| project.locale_dir(locale).join(format!("{}.json", category)));
        let updated = KeySource::unchecked(locale.clone(), category.clone(), outcome.mapping)
            .with_version(source.version.clone())
            .with_schema(source.schema.clone());
        updated
            .check_keys()
            .map_err(|e| format!("Refusing to write '{}': {}", path.display(), e))?;

        let write = PendingWrite {
            path,
            file: CategoryFile::from(&updated),
            changed: outcome.changed.len(),
        };
        totals.files += 1;
        totals.translations += write.changed;
        if opts.dry_run {
            println!("    Would update {}: {} translations", write.name(), write.changed);
        } else {
            println!("    Will update {}: {} translations", write.name(), write.changed);
        }
        pending.push(write);
    }

    if !routed.unrouted.is_empty() {
        totals.skipped += routed.unrouted.len();
        println!(
            "    Skipped {} key(s) owned by no category:",
            routed.unrouted.len()
        );
        for key in routed.unrouted.iter().take(SKIPPED_KEYS_SHOWN) {
            println!("      - {}", key);
        }
        if routed.unrouted.len() > SKIPPED_KEYS_SHOWN {
            println!(
                "      ... and {} more",
                routed.unrouted.len() - SKIPPED_KEYS_SHOWN
            );
        }
    }
    Ok(())
}

pub fn run_import_command(project: &Project, opts: ImportOptions) -> Result<(), String> {
    validate_file_path(&opts.from)?;
    if let Some(prefix) = &opts.prefix {
        validate_key_prefix(prefix)?;
    }

    let document = read_overrides(&opts.from)?;
    if document.is_empty() {
        return Err(format!("No translations found in '{}'", opts.from));
    }

    // Keys missing from a target still route to the reference's category.
    let (_, reference) = project.load_reference(true)?;
    let reference_owners = key_categories(&reference);

    println!("Importing from: {}", opts.from);
    println!("Mode: {}", if opts.dry_run { "DRY RUN" } else { "LIVE" });
    println!("{}", "-".repeat(60));

    let mut totals = ImportTotals::default();
    let mut pending = Vec::new();
    for (raw, nested) in &document {
        println!("\n[{}]", raw);
        let locale = match Locale::parse(raw) {
            Ok(locale) => locale,
            Err(e) => {
                println!("  Warning: {}", e);
                continue;
            }
        };
        if !project.locale_dir(&locale).is_dir() {
            println!(
                "  Warning: Locale directory not found: {}",
                project.locale_dir(&locale).display()
            );
            continue;
        }
        import_locale(
            project,
            &locale,
            nested,
            &opts,
            &reference_owners,
            &mut totals,
            &mut pending,
        )?;
    }

    if !opts.dry_run && !pending.is_empty() {
        println!();
        for (written, write) in pending.iter().enumerate() {
            write.file.write_to(&write.path).map_err(|e| {
                format!(
                    "Failed to write '{}': {} ({} of {} files written)",
                    write.path.display(),
                    e,
                    written,
                    pending.len()
                )
            })?;
            println!("  Updated {}: {} translations", write.name(), write.changed);
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("Summary:");
    println!("  Files updated: {}", totals.files);
    println!("  Translations imported: {}", totals.translations);
    println!("  Keys skipped: {}", totals.skipped);
    println!("{}", "=".repeat(60));
    if opts.dry_run {
        println!("\nRun without --dry-run to apply changes");
    }
    Ok(())
}
