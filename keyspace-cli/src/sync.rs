use std::path::PathBuf;

use keyspace::{
    CategoryFile, DeletionPolicy, Locale, Parser, ReconciledFile, SourceReconciliation,
    reconcile_sources,
};
use keyspace_cli::{PolicyArg, Project, validation::validate_output_path};
use serde_json::{Value, json};

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub locale: Option<String>,
    pub policy: Option<PolicyArg>,
    pub dry_run: bool,
    pub report_json: Option<String>,
}

struct LocaleSync {
    locale: Locale,
    outcome: SourceReconciliation,
    files: Vec<FileChange>,
}

struct FileChange {
    path: PathBuf,
    added: usize,
    removed: usize,
}

fn target_path(project: &Project, locale: &Locale, file: &ReconciledFile) -> PathBuf {
    file.source
        .origin
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| project.locale_dir(locale).join(&file.file_name))
}

fn describe_changes(
    project: &Project,
    locale: &Locale,
    outcome: &SourceReconciliation,
) -> Vec<FileChange> {
    outcome
        .changed_files()
        .map(|file| FileChange {
            path: target_path(project, locale, file),
            added: file
                .source
                .entries
                .keys()
                .filter(|key| outcome.result.added.contains(*key))
                .count(),
            removed: file.dropped.intersection(&outcome.result.removed).count(),
        })
        .collect()
}

fn write_changes(sync: &LocaleSync) -> Result<(), String> {
    for (file, change) in sync.outcome.changed_files().zip(&sync.files) {
        CategoryFile::from(&file.source)
            .write_to(&change.path)
            .map_err(|e| format!("Failed to write '{}': {}", change.path.display(), e))?;
    }
    Ok(())
}

fn write_report(path: &str, options: &SyncOptions, policy: DeletionPolicy, syncs: &[LocaleSync]) -> Result<(), String> {
    let locales: Vec<Value> = syncs
        .iter()
        .map(|sync| {
            let result = &sync.outcome.result;
            json!({
                "locale": sync.locale,
                "added": result.added.len(),
                "removed": result.removed.len(),
                "kept": result.kept.len(),
                "added_keys": result.added,
                "removed_keys": result.removed,
                "changed_files": sync
                    .files
                    .iter()
                    .map(|f| json!({
                        "path": f.path.display().to_string(),
                        "added": f.added,
                        "removed": f.removed,
                    }))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    let payload = json!({
        "policy": policy,
        "dry_run": options.dry_run,
        "summary": {
            "locales": syncs.len(),
            "added": syncs.iter().map(|s| s.outcome.result.added.len()).sum::<usize>(),
            "removed": syncs.iter().map(|s| s.outcome.result.removed.len()).sum::<usize>(),
            "files_updated": syncs.iter().map(|s| s.files.len()).sum::<usize>(),
        },
        "locales": locales,
    });

    let text = serde_json::to_string_pretty(&payload)
        .map_err(|e| format!("Failed to serialize report JSON: {}", e))?;
    std::fs::write(path, text).map_err(|e| format!("Failed to write report JSON '{}': {}", path, e))
}

pub fn run_sync_command(project: &Project, opts: SyncOptions) -> Result<(), String> {
    if let Some(report_path) = &opts.report_json {
        validate_output_path(report_path)?;
    }

    let policy = opts
        .policy
        .map(DeletionPolicy::from)
        .unwrap_or(project.config.sync_policy);
    let (reference_locale, reference) = project.load_reference(true)?;
    let locales = project.selected_locales(opts.locale.as_deref(), false)?;
    if locales.contains(&reference_locale) {
        return Err(format!(
            "'{}' is the reference locale and cannot be synced against itself",
            reference_locale
        ));
    }

    println!("Syncing locales with reference '{}'", reference_locale);
    println!(
        "Mode: {} (policy: {})",
        if opts.dry_run { "DRY RUN" } else { "LIVE" },
        policy
    );

    let mut syncs = Vec::with_capacity(locales.len());
    for locale in locales {
        let target = project.load_sources(&locale, true)?;
        let outcome = reconcile_sources(&reference, &target, &locale, policy);
        let files = describe_changes(project, &locale, &outcome);
        let sync = LocaleSync {
            locale,
            outcome,
            files,
        };

        println!("\n[{}]", sync.locale);
        if sync.files.is_empty() {
            println!("  Up to date");
        }
        for file in &sync.files {
            let name = file
                .path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let verb = if opts.dry_run { "Would update" } else { "Updated" };
            println!("  {} {}: +{}, -{}", verb, name, file.added, file.removed);
        }

        if !opts.dry_run {
            write_changes(&sync)?;
        }
        syncs.push(sync);
    }

    let added: usize = syncs.iter().map(|s| s.outcome.result.added.len()).sum();
    let removed: usize = syncs.iter().map(|s| s.outcome.result.removed.len()).sum();
    let files: usize = syncs.iter().map(|s| s.files.len()).sum();
    println!();
    println!("Summary:");
    println!("  Keys added: {}", added);
    println!("  Keys removed: {}", removed);
    println!("  Files updated: {}", files);

    if let Some(report_path) = &opts.report_json {
        write_report(report_path, &opts, policy, &syncs)?;
        println!("Report JSON written: {}", report_path);
    }

    if opts.dry_run {
        println!("Dry-run mode: no files were written");
    }
    Ok(())
}
