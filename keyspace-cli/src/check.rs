use std::collections::BTreeSet;

use keyspace::{
    Locale, ValidationIssue, ValidationOptions, merge_sources,
    source::category_file_paths,
    validate::validate_path,
};
use keyspace_cli::Project;
use rayon::prelude::*;

#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    pub locale: Option<String>,
    pub strict: bool,
}

struct LocaleValidation {
    locale: Locale,
    files: usize,
    issues: Vec<ValidationIssue>,
}

fn validate_locale(
    project: &Project,
    locale: &Locale,
    options: &ValidationOptions,
    base_keys: Option<&BTreeSet<String>>,
) -> Result<LocaleValidation, String> {
    let dir = project.locale_dir(locale);
    let paths = category_file_paths(&dir)
        .map_err(|e| format!("Failed to list '{}': {}", dir.display(), e))?;
    let issues = paths
        .iter()
        .flat_map(|path| validate_path(path, options, base_keys))
        .collect();
    Ok(LocaleValidation {
        locale: locale.clone(),
        files: paths.len(),
        issues,
    })
}

pub fn run_validate_command(project: &Project, opts: ValidateOptions) -> Result<(), String> {
    let reference_locale = project.reference_locale()?;
    let base_keys = if project.locale_dir(&reference_locale).is_dir() {
        merge_sources(&project.load_sources(&reference_locale, false)?).key_set()
    } else {
        tracing::warn!(locale = %reference_locale, "reference locale missing, skipping unknown-key checks");
        BTreeSet::new()
    };

    let locales = project.selected_locales(opts.locale.as_deref(), true)?;
    let options = project.config.validation_options();

    let results: Vec<LocaleValidation> = locales
        .par_iter()
        .map(|locale| {
            let base = (*locale != reference_locale).then_some(&base_keys);
            validate_locale(project, locale, &options, base)
        })
        .collect::<Result<_, String>>()?;

    let mut total_files = 0;
    let mut total_issues = 0;
    for result in &results {
        total_files += result.files;
        total_issues += result.issues.len();
        if result.issues.is_empty() {
            println!("[{}] OK ({} files)", result.locale, result.files);
        } else {
            println!("\n[{}] {} error(s):", result.locale, result.issues.len());
            for issue in &result.issues {
                println!("  - {}", issue);
            }
        }
    }

    println!("\n{}", "=".repeat(50));
    println!("Total: {} files, {} errors", total_files, total_issues);
    println!("Status: {}", if total_issues > 0 { "FAIL" } else { "PASS" });

    if opts.strict && total_issues > 0 {
        return Err(format!("Validation failed with {} error(s)", total_issues));
    }
    Ok(())
}
