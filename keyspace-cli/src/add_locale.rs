use keyspace::{CategoryFile, Locale, Parser, Placeholder, merge_sources, scaffold_locale};
use keyspace_cli::{Project, validation::validate_language_code};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Default)]
pub struct AddLocaleOptions {
    pub locale: Option<String>,
    pub use_reference_values: bool,
    pub list: bool,
}

fn list_locales(project: &Project) -> Result<(), String> {
    let languages = project.config.language_table();
    println!("Available locales:");
    println!();
    for locale in project.locales()? {
        let mapping = merge_sources(&project.load_sources(&locale, false)?);
        let total = mapping.len();
        let translated = mapping.non_empty_count();
        let percent = keyspace::coverage::percentage(translated, total);
        let status = if total > 0 && translated == total {
            "✅"
        } else if translated > 0 {
            "🔄"
        } else {
            "⬜"
        };
        let name = languages.meta_for(&locale).name;
        let name_width = UnicodeWidthStr::width(name.as_str());
        println!(
            "  {} {:8} {}{} {:5}/{:5} ({:.1}%)",
            status,
            locale.as_str(),
            name,
            " ".repeat(25usize.saturating_sub(name_width)),
            translated,
            total,
            percent
        );
    }
    println!();
    println!("To add a new locale: keyspace add-locale <locale>");
    Ok(())
}

pub fn run_add_locale_command(project: &Project, opts: AddLocaleOptions) -> Result<(), String> {
    let raw = match (&opts.locale, opts.list) {
        (Some(raw), false) => raw,
        _ => return list_locales(project),
    };
    validate_language_code(raw)?;
    let locale = Locale::parse(raw).map_err(|e| e.to_string())?;

    let target_dir = project.locale_dir(&locale);
    if target_dir.exists() {
        return Err(format!(
            "Locale '{}' already exists at {}",
            locale,
            target_dir.display()
        ));
    }

    let (reference_locale, reference) = project.load_reference(true)?;
    let meta = project.config.language_table().meta_for(&locale);
    println!("Adding new locale: {} ({})", locale, meta.name);
    println!("Based on: {}", reference_locale);
    println!();

    let placeholder = if opts.use_reference_values {
        Placeholder::Reference
    } else {
        Placeholder::Empty
    };
    let scaffolded = scaffold_locale(&reference, &locale, placeholder);

    let mut total_keys = 0;
    for (template, source) in reference.iter().zip(&scaffolded) {
        let path = target_dir.join(template.file_name());
        CategoryFile::from(source)
            .write_to(&path)
            .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
        total_keys += source.entries.len();
        println!("  Created {}", path.display());
    }

    println!();
    println!("✅ Locale '{}' created successfully!", locale);
    println!("   Files: {}", scaffolded.len());
    println!(
        "   Keys: {} ({})",
        total_keys,
        if opts.use_reference_values {
            "reference values"
        } else {
            "empty"
        }
    );
    Ok(())
}
