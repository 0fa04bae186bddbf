use std::collections::{BTreeMap, BTreeSet};

use keyspace::{
    Category, CoverageReport, Locale, coverage, coverage::round_one_decimal, merge_sources,
    reference_index,
};
use keyspace_cli::{Project, ReportFormat};
use rayon::prelude::*;
use serde_json::{Value, json};
use unicode_width::UnicodeWidthStr;

const BAR_WIDTH: usize = 20;
const MISSING_KEYS_SHOWN: usize = 20;

#[derive(Debug, Clone, Default)]
pub struct CoverageOptions {
    pub locale: Option<String>,
    pub format: ReportFormat,
}

/// Left-aligns `text` to `width` terminal columns.
fn pad(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    format!("{}{}", text, " ".repeat(width.saturating_sub(used)))
}

fn bar(coverage: f64) -> String {
    let filled = ((coverage / 100.0) * BAR_WIDTH as f64).floor() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn print_text_report(locale: &Locale, report: &CoverageReport) {
    println!("\n{}", "=".repeat(60));
    println!("Translation Coverage Report: {}", locale);
    println!("{}", "=".repeat(60));
    println!(
        "\nOverall: {}/{} ({}%)",
        report.translated,
        report.total,
        round_one_decimal(report.coverage)
    );

    let name_width = report
        .categories
        .keys()
        .map(|c| UnicodeWidthStr::width(c.as_str()))
        .max()
        .unwrap_or(0)
        .max("Category".len());

    println!("\nBy Category:");
    println!("{}", "-".repeat(60));
    println!("{} {}", pad("Category", name_width), "Translated");
    println!("{}", "-".repeat(60));
    for (category, stats) in &report.categories {
        println!(
            "{} {} {} {}%",
            pad(category, name_width),
            pad(&format!("{}/{}", stats.translated, stats.total), 10),
            bar(stats.coverage),
            round_one_decimal(stats.coverage)
        );
    }

    if !report.missing_keys.is_empty() {
        println!("\nMissing Keys:");
        for key in report.missing_keys.iter().take(MISSING_KEYS_SHOWN) {
            println!("  - {}", key);
        }
        if report.missing_keys.len() > MISSING_KEYS_SHOWN {
            println!(
                "  ... and {} more",
                report.missing_keys.len() - MISSING_KEYS_SHOWN
            );
        }
    }
}

fn report_json(report: &CoverageReport) -> Value {
    let by_category: BTreeMap<&str, Value> = report
        .categories
        .iter()
        .map(|(category, stats)| {
            (
                category.as_str(),
                json!({
                    "total": stats.total,
                    "translated": stats.translated,
                    "coverage": round_one_decimal(stats.coverage),
                    "missing_count": stats.missing_count,
                }),
            )
        })
        .collect();
    json!({
        "total_keys": report.total,
        "translated_keys": report.translated,
        "coverage": round_one_decimal(report.coverage),
        "by_category": by_category,
        "missing_keys": report.missing_keys,
    })
}

fn write_csv(reports: &[(Locale, CoverageReport)]) -> Result<(), String> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer
        .write_record(["locale", "category", "total", "translated", "missing", "coverage"])
        .map_err(|e| format!("Failed to write CSV: {}", e))?;
    for (locale, report) in reports {
        for (category, stats) in &report.categories {
            writer
                .write_record([
                    locale.to_string(),
                    category.clone(),
                    stats.total.to_string(),
                    stats.translated.to_string(),
                    stats.missing_count.to_string(),
                    round_one_decimal(stats.coverage).to_string(),
                ])
                .map_err(|e| format!("Failed to write CSV: {}", e))?;
        }
        writer
            .write_record([
                locale.to_string(),
                "*".to_string(),
                report.total.to_string(),
                report.translated.to_string(),
                report.missing_keys.len().to_string(),
                round_one_decimal(report.coverage).to_string(),
            ])
            .map_err(|e| format!("Failed to write CSV: {}", e))?;
    }
    writer
        .flush()
        .map_err(|e| format!("Failed to write CSV: {}", e))
}

fn locale_report(
    project: &Project,
    locale: &Locale,
    index: &BTreeMap<Category, BTreeSet<String>>,
) -> Result<CoverageReport, String> {
    let sources = project.load_sources(locale, false)?;
    let translated = merge_sources(&sources).non_empty_keys();
    Ok(coverage(index, &translated))
}

pub fn run_coverage_command(project: &Project, opts: CoverageOptions) -> Result<(), String> {
    let (reference_locale, reference) = project.load_reference(false)?;
    let index = reference_index(&reference);
    if index.values().all(BTreeSet::is_empty) {
        return Err(format!(
            "Reference locale '{}' has no keys",
            reference_locale
        ));
    }

    let locales = project.selected_locales(opts.locale.as_deref(), false)?;
    let reports: Vec<(Locale, CoverageReport)> = locales
        .par_iter()
        .map(|locale| locale_report(project, locale, &index).map(|r| (locale.clone(), r)))
        .collect::<Result<_, String>>()?;

    match opts.format {
        ReportFormat::Json => {
            let body: BTreeMap<&str, Value> = reports
                .iter()
                .map(|(locale, report)| (locale.as_str(), report_json(report)))
                .collect();
            let text = serde_json::to_string_pretty(&body)
                .map_err(|e| format!("Failed to serialize coverage JSON: {}", e))?;
            println!("{}", text);
        }
        ReportFormat::Csv => write_csv(&reports)?,
        ReportFormat::Text => {
            if reports.is_empty() {
                println!("No target locales found");
            }
            for (locale, report) in &reports {
                print_text_report(locale, report);
            }
            if reports.len() > 1 {
                println!("\n{}", "=".repeat(60));
                println!("Summary");
                println!("{}", "=".repeat(60));
                let mut ranked: Vec<&(Locale, CoverageReport)> = reports.iter().collect();
                ranked.sort_by(|a, b| b.1.coverage.total_cmp(&a.1.coverage).then_with(|| a.0.cmp(&b.0)));
                for (locale, report) in ranked {
                    println!("  {}: {}%", locale, round_one_decimal(report.coverage));
                }
            }
        }
    }
    Ok(())
}
