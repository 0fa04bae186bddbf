use std::fs;
use std::path::Path;
use std::process::Command;

use indoc::indoc;
use serde_json::Value;
use tempfile::TempDir;

fn keyspace_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("keyspace"))
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(
        &root.join("locales/en/common.json"),
        indoc! {r#"
            {
              "locale": "en",
              "category": "common",
              "version": "1.0.0",
              "translations": {
                "common.save": "Save",
                "common.cancel": "Cancel"
              }
            }
        "#},
    );
    write(
        &root.join("locales/en/modules.browser.json"),
        indoc! {r#"
            {
              "locale": "en",
              "category": "modules.browser",
              "version": "1.0.0",
              "translations": {
                "modules.browser.title": "Browser",
                "modules.browser.click.label": "Click"
              }
            }
        "#},
    );
    write(
        &root.join("locales/fr/common.json"),
        indoc! {r#"
            {
              "locale": "fr",
              "category": "common",
              "version": "1.0.0",
              "translations": {
                "common.save": "Enregistrer",
                "common.cancel": ""
              }
            }
        "#},
    );
    temp_dir
}

fn build(root: &Path, extra: &[&str]) -> std::process::Output {
    keyspace_cmd()
        .args(["build", "--root", root.to_str().unwrap()])
        .args(extra)
        .output()
        .unwrap()
}

#[test]
fn test_build_writes_nested_bundles_and_manifest() {
    let temp_dir = project();
    let root = temp_dir.path();

    let output = build(root, &["--bundle-version", "2.1.0"]);
    assert!(
        output.status.success(),
        "build failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Build complete"));

    let en = read_json(&root.join("dist/en.json"));
    assert_eq!(en["locale"], "en");
    assert_eq!(en["name"], "English");
    assert_eq!(en["version"], "2.1.0");
    assert_eq!(en["files_merged"], 2);
    assert_eq!(en["total_keys"], 4);
    assert_eq!(en["translations"]["common"]["save"], "Save");
    assert_eq!(
        en["translations"]["modules"]["browser"]["click"]["label"],
        "Click"
    );

    let manifest = read_json(&root.join("dist/manifest.json"));
    assert_eq!(manifest["version"], "2.1.0");
    assert_eq!(manifest["locales"]["en"]["completion"], 100.0);
    assert_eq!(manifest["locales"]["fr"]["total_keys"], 2);
    assert_eq!(manifest["locales"]["fr"]["translated_keys"], 1);
    assert_eq!(manifest["locales"]["fr"]["completion"], 50.0);
}

#[test]
fn test_build_flat_keeps_dotted_keys() {
    let temp_dir = project();
    let root = temp_dir.path();

    let output = build(root, &["--flat", "--locale", "en"]);
    assert!(output.status.success());

    let en = read_json(&root.join("dist/en.json"));
    assert_eq!(en["key_count"], 4);
    assert_eq!(en["translations"]["modules.browser.title"], "Browser");
    assert!(!root.join("dist/fr.json").exists());
}

#[test]
fn test_build_scope_and_root_alias_from_config() {
    let temp_dir = project();
    let root = temp_dir.path();
    write(
        &root.join("keyspace.toml"),
        indoc! {r#"
            root_alias = "modules"
            version = "3.0.0"

            [scopes]
            browser = ["modules.browser"]
        "#},
    );

    let output = build(root, &["--scope", "browser"]);
    assert!(
        output.status.success(),
        "build failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let en = read_json(&root.join("dist/en.browser.json"));
    assert_eq!(en["version"], "3.0.0");
    assert_eq!(en["total_keys"], 2);
    assert_eq!(en["translations"]["browser"]["title"], "Browser");
    assert!(en["translations"].get("common").is_none());

    let manifest = read_json(&root.join("dist/manifest.browser.json"));
    assert_eq!(manifest["locales"]["fr"]["total_keys"], 0);
    assert!(!root.join("dist/manifest.json").exists());
}

#[test]
fn test_build_unknown_scope_fails() {
    let temp_dir = project();
    let output = build(temp_dir.path(), &["--scope", "nope"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nope"));
}

#[test]
fn test_build_output_dir_override() {
    let temp_dir = project();
    let root = temp_dir.path();
    let out = root.join("public/i18n");

    let output = build(root, &["--output", out.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(out.join("en.json").exists());
    assert!(out.join("manifest.json").exists());
    assert!(!root.join("dist").exists());
}

#[test]
fn test_build_rejects_non_string_values() {
    let temp_dir = project();
    let root = temp_dir.path();
    write(
        &root.join("locales/fr/broken.json"),
        r#"{"locale": "fr", "category": "broken", "version": "1.0.0", "translations": {"broken.count": 3}}"#,
    );

    let output = build(root, &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.count"), "stderr: {}", stderr);
}

#[test]
fn test_completions() {
    let output = keyspace_cmd().args(["completions", "bash"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("keyspace"));
}
