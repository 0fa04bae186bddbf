//! Validation of category files.
//!
//! Unlike decoding, validation does not stop at the first problem: every issue
//! found in a file is collected so a whole locale can be reported at once.

use std::{collections::BTreeSet, fmt::Display, path::Path};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    source::{CategoryFile, json_type_name},
    traits::Parser,
    types::{KEY_SEPARATOR, Key},
};

lazy_static! {
    static ref UNSAFE_CONTENT_REGEX: Regex = Regex::new(r"(?i)<script|javascript:").unwrap();
}

/// Default limit for [`ValidationOptions::max_value_length`], in characters.
pub const DEFAULT_MAX_VALUE_LENGTH: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Longest accepted value, in characters.
    pub max_value_length: usize,
    /// When non-empty, every key's first segment must be one of these.
    pub required_roots: Vec<String>,
    /// Flag values that look like script injection.
    pub reject_script_content: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            max_value_length: DEFAULT_MAX_VALUE_LENGTH,
            required_roots: Vec::new(),
            reject_script_content: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    JsonError,
    MissingField,
    InvalidKey,
    InvalidValue,
    ValueTooLong,
    Security,
    UnknownKey,
}

impl IssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::JsonError => "json_error",
            IssueKind::MissingField => "missing_field",
            IssueKind::InvalidKey => "invalid_key",
            IssueKind::InvalidValue => "invalid_value",
            IssueKind::ValueTooLong => "value_too_long",
            IssueKind::Security => "security",
            IssueKind::UnknownKey => "unknown_key",
        }
    }
}

impl Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub origin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub key: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    fn new(kind: IssueKind, origin: &str, key: Option<&str>, message: impl Into<String>) -> Self {
        ValidationIssue {
            kind,
            origin: origin.to_string(),
            key: key.map(str::to_string),
            message: message.into(),
        }
    }
}

impl Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: [{}] {}", self.origin, self.kind, self.message)
    }
}

/// Validates one decoded category file.
///
/// `base_keys` is the reference locale's key set; pass it for target locales
/// only. Keys outside it are reported as unknown. An empty set disables the check.
pub fn validate_file(
    file: &CategoryFile,
    origin: &str,
    options: &ValidationOptions,
    base_keys: Option<&BTreeSet<String>>,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let fields = [
        ("locale", file.locale.is_some()),
        ("category", file.category.is_some()),
        ("version", file.version.is_some()),
        ("translations", file.translations.is_some()),
    ];
    for (field, present) in fields {
        if !present {
            issues.push(ValidationIssue::new(
                IssueKind::MissingField,
                origin,
                None,
                format!("missing required field `{}`", field),
            ));
        }
    }

    let Some(translations) = &file.translations else {
        return issues;
    };

    for (key, value) in translations {
        if let Some(reason) = key_problem(key, &options.required_roots) {
            issues.push(ValidationIssue::new(
                IssueKind::InvalidKey,
                origin,
                Some(key),
                format!("invalid key `{}`: {}", key, reason),
            ));
        }

        let Value::String(text) = value else {
            issues.push(ValidationIssue::new(
                IssueKind::InvalidValue,
                origin,
                Some(key),
                format!("value must be a string, found {}", json_type_name(value)),
            ));
            continue;
        };

        let length = text.chars().count();
        if length > options.max_value_length {
            issues.push(ValidationIssue::new(
                IssueKind::ValueTooLong,
                origin,
                Some(key),
                format!(
                    "value too long ({} > {} chars)",
                    length, options.max_value_length
                ),
            ));
        }

        if options.reject_script_content && UNSAFE_CONTENT_REGEX.is_match(text) {
            issues.push(ValidationIssue::new(
                IssueKind::Security,
                origin,
                Some(key),
                "potential script injection",
            ));
        }
    }

    if let Some(base) = base_keys
        && !base.is_empty()
    {
        for key in translations.keys().filter(|key| !base.contains(*key)) {
            issues.push(ValidationIssue::new(
                IssueKind::UnknownKey,
                origin,
                Some(key),
                format!("key `{}` is not in the reference locale", key),
            ));
        }
    }

    issues
}

fn key_problem(key: &str, required_roots: &[String]) -> Option<String> {
    if let Err(reason) = Key::parse(key) {
        return Some(reason);
    }
    let root = key.split(KEY_SEPARATOR).next().unwrap_or_default();
    if !required_roots.is_empty() && !required_roots.iter().any(|r| r == root) {
        return Some(format!(
            "root segment `{}` is not one of: {}",
            root,
            required_roots.join(", ")
        ));
    }
    None
}

/// Reads and validates a category file on disk. Unreadable or malformed JSON
/// is reported as a single `json_error` issue.
pub fn validate_path(
    path: &Path,
    options: &ValidationOptions,
    base_keys: Option<&BTreeSet<String>>,
) -> Vec<ValidationIssue> {
    let origin = path.display().to_string();
    match CategoryFile::read_from(path) {
        Ok(file) => validate_file(&file, &origin, options, base_keys),
        Err(e) => vec![ValidationIssue::new(
            IssueKind::JsonError,
            &origin,
            None,
            format!("invalid JSON: {}", e),
        )],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::BTreeMap, fs};

    use serde_json::json;

    fn file(translations: Value) -> CategoryFile {
        CategoryFile {
            schema: None,
            locale: Some("fr".to_string()),
            category: Some("common".to_string()),
            version: Some("1.0.0".to_string()),
            translations: serde_json::from_value::<BTreeMap<String, Value>>(translations).ok(),
        }
    }

    fn kinds(issues: &[ValidationIssue]) -> Vec<IssueKind> {
        issues.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn test_valid_file_has_no_issues() {
        let issues = validate_file(
            &file(json!({"common.ok": "OK", "modules.browser.click.label": "Cliquer"})),
            "fr/common.json",
            &ValidationOptions::default(),
            None,
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let empty = CategoryFile {
            schema: None,
            locale: None,
            category: None,
            version: Some("1.0.0".to_string()),
            translations: None,
        };
        let issues = validate_file(&empty, "x.json", &ValidationOptions::default(), None);
        assert_eq!(kinds(&issues), vec![IssueKind::MissingField; 3]);
        assert!(issues[2].message.contains("translations"));
    }

    #[test]
    fn test_key_value_length_and_security_issues() {
        let long = "x".repeat(501);
        let issues = validate_file(
            &file(json!({
                "common.Bad": "ok",
                "common.count": 3,
                "common.long": long,
                "common.link": "<a href=\"JavaScript:alert(1)\">x</a>",
                "common.tag": "<SCRIPT>alert(1)</SCRIPT>",
            })),
            "fr/common.json",
            &ValidationOptions::default(),
            None,
        );
        assert_eq!(
            kinds(&issues),
            vec![
                IssueKind::InvalidKey,
                IssueKind::InvalidValue,
                IssueKind::Security,
                IssueKind::ValueTooLong,
                IssueKind::Security,
            ]
        );
        assert_eq!(issues[1].key.as_deref(), Some("common.count"));
        assert!(issues[1].message.contains("number"));
    }

    #[test]
    fn test_value_length_counts_characters() {
        let options = ValidationOptions {
            max_value_length: 3,
            ..ValidationOptions::default()
        };
        let issues = validate_file(&file(json!({"common.x": "日本語"})), "f", &options, None);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_required_roots() {
        let options = ValidationOptions {
            required_roots: vec!["modules".to_string(), "common".to_string()],
            ..ValidationOptions::default()
        };
        let issues = validate_file(
            &file(json!({"common.ok": "OK", "cloud.title": "Cloud"})),
            "f",
            &options,
            None,
        );
        assert_eq!(kinds(&issues), vec![IssueKind::InvalidKey]);
        assert_eq!(issues[0].key.as_deref(), Some("cloud.title"));
    }

    #[test]
    fn test_unknown_keys_against_base() {
        let base: BTreeSet<String> = ["common.ok".to_string()].into();
        let translations = json!({"common.ok": "OK", "common.stray": "?"});
        let issues = validate_file(
            &file(translations.clone()),
            "f",
            &ValidationOptions::default(),
            Some(&base),
        );
        assert_eq!(kinds(&issues), vec![IssueKind::UnknownKey]);

        let no_base = validate_file(
            &file(translations),
            "f",
            &ValidationOptions::default(),
            Some(&BTreeSet::new()),
        );
        assert!(no_base.is_empty());
    }

    #[test]
    fn test_validate_path_reports_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let issues = validate_path(&path, &ValidationOptions::default(), None);
        assert_eq!(kinds(&issues), vec![IssueKind::JsonError]);
        assert!(issues[0].origin.ends_with("broken.json"));
    }

    #[test]
    fn test_issue_display() {
        let issue = ValidationIssue::new(IssueKind::Security, "f.json", Some("k"), "bad");
        assert_eq!(issue.to_string(), "f.json: [security] bad");
        assert_eq!(
            serde_json::to_value(&issue).unwrap()["kind"],
            json!("security")
        );
    }
}
