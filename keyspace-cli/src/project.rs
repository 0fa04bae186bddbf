//! A project on disk: a root directory plus its configuration.

use std::path::{Path, PathBuf};

use keyspace::{KeySource, Locale, ReadOptions, source};

use crate::{config::Config, validation::validate_language_code};

#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    /// Opens the project at `root` (default: the current directory).
    /// A relative `config_path` is resolved against the root.
    pub fn open(root: Option<&Path>, config_path: &Path) -> Result<Self, String> {
        let root = root.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
        if !root.is_dir() {
            return Err(format!("Project root is not a directory: {}", root.display()));
        }
        let config_path = if config_path.is_absolute() {
            config_path.to_path_buf()
        } else {
            root.join(config_path)
        };
        let config = Config::load(&config_path)?;
        Ok(Project { root, config })
    }

    pub fn with_config(root: impl Into<PathBuf>, config: Config) -> Self {
        Project {
            root: root.into(),
            config,
        }
    }

    pub fn locales_dir(&self) -> PathBuf {
        self.root.join(&self.config.locales_dir)
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.root.join(&self.config.dist_dir)
    }

    pub fn locale_dir(&self, locale: &Locale) -> PathBuf {
        self.locales_dir().join(locale.as_str())
    }

    pub fn reference_locale(&self) -> Result<Locale, String> {
        self.config.reference_locale()
    }

    /// All locales with a directory under the locales dir, sorted.
    pub fn locales(&self) -> Result<Vec<Locale>, String> {
        let dir = self.locales_dir();
        if !dir.is_dir() {
            return Err(format!("Locales directory not found: {}", dir.display()));
        }
        source::discover_locales(&dir)
            .map_err(|e| format!("Failed to list locales in '{}': {}", dir.display(), e))
    }

    /// The locales a command should work on.
    ///
    /// With `filter`, just that locale (which must exist). Otherwise every
    /// discovered locale, minus the reference unless `include_reference`.
    pub fn selected_locales(
        &self,
        filter: Option<&str>,
        include_reference: bool,
    ) -> Result<Vec<Locale>, String> {
        if let Some(raw) = filter {
            validate_language_code(raw)?;
            let locale = Locale::parse(raw).map_err(|e| e.to_string())?;
            if !self.locale_dir(&locale).is_dir() {
                return Err(format!(
                    "Locale directory not found: {}",
                    self.locale_dir(&locale).display()
                ));
            }
            return Ok(vec![locale]);
        }

        let reference = self.reference_locale()?;
        Ok(self
            .locales()?
            .into_iter()
            .filter(|locale| include_reference || *locale != reference)
            .collect())
    }

    /// Reads a locale's category files in file-name order.
    ///
    /// Commands that write files back load strictly, so a broken file aborts
    /// the run instead of being regenerated from scratch.
    pub fn load_sources(&self, locale: &Locale, strict: bool) -> Result<Vec<KeySource>, String> {
        let dir = self.locale_dir(locale);
        let options = ReadOptions::new().with_strict(strict).with_origin(true);
        source::read_locale_dir(&dir, locale, &options)
            .map_err(|e| format!("Failed to read locale '{}': {}", locale, e))
    }

    /// Reads the reference locale, which must exist.
    pub fn load_reference(&self, strict: bool) -> Result<(Locale, Vec<KeySource>), String> {
        let reference = self.reference_locale()?;
        let dir = self.locale_dir(&reference);
        if !dir.is_dir() {
            return Err(format!(
                "Reference locale '{}' not found at {}",
                reference,
                dir.display()
            ));
        }
        let sources = self.load_sources(&reference, strict)?;
        Ok((reference, sources))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn project_with_locales(names: &[&str]) -> (tempfile::TempDir, Project) {
        let tmp = tempfile::tempdir().unwrap();
        for name in names {
            fs::create_dir_all(tmp.path().join("locales").join(name)).unwrap();
        }
        let project = Project::with_config(tmp.path(), Config::default());
        (tmp, project)
    }

    #[test]
    fn test_selected_locales_skips_reference() {
        let (_tmp, project) = project_with_locales(&["fr", "en", "ja"]);
        let targets = project.selected_locales(None, false).unwrap();
        assert_eq!(
            targets.iter().map(Locale::as_str).collect::<Vec<_>>(),
            vec!["fr", "ja"]
        );
        assert_eq!(project.selected_locales(None, true).unwrap().len(), 3);
    }

    #[test]
    fn test_selected_locale_must_exist() {
        let (_tmp, project) = project_with_locales(&["en"]);
        assert!(project.selected_locales(Some("de"), false).is_err());
        assert_eq!(project.selected_locales(Some("en"), false).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_reference_is_an_error() {
        let (_tmp, project) = project_with_locales(&["fr"]);
        let err = project.load_reference(false).unwrap_err();
        assert!(err.contains("Reference locale 'en'"));
    }

    #[test]
    fn test_open_reads_config_relative_to_root() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("keyspace.toml"), "reference_locale = \"ja\"\n").unwrap();
        let project = Project::open(Some(tmp.path()), Path::new("keyspace.toml")).unwrap();
        assert_eq!(project.reference_locale().unwrap().as_str(), "ja");
    }
}
