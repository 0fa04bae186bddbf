use std::path::Path;
use unic_langid::LanguageIdentifier;

/// Validate file path exists and is readable
pub fn validate_file_path(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        return Err(format!("File does not exist: {}", path));
    }

    if !path_obj.is_file() {
        return Err(format!("Path is not a file: {}", path));
    }

    Ok(())
}

/// Validate the parent directory of an output file exists or can be created
pub fn validate_output_path(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);

    if let Some(parent) = path_obj.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        return Err(format!("Cannot create output directory: {}", e));
    }

    Ok(())
}

/// Validate an output directory exists or can be created
pub fn validate_output_dir(path: &Path) -> Result<(), String> {
    if path.exists() && !path.is_dir() {
        return Err(format!("Output path is not a directory: {}", path.display()));
    }
    std::fs::create_dir_all(path).map_err(|e| {
        format!(
            "Cannot create output directory '{}': {}",
            path.display(),
            e
        )
    })
}

/// Validate language code format using unic-langid (same as lib crate)
pub fn validate_language_code(lang: &str) -> Result<(), String> {
    if lang.trim().is_empty() {
        return Err("Language code cannot be empty".to_string());
    }

    let normalized = lang.trim().replace('_', "-");
    match normalized.parse::<LanguageIdentifier>() {
        Ok(_) if normalized.starts_with('-') || normalized.ends_with('-') => Err(format!(
            "Invalid language code format: {}. Expected valid BCP 47 language identifier",
            lang
        )),
        Ok(_) => Ok(()),
        Err(_) => Err(format!(
            "Invalid language code format: {}. Expected valid BCP 47 language identifier",
            lang
        )),
    }
}

/// Validate a key prefix given on the command line (e.g. `cloud`)
pub fn validate_key_prefix(prefix: &str) -> Result<(), String> {
    keyspace::Key::parse(prefix).map(|_| ()).map_err(|reason| {
        format!("Invalid key prefix '{}': {}", prefix, reason)
    })
}
